// stubgen_model - Structural model of a type reconstructed from its class file
pub mod annotation;
pub mod model;
pub mod modifiers;
pub mod types;

pub use annotation::{AnnotationInstance, AnnotationValue, Literal};
pub use model::{
    ExecutableSpec, FieldSpec, InvariantViolation, MemberSpec, Parameter, TypeKind, TypeModel,
    CONSTRUCTOR_NAME,
};
pub use modifiers::{Modifier, ModifierSet};
pub use types::{ClassName, PrimitiveType, TypeParameter, TypeReference, WildcardKind};
