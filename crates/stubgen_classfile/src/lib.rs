//! Reading of compiled JVM class files.
//!
//! The reader only decodes the structural parts of a class file: the
//! constant pool, declarations and the attributes that describe them.
//! Bytecode is skipped. Generic signatures and erased descriptors are
//! turned into [`stubgen_model::TypeReference`] trees.

pub mod access;
pub mod annotation;
pub mod descriptor;
mod error;
mod module;
pub mod names;
mod pool;
mod reader;
pub mod signature;

pub use annotation::{ConstantValue, ElementValue, RawAnnotation};
pub use descriptor::{parse_field_descriptor, parse_method_descriptor, MethodDescriptor};
pub use error::{ClassParseError, SignatureError};
pub use module::{
    CompiledModule, FieldInfo, InnerClassEntry, LocalVariable, MethodInfo, MethodParameter,
};
pub use signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    MethodSignature,
};
