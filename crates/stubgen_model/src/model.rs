use crate::annotation::{AnnotationInstance, AnnotationValue, Literal};
use crate::modifiers::ModifierSet;
use crate::types::{ClassName, TypeParameter, TypeReference};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name the class file format uses for constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Member names an enum gets from the compiler rather than from its author.
const ENUM_SYNTHESIZED_METHODS: &[&str] = &["values", "valueOf"];

/// A model that breaks a structural rule of the declaration it describes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violated on {declaration}: {message}")]
pub struct InvariantViolation {
    pub declaration: String,
    pub message: String,
}

impl InvariantViolation {
    pub fn new(declaration: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            declaration: declaration.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModel {
    pub kind: TypeKind,
    pub name: ClassName,
    pub modifiers: ModifierSet,
    pub superclass: Option<TypeReference>,
    pub superinterfaces: Vec<TypeReference>,
    pub type_parameters: Vec<TypeParameter>,
    pub members: Vec<MemberSpec>,
    pub nested_types: Vec<TypeModel>,
    pub documentation: Option<String>,
    pub annotations: Vec<AnnotationInstance>,
}

impl TypeModel {
    pub fn new(kind: TypeKind, name: ClassName) -> Self {
        Self {
            kind,
            name,
            modifiers: ModifierSet::new(),
            superclass: None,
            superinterfaces: Vec::new(),
            type_parameters: Vec::new(),
            members: Vec::new(),
            nested_types: Vec::new(),
            documentation: None,
            annotations: Vec::new(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.members.iter().filter_map(MemberSpec::as_field)
    }

    pub fn executables(&self) -> impl Iterator<Item = &ExecutableSpec> {
        self.members.iter().filter_map(MemberSpec::as_executable)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ExecutableSpec> {
        self.executables().filter(|exec| exec.is_constructor())
    }

    pub fn methods(&self) -> impl Iterator<Item = &ExecutableSpec> {
        self.executables().filter(|exec| !exec.is_constructor())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.name == name)
    }

    /// First method with the given name; overloads are not distinguished.
    pub fn method(&self, name: &str) -> Option<&ExecutableSpec> {
        self.methods().find(|method| method.name == name)
    }

    pub fn nested_type(&self, simple_name: &str) -> Option<&TypeModel> {
        self.nested_types
            .iter()
            .find(|nested| nested.name.simple_name() == simple_name)
    }

    /// Checks the structural rules every reconstructed type must satisfy,
    /// including those of its nested types.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let declaration = self.name.canonical_name();

        if self.kind != TypeKind::Class && self.superclass.is_some() {
            return Err(InvariantViolation::new(
                declaration,
                format!("{} declares a superclass", self.kind.as_str()),
            ));
        }

        if self.kind == TypeKind::Enum {
            if let Some(exec) = self.executables().find(|exec| {
                exec.is_constructor() || ENUM_SYNTHESIZED_METHODS.contains(&exec.name.as_str())
            }) {
                return Err(InvariantViolation::new(
                    declaration,
                    format!("enum exposes compiler-supplied member `{}`", exec.name),
                ));
            }
        }

        for exec in self.executables() {
            if exec.default_value.is_none() {
                continue;
            }
            if self.kind != TypeKind::Annotation {
                return Err(InvariantViolation::new(
                    format!("{declaration}#{}", exec.name),
                    "default value outside an annotation type",
                ));
            }
            if !exec.parameters.is_empty() {
                return Err(InvariantViolation::new(
                    format!("{declaration}#{}", exec.name),
                    "annotation element with a default value takes parameters",
                ));
            }
        }

        self.nested_types.iter().try_for_each(TypeModel::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSpec {
    Field(FieldSpec),
    Executable(ExecutableSpec),
}

impl MemberSpec {
    pub fn name(&self) -> &str {
        match self {
            MemberSpec::Field(field) => &field.name,
            MemberSpec::Executable(exec) => &exec.name,
        }
    }

    pub fn modifiers(&self) -> &ModifierSet {
        match self {
            MemberSpec::Field(field) => &field.modifiers,
            MemberSpec::Executable(exec) => &exec.modifiers,
        }
    }

    pub fn annotations(&self) -> &[AnnotationInstance] {
        match self {
            MemberSpec::Field(field) => &field.annotations,
            MemberSpec::Executable(exec) => &exec.annotations,
        }
    }

    pub fn documentation(&self) -> Option<&str> {
        match self {
            MemberSpec::Field(field) => field.documentation.as_deref(),
            MemberSpec::Executable(exec) => exec.documentation.as_deref(),
        }
    }

    pub fn as_field(&self) -> Option<&FieldSpec> {
        match self {
            MemberSpec::Field(field) => Some(field),
            MemberSpec::Executable(_) => None,
        }
    }

    pub fn as_executable(&self) -> Option<&ExecutableSpec> {
        match self {
            MemberSpec::Executable(exec) => Some(exec),
            MemberSpec::Field(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub modifiers: ModifierSet,
    pub annotations: Vec<AnnotationInstance>,
    pub documentation: Option<String>,
    pub ty: TypeReference,
    pub enum_constant: bool,
    pub constant: Option<Literal>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            modifiers: ModifierSet::new(),
            annotations: Vec::new(),
            documentation: None,
            ty,
            enum_constant: false,
            constant: None,
        }
    }
}

/// Constructor or method. Constructors carry no return type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableSpec {
    pub name: String,
    pub modifiers: ModifierSet,
    pub annotations: Vec<AnnotationInstance>,
    pub documentation: Option<String>,
    pub type_parameters: Vec<TypeParameter>,
    pub return_type: Option<TypeReference>,
    pub parameters: Vec<Parameter>,
    pub thrown: Vec<TypeReference>,
    pub default_value: Option<AnnotationValue>,
}

impl ExecutableSpec {
    pub fn method(name: impl Into<String>, return_type: TypeReference) -> Self {
        Self::with_return(name.into(), Some(return_type))
    }

    pub fn constructor() -> Self {
        Self::with_return(CONSTRUCTOR_NAME.to_string(), None)
    }

    fn with_return(name: String, return_type: Option<TypeReference>) -> Self {
        Self {
            name,
            modifiers: ModifierSet::new(),
            annotations: Vec::new(),
            documentation: None,
            type_parameters: Vec::new(),
            return_type,
            parameters: Vec::new(),
            thrown: Vec::new(),
            default_value: None,
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeReference,
    pub annotations: Vec<AnnotationInstance>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }
}
