use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified name of a (possibly nested) class.
///
/// `simple_names` holds the outer→inner chain, so `java.util.Map.Entry` is
/// stored as package `java.util` with names `["Map", "Entry"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassName {
    pub package: String,
    pub simple_names: Vec<String>,
}

impl ClassName {
    pub fn new(package: impl Into<String>, simple_names: Vec<String>) -> Self {
        Self {
            package: package.into(),
            simple_names,
        }
    }

    pub fn top_level(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self::new(package, vec![simple_name.into()])
    }

    pub fn object() -> Self {
        Self::top_level("java.lang", "Object")
    }

    pub fn simple_name(&self) -> &str {
        self.simple_names
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn is_nested(&self) -> bool {
        self.simple_names.len() > 1
    }

    /// Name of the directly enclosing class, if this is a nested class.
    pub fn enclosing(&self) -> Option<ClassName> {
        if !self.is_nested() {
            return None;
        }
        let mut names = self.simple_names.clone();
        names.pop();
        Some(Self::new(self.package.clone(), names))
    }

    pub fn nested(&self, simple_name: impl Into<String>) -> ClassName {
        let mut names = self.simple_names.clone();
        names.push(simple_name.into());
        Self::new(self.package.clone(), names)
    }

    /// Source-level name: `pkg.Outer.Inner`.
    pub fn canonical_name(&self) -> String {
        self.join('.')
    }

    /// Runtime name: `pkg.Outer$Inner`.
    pub fn binary_name(&self) -> String {
        self.join('$')
    }

    /// Class-file name: `pkg/Outer$Inner`.
    pub fn internal_name(&self) -> String {
        self.binary_name().replace('.', "/")
    }

    fn join(&self, nesting: char) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package);
            out.push('.');
        }
        for (index, name) in self.simple_names.iter().enumerate() {
            if index > 0 {
                out.push(nesting);
            }
            out.push_str(name);
        }
        out
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub fn from_descriptor(code: u8) -> Option<Self> {
        let primitive = match code {
            b'Z' => PrimitiveType::Boolean,
            b'B' => PrimitiveType::Byte,
            b'C' => PrimitiveType::Char,
            b'S' => PrimitiveType::Short,
            b'I' => PrimitiveType::Int,
            b'J' => PrimitiveType::Long,
            b'F' => PrimitiveType::Float,
            b'D' => PrimitiveType::Double,
            b'V' => PrimitiveType::Void,
            _ => return None,
        };
        Some(primitive)
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }

    pub const fn descriptor_char(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
            PrimitiveType::Void => 'V',
        }
    }

    /// Number of local variable slots a value of this type occupies.
    pub const fn slot_size(self) -> u16 {
        match self {
            PrimitiveType::Long | PrimitiveType::Double => 2,
            PrimitiveType::Void => 0,
            _ => 1,
        }
    }
}

/// Variance kind for wildcard type arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardKind {
    Unbounded,
    Extends,
    Super,
}

/// A type as it appears in a declaration, with generics when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReference {
    Primitive(PrimitiveType),
    Array(Box<TypeReference>),
    Class {
        name: ClassName,
        type_args: Vec<TypeReference>,
    },
    TypeVariable(String),
    Wildcard {
        kind: WildcardKind,
        bound: Option<Box<TypeReference>>,
    },
}

impl TypeReference {
    pub fn class(name: ClassName) -> Self {
        TypeReference::Class {
            name,
            type_args: Vec::new(),
        }
    }

    pub fn parameterized(name: ClassName, type_args: Vec<TypeReference>) -> Self {
        TypeReference::Class { name, type_args }
    }

    pub fn array_of(element: TypeReference) -> Self {
        TypeReference::Array(Box::new(element))
    }

    pub fn type_variable(name: impl Into<String>) -> Self {
        TypeReference::TypeVariable(name.into())
    }

    pub fn void() -> Self {
        TypeReference::Primitive(PrimitiveType::Void)
    }

    pub fn object() -> Self {
        TypeReference::class(ClassName::object())
    }

    pub fn wildcard_unbounded() -> Self {
        TypeReference::Wildcard {
            kind: WildcardKind::Unbounded,
            bound: None,
        }
    }

    pub fn wildcard_extends(bound: TypeReference) -> Self {
        TypeReference::Wildcard {
            kind: WildcardKind::Extends,
            bound: Some(Box::new(bound)),
        }
    }

    pub fn wildcard_super(bound: TypeReference) -> Self {
        TypeReference::Wildcard {
            kind: WildcardKind::Super,
            bound: Some(Box::new(bound)),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeReference::Primitive(PrimitiveType::Void))
    }

    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            TypeReference::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Name used for this type inside documentation member keys: type
    /// arguments dropped, nested classes dotted, type variables by name.
    pub fn documentation_key(&self) -> String {
        match self {
            TypeReference::Primitive(primitive) => primitive.keyword().to_string(),
            TypeReference::Array(element) => format!("{}[]", element.documentation_key()),
            TypeReference::Class { name, .. } => name.canonical_name(),
            TypeReference::TypeVariable(name) => name.clone(),
            TypeReference::Wildcard { bound, .. } => bound
                .as_ref()
                .map(|bound| bound.documentation_key())
                .unwrap_or_else(|| ClassName::object().canonical_name()),
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Primitive(primitive) => f.write_str(primitive.keyword()),
            TypeReference::Array(element) => write!(f, "{element}[]"),
            TypeReference::Class { name, type_args } => {
                write!(f, "{name}")?;
                if !type_args.is_empty() {
                    f.write_str("<")?;
                    for (index, arg) in type_args.iter().enumerate() {
                        if index > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeReference::TypeVariable(name) => f.write_str(name),
            TypeReference::Wildcard { kind, bound } => match (kind, bound) {
                (WildcardKind::Extends, Some(bound)) => write!(f, "? extends {bound}"),
                (WildcardKind::Super, Some(bound)) => write!(f, "? super {bound}"),
                _ => f.write_str("?"),
            },
        }
    }
}

/// Formal type parameter with its bounds in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<TypeReference>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    pub fn with_bounds(name: impl Into<String>, bounds: Vec<TypeReference>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }
}
