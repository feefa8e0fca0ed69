use crate::types::{ClassName, TypeReference};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Constant value carried by an annotation element or a constant field.
///
/// Numbers are kept as typed values; writing suffixes such as `L` or `f`
/// is left to whoever renders source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Boolean(bool),
    Byte(i8),
    /// `escaped` is the body of a source character literal, without quotes.
    Char { value: char, escaped: String },
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    Literal(Literal),
    EnumConstant { ty: ClassName, constant: String },
    ClassRef(TypeReference),
    Nested(AnnotationInstance),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Literal(Literal::String(value)) => Some(value),
            _ => None,
        }
    }
}

/// One annotation usage; element order follows the class file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInstance {
    pub ty: ClassName,
    pub entries: IndexMap<String, AnnotationValue>,
}

impl AnnotationInstance {
    pub fn new(ty: ClassName) -> Self {
        Self {
            ty,
            entries: IndexMap::new(),
        }
    }

    pub fn with_entry(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.entries.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
        self.entries.get(name)
    }
}
