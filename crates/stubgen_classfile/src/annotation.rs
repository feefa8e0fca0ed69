//! Raw annotation structures as stored in `Runtime*Annotations` and
//! `AnnotationDefault` attributes.

use crate::error::ClassParseError;
use crate::pool::ConstantPool;
use crate::reader::ClassReader;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/// A single `element_value` entry.
///
/// `Const::tag` keeps the raw tag byte (`B`, `C`, `D`, `F`, `I`, `J`,
/// `S`, `Z` or `s`) because `B`, `C`, `S`, `Z` and `I` all share integer
/// storage in the constant pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementValue {
    Const { tag: u8, value: ConstantValue },
    Enum { type_descriptor: String, const_name: String },
    Class { descriptor: String },
    Annotation(RawAnnotation),
    Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl RawAnnotation {
    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }
}

pub(crate) fn read_annotations(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<RawAnnotation>, ClassParseError> {
    let count = reader.read_u2()?;
    (0..count).map(|_| read_annotation(reader, pool)).collect()
}

pub(crate) fn read_parameter_annotations(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<Vec<RawAnnotation>>, ClassParseError> {
    let parameters = reader.read_u1()?;
    (0..parameters)
        .map(|_| read_annotations(reader, pool))
        .collect()
}

pub(crate) fn read_annotation(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<RawAnnotation, ClassParseError> {
    let type_index = reader.read_u2()?;
    let pairs = reader.read_u2()?;
    let mut elements = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        let name_index = reader.read_u2()?;
        let name = pool.utf8(name_index)?.to_string();
        elements.push((name, read_element_value(reader, pool)?));
    }
    Ok(RawAnnotation {
        type_descriptor: pool.utf8(type_index)?.to_string(),
        elements,
    })
}

pub(crate) fn read_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<ElementValue, ClassParseError> {
    let tag = reader.read_u1()?;
    let value = match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
            let index = reader.read_u2()?;
            let value = if tag == b's' {
                ConstantValue::String(pool.utf8(index)?.to_string())
            } else {
                pool.constant_value(index)?
            };
            ElementValue::Const { tag, value }
        }
        b'e' => {
            let type_index = reader.read_u2()?;
            let name_index = reader.read_u2()?;
            ElementValue::Enum {
                type_descriptor: pool.utf8(type_index)?.to_string(),
                const_name: pool.utf8(name_index)?.to_string(),
            }
        }
        b'c' => ElementValue::Class {
            descriptor: pool.utf8(reader.read_u2()?)?.to_string(),
        },
        b'@' => ElementValue::Annotation(read_annotation(reader, pool)?),
        b'[' => {
            let count = reader.read_u2()?;
            let values = (0..count)
                .map(|_| read_element_value(reader, pool))
                .collect::<Result<Vec<_>, _>>()?;
            ElementValue::Array(values)
        }
        other => {
            return Err(ClassParseError::InvalidElementTag {
                tag: other as char,
            })
        }
    };
    Ok(value)
}
