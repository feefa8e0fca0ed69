use crate::annotation::ConstantValue;
use crate::error::ClassParseError;
use crate::reader::ClassReader;

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Other,
    Unusable,
}

pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    Constant::Utf8(decode_modified_utf8(bytes)?)
                }
                3 => Constant::Integer(reader.read_u4()? as i32),
                4 => Constant::Float(f32::from_bits(reader.read_u4()?)),
                5 | 6 => {
                    let bits = reader.read_u8()?;
                    let value = if tag == 5 {
                        Constant::Long(bits as i64)
                    } else {
                        Constant::Double(f64::from_bits(bits))
                    };
                    // Eight-byte constants take up two pool slots.
                    entries.push(value);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 => Constant::String {
                    string_index: reader.read_u2()?,
                },
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                16 | 19 | 20 => {
                    reader.skip(2)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    /// Resolves an optional UTF-8 reference where index 0 means "absent".
    pub(crate) fn optional_utf8(&self, index: u16) -> Result<Option<String>, ClassParseError> {
        if index == 0 {
            return Ok(None);
        }
        self.utf8(index).map(|value| Some(value.to_string()))
    }

    pub(crate) fn class_name(&self, index: u16) -> Result<String, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => Ok(self.utf8(*name_index)?.to_string()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    pub(crate) fn optional_class_name(&self, index: u16) -> Result<Option<String>, ClassParseError> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    /// Loadable constant as referenced by `ConstantValue` attributes.
    pub(crate) fn constant_value(&self, index: u16) -> Result<ConstantValue, ClassParseError> {
        let value = match self.get(index)? {
            Constant::Integer(value) => ConstantValue::Int(*value),
            Constant::Float(value) => ConstantValue::Float(*value),
            Constant::Long(value) => ConstantValue::Long(*value),
            Constant::Double(value) => ConstantValue::Double(*value),
            Constant::String { string_index } => {
                ConstantValue::String(self.utf8(*string_index)?.to_string())
            }
            Constant::Utf8(value) => ConstantValue::String(value.clone()),
            _ => return Err(ClassParseError::InvalidConstantIndex { index }),
        };
        Ok(value)
    }
}

/// Decodes the JVM's modified UTF-8: NUL is stored as `C0 80` and
/// supplementary characters as surrogate pairs of three-byte sequences.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> Result<String, ClassParseError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let first = bytes[pos];
        if first & 0x80 == 0 {
            units.push(u16::from(first));
            pos += 1;
        } else if first & 0xE0 == 0xC0 {
            let second = *bytes.get(pos + 1).ok_or(ClassParseError::InvalidUtf8)?;
            units.push((u16::from(first & 0x1F) << 6) | u16::from(second & 0x3F));
            pos += 2;
        } else if first & 0xF0 == 0xE0 {
            let second = *bytes.get(pos + 1).ok_or(ClassParseError::InvalidUtf8)?;
            let third = *bytes.get(pos + 2).ok_or(ClassParseError::InvalidUtf8)?;
            units.push(
                (u16::from(first & 0x0F) << 12)
                    | (u16::from(second & 0x3F) << 6)
                    | u16::from(third & 0x3F),
            );
            pos += 3;
        } else {
            return Err(ClassParseError::InvalidUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| ClassParseError::InvalidUtf8)
}
