//! Erased field and method descriptors (`Ljava/lang/String;`, `(IJ)V`).

use crate::error::ClassParseError;
use crate::names::class_name_from_internal;
use stubgen_model::{PrimitiveType, TypeReference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<TypeReference>,
    pub return_type: TypeReference,
}

impl MethodDescriptor {
    /// Local variable slots used by the parameters, excluding `this`.
    pub fn parameter_slots(&self) -> Vec<u16> {
        self.parameters.iter().map(slot_size).collect()
    }
}

fn slot_size(ty: &TypeReference) -> u16 {
    match ty {
        TypeReference::Primitive(primitive) => primitive.slot_size(),
        _ => 1,
    }
}

pub fn parse_field_descriptor(descriptor: &str) -> Result<TypeReference, ClassParseError> {
    let mut parser = DescriptorParser::new(descriptor);
    let ty = parser.parse_type()?;
    if parser.remaining() != 0 {
        return Err(ClassParseError::InvalidDescriptor(descriptor.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, ClassParseError> {
    let mut parser = DescriptorParser::new(descriptor);
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while !parser.peek(b')')? {
        parameters.push(parser.parse_type()?);
    }
    parser.expect(b')')?;
    let return_type = if parser.peek(b'V')? {
        parser.pos += 1;
        TypeReference::void()
    } else {
        parser.parse_type()?
    };

    if parser.remaining() != 0 {
        return Err(ClassParseError::InvalidDescriptor(descriptor.to_string()));
    }

    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

/// Type named by a class literal descriptor inside an annotation; unlike
/// field descriptors this admits `V` for `void.class`.
pub fn parse_return_descriptor(descriptor: &str) -> Result<TypeReference, ClassParseError> {
    if descriptor == "V" {
        return Ok(TypeReference::void());
    }
    parse_field_descriptor(descriptor)
}

struct DescriptorParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self {
            text: descriptor,
            bytes: descriptor.as_bytes(),
            pos: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn error(&self, message: &str) -> ClassParseError {
        ClassParseError::InvalidDescriptor(format!("{message} in `{}`", self.text))
    }

    fn expect(&mut self, ch: u8) -> Result<(), ClassParseError> {
        if !self.peek(ch)? {
            return Err(self.error(&format!("expected '{}'", ch as char)));
        }
        self.pos += 1;
        Ok(())
    }

    fn peek(&self, ch: u8) -> Result<bool, ClassParseError> {
        match self.bytes.get(self.pos) {
            Some(current) => Ok(*current == ch),
            None => Err(self.error("unexpected end")),
        }
    }

    fn parse_type(&mut self) -> Result<TypeReference, ClassParseError> {
        let start = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| self.error("unexpected end"))?;
        match start {
            b'L' => self.parse_reference_type(),
            b'[' => {
                self.pos += 1;
                Ok(TypeReference::array_of(self.parse_type()?))
            }
            b'V' => Err(self.error("void outside return position")),
            code => match PrimitiveType::from_descriptor(code) {
                Some(primitive) => {
                    self.pos += 1;
                    Ok(TypeReference::Primitive(primitive))
                }
                None => Err(self.error(&format!("unexpected tag '{}'", code as char))),
            },
        }
    }

    fn parse_reference_type(&mut self) -> Result<TypeReference, ClassParseError> {
        self.expect(b'L')?;
        let start = self.pos;
        let end = self.bytes[start..]
            .iter()
            .position(|byte| *byte == b';')
            .map(|offset| start + offset)
            .ok_or_else(|| self.error("unterminated reference"))?;
        if end == start {
            return Err(self.error("empty class name"));
        }
        let name = &self.text[start..end];
        self.pos = end + 1;
        Ok(TypeReference::class(class_name_from_internal(name)))
    }
}
