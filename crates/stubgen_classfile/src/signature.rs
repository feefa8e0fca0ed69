//! Recursive-descent parser for the generic `Signature` attribute grammar.
//!
//! Three entry points match the three forms a signature can take:
//!
//! ```text
//! class:  [<FormalTypeParameters>] SuperclassSignature {SuperinterfaceSignature}
//! method: [<FormalTypeParameters>] ( {JavaTypeSignature} ) Result {^ThrowsSignature}
//! field:  ReferenceTypeSignature
//! ```
//!
//! Every parser consumes the whole input; trailing characters after a
//! complete production are reported as malformed.

use crate::error::SignatureError;
use crate::names::class_name_from_internal;
use stubgen_model::{PrimitiveType, TypeParameter, TypeReference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: TypeReference,
    pub interfaces: Vec<TypeReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeReference>,
    pub return_type: TypeReference,
    pub thrown: Vec<TypeReference>,
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    let type_parameters = parser.parse_formal_type_parameters()?;
    let superclass = parser.parse_class_type()?;
    let mut interfaces = Vec::new();
    while !parser.at_end() {
        interfaces.push(parser.parse_class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        superclass,
        interfaces,
    })
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    let type_parameters = parser.parse_formal_type_parameters()?;

    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while parser.peek() != Some(b')') {
        parameters.push(parser.parse_java_type()?);
    }
    parser.expect(b')')?;

    let return_type = if parser.peek() == Some(b'V') {
        parser.pos += 1;
        TypeReference::void()
    } else {
        parser.parse_java_type()?
    };

    let mut thrown = Vec::new();
    while parser.peek() == Some(b'^') {
        parser.pos += 1;
        thrown.push(match parser.peek() {
            Some(b'T') => parser.parse_type_variable()?,
            _ => parser.parse_class_type()?,
        });
    }
    parser.finish()?;

    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        thrown,
    })
}

pub fn parse_field_signature(signature: &str) -> Result<TypeReference, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    let ty = parser.parse_reference_type()?;
    parser.finish()?;
    Ok(ty)
}

struct SignatureParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> SignatureError {
        SignatureError {
            signature: self.text.to_string(),
            position: self.pos,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, expected: u8) -> Result<(), SignatureError> {
        match self.peek() {
            Some(current) if current == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(current) => Err(self.error(format!(
                "expected '{}', found '{}'",
                expected as char, current as char
            ))),
            None => Err(self.error(format!("expected '{}', found end", expected as char))),
        }
    }

    fn finish(&self) -> Result<(), SignatureError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    /// Reads an identifier up to (not including) any of `stops`.
    fn identifier(&mut self, stops: &[u8]) -> Result<&'a str, SignatureError> {
        let start = self.pos;
        while let Some(current) = self.peek() {
            if stops.contains(&current) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        if self.at_end() {
            return Err(self.error("unterminated identifier"));
        }
        let text = self.text;
        Ok(&text[start..self.pos])
    }

    fn parse_formal_type_parameters(&mut self) -> Result<Vec<TypeParameter>, SignatureError> {
        if self.peek() != Some(b'<') {
            return Ok(Vec::new());
        }
        self.pos += 1;

        let mut parameters = Vec::new();
        while self.peek() != Some(b'>') {
            let name = self.identifier(b":>;<")?.to_string();
            self.expect(b':')?;

            let mut bounds = Vec::new();
            // The class bound may be empty when only interface bounds exist.
            if !matches!(self.peek(), Some(b':') | Some(b'>')) {
                bounds.push(self.parse_reference_type()?);
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                bounds.push(self.parse_reference_type()?);
            }
            parameters.push(TypeParameter::with_bounds(name, bounds));

            if self.at_end() {
                return Err(self.error("unterminated type parameters"));
            }
        }
        self.pos += 1;

        if parameters.is_empty() {
            return Err(self.error("empty type parameter list"));
        }
        Ok(parameters)
    }

    fn parse_java_type(&mut self) -> Result<TypeReference, SignatureError> {
        match self.peek() {
            Some(code @ (b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z')) => {
                self.pos += 1;
                PrimitiveType::from_descriptor(code)
                    .map(TypeReference::Primitive)
                    .ok_or_else(|| self.error("unknown base type"))
            }
            _ => self.parse_reference_type(),
        }
    }

    fn parse_reference_type(&mut self) -> Result<TypeReference, SignatureError> {
        match self.peek() {
            Some(b'L') => self.parse_class_type(),
            Some(b'T') => self.parse_type_variable(),
            Some(b'[') => {
                self.pos += 1;
                Ok(TypeReference::array_of(self.parse_java_type()?))
            }
            Some(other) => Err(self.error(format!(
                "expected reference type, found '{}'",
                other as char
            ))),
            None => Err(self.error("expected reference type, found end")),
        }
    }

    fn parse_type_variable(&mut self) -> Result<TypeReference, SignatureError> {
        self.expect(b'T')?;
        let name = self.identifier(b";<>.:/[")?;
        self.expect(b';')?;
        Ok(TypeReference::type_variable(name))
    }

    fn parse_class_type(&mut self) -> Result<TypeReference, SignatureError> {
        self.expect(b'L')?;
        let path = self.identifier(b"<.;")?;
        let mut name = class_name_from_internal(path);
        let mut type_args = self.parse_type_arguments()?;

        // Inner class suffixes: `.Inner<...>` replaces the pending arguments.
        while self.peek() == Some(b'.') {
            self.pos += 1;
            let simple = self.identifier(b"<.;/")?;
            name = name.nested(simple);
            type_args = self.parse_type_arguments()?;
        }

        self.expect(b';')?;
        Ok(TypeReference::parameterized(name, type_args))
    }

    fn parse_type_arguments(&mut self) -> Result<Vec<TypeReference>, SignatureError> {
        if self.peek() != Some(b'<') {
            return Ok(Vec::new());
        }
        self.pos += 1;

        let mut arguments = Vec::new();
        loop {
            let argument = match self.peek() {
                Some(b'>') => break,
                Some(b'*') => {
                    self.pos += 1;
                    TypeReference::wildcard_unbounded()
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeReference::wildcard_extends(self.parse_reference_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeReference::wildcard_super(self.parse_reference_type()?)
                }
                Some(_) => self.parse_reference_type()?,
                None => return Err(self.error("unterminated type arguments")),
            };
            arguments.push(argument);
        }
        self.pos += 1;

        if arguments.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(arguments)
    }
}
