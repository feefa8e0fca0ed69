//! Decoding of annotation element values and field constants into model
//! values.

use stubgen_classfile::descriptor::parse_return_descriptor;
use stubgen_classfile::{
    parse_field_descriptor, ClassParseError, ConstantValue, ElementValue, RawAnnotation,
};
use stubgen_model::{
    AnnotationInstance, AnnotationValue, ClassName, Literal, PrimitiveType, TypeReference,
};

pub fn annotation_instance(raw: &RawAnnotation) -> Result<AnnotationInstance, ClassParseError> {
    let mut instance = AnnotationInstance::new(annotation_type(raw)?);
    for (name, value) in &raw.elements {
        instance
            .entries
            .insert(name.clone(), annotation_value(value)?);
    }
    Ok(instance)
}

/// Type of a raw annotation, from its `Lpkg/Name;` descriptor.
pub fn annotation_type(raw: &RawAnnotation) -> Result<ClassName, ClassParseError> {
    class_from_descriptor(&raw.type_descriptor)
}

pub fn annotation_value(value: &ElementValue) -> Result<AnnotationValue, ClassParseError> {
    Ok(match value {
        ElementValue::Const { tag, value } => AnnotationValue::Literal(element_literal(*tag, value)?),
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => AnnotationValue::EnumConstant {
            ty: class_from_descriptor(type_descriptor)?,
            constant: const_name.clone(),
        },
        ElementValue::Class { descriptor } => {
            AnnotationValue::ClassRef(parse_return_descriptor(descriptor)?)
        }
        ElementValue::Annotation(nested) => AnnotationValue::Nested(annotation_instance(nested)?),
        ElementValue::Array(items) => AnnotationValue::Array(
            items
                .iter()
                .map(annotation_value)
                .collect::<Result<_, _>>()?,
        ),
    })
}

fn element_literal(tag: u8, value: &ConstantValue) -> Result<Literal, ClassParseError> {
    let literal = match (tag, value) {
        (b's', ConstantValue::String(text)) => Literal::String(text.clone()),
        (b'Z', ConstantValue::Int(v)) => Literal::Boolean(*v != 0),
        (b'B', ConstantValue::Int(v)) => Literal::Byte(*v as i8),
        (b'S', ConstantValue::Int(v)) => Literal::Short(*v as i16),
        (b'C', ConstantValue::Int(v)) => char_literal(*v),
        (b'I', ConstantValue::Int(v)) => Literal::Int(*v),
        (b'J', ConstantValue::Long(v)) => Literal::Long(*v),
        (b'F', ConstantValue::Float(v)) => Literal::Float(*v),
        (b'D', ConstantValue::Double(v)) => Literal::Double(*v),
        _ => return Err(ClassParseError::ConstantMismatch { tag: char::from(tag) }),
    };
    Ok(literal)
}

/// Literal for a `ConstantValue` attribute, typed by the field's descriptor.
pub fn field_constant(
    ty: &TypeReference,
    value: &ConstantValue,
) -> Result<Literal, ClassParseError> {
    let literal = match (ty, value) {
        (TypeReference::Primitive(primitive), ConstantValue::Int(v)) => match primitive {
            PrimitiveType::Boolean => Literal::Boolean(*v != 0),
            PrimitiveType::Byte => Literal::Byte(*v as i8),
            PrimitiveType::Short => Literal::Short(*v as i16),
            PrimitiveType::Char => char_literal(*v),
            PrimitiveType::Int => Literal::Int(*v),
            _ => return Err(mismatch(ty)),
        },
        (TypeReference::Primitive(PrimitiveType::Long), ConstantValue::Long(v)) => {
            Literal::Long(*v)
        }
        (TypeReference::Primitive(PrimitiveType::Float), ConstantValue::Float(v)) => {
            Literal::Float(*v)
        }
        (TypeReference::Primitive(PrimitiveType::Double), ConstantValue::Double(v)) => {
            Literal::Double(*v)
        }
        (TypeReference::Class { .. }, ConstantValue::String(text)) => {
            Literal::String(text.clone())
        }
        _ => return Err(mismatch(ty)),
    };
    Ok(literal)
}

fn mismatch(ty: &TypeReference) -> ClassParseError {
    let tag = match ty {
        TypeReference::Primitive(primitive) => primitive.descriptor_char(),
        TypeReference::Array(_) => '[',
        _ => 'L',
    };
    ClassParseError::ConstantMismatch { tag }
}

fn char_literal(code: i32) -> Literal {
    let unit = code as u16;
    match char::from_u32(u32::from(unit)) {
        Some(value) => Literal::Char {
            value,
            escaped: escape_char(value),
        },
        // Lone surrogate: no `char` exists, keep the escape only.
        None => Literal::Char {
            value: char::REPLACEMENT_CHARACTER,
            escaped: format!("\\u{unit:04x}"),
        },
    }
}

/// Body of a source character literal for `c`, without the quotes.
pub fn escape_char(c: char) -> String {
    match c {
        '\u{8}' => "\\b".to_string(),
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        '\u{c}' => "\\f".to_string(),
        '\r' => "\\r".to_string(),
        '"' => "\"".to_string(),
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        c if c.is_control() => format!("\\u{:04x}", u32::from(c)),
        c => c.to_string(),
    }
}

fn class_from_descriptor(descriptor: &str) -> Result<ClassName, ClassParseError> {
    match parse_field_descriptor(descriptor)? {
        TypeReference::Class { name, .. } => Ok(name),
        _ => Err(ClassParseError::InvalidDescriptor(descriptor.to_string())),
    }
}
