use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("invalid modified UTF-8 string in constant pool")]
    InvalidUtf8,
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("unknown annotation element tag '{tag}'")]
    InvalidElementTag { tag: char },
    #[error("element value tag '{tag}' does not match its constant")]
    ConstantMismatch { tag: char },
    #[error("attribute {name} has trailing bytes")]
    AttributeLength { name: String },
}

/// Malformed generic signature text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed signature `{signature}` at offset {position}: {message}")]
pub struct SignatureError {
    pub signature: String,
    pub position: usize,
    pub message: String,
}
