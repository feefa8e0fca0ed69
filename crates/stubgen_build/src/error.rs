use std::io;
use std::path::PathBuf;
use stubgen_classfile::{ClassParseError, SignatureError};
use stubgen_model::InvariantViolation;
use thiserror::Error;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("type {0} not found on the search path")]
    NotFound(String),
    #[error("IO error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ZIP error while reading {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("class parse error in {name}: {source}")]
    ClassFile {
        name: String,
        #[source]
        source: ClassParseError,
    },
}

/// Why a single type could not be reconstructed.
#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error(transparent)]
    Lookup(#[from] LocateError),
    #[error("malformed signature on {declaration}: {source}")]
    Grammar {
        declaration: String,
        #[source]
        source: SignatureError,
    },
    #[error("malformed class data on {declaration}: {source}")]
    ClassFile {
        declaration: String,
        #[source]
        source: ClassParseError,
    },
    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}
