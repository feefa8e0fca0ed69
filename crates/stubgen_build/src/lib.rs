// stubgen_build - Reconstruction of documented type models from class files
pub mod batch;
pub mod config;
mod docs;
mod documentation;
mod error;
pub mod locator;
mod members;
mod nested;
mod reconstruct;
pub mod values;

pub use batch::{reconstruct_all, BatchReport, FailureReport};
pub use config::{ConfigError, ReconstructionConfig, TemplateConfig};
pub use docs::ColocatedDocumentationStore;
pub use error::{LocateError, ReconstructError};
pub use locator::{
    ArchiveLocator, ClassLocator, ClasspathLocator, DirectoryLocator, FallbackLocator,
    InMemoryLocator,
};
pub use members::TRAIT_IMPLEMENTED_MARKER;
pub use reconstruct::Reconstructor;
