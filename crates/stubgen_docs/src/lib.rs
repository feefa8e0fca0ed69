// stubgen_docs - Documentation comments: parsing, templates, stale tag removal and lookup
mod params;
pub mod properties;
mod sentence;
pub mod store;
pub mod template;
mod text;

pub use params::{strip_stale_param_tags, ParamTagOutcome};
pub use properties::{PropertiesDocumentation, PropertiesError};
pub use store::{DocumentationStore, InMemoryDocumentationStore, MemberKey};
pub use template::{render_templates, TemplateValues};
pub use text::DocText;
