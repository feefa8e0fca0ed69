use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use stubgen_classfile::names::DYNAMIC_OBJECT_MARKER;
use thiserror::Error;

/// Annotation whose `value` carries documentation written at compile time.
pub const DEFAULT_DOC_ANNOTATION: &str = "com.blackbuild.annodocimal.annotations.AnnoDoc";

/// File name suffix of the documentation stored next to a class file.
pub const DEFAULT_DOCUMENTATION_SUFFIX: &str = "__annodoc.properties";

/// Settings that shape which declarations end up in a reconstructed model.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Qualified name of the inline documentation annotation.
    pub doc_annotation: String,
    /// Annotations marking members as internal; such members are skipped.
    pub internal_annotations: Vec<String>,
    /// Supertypes added by compilers that never appear in a model.
    pub marker_interfaces: Vec<String>,
    /// Method names skipped on every type.
    pub excluded_methods: Vec<String>,
    /// Binary name suffixes of generated helper classes that are never
    /// attached as nested types.
    pub excluded_nested_suffixes: Vec<String>,
    pub documentation_suffix: String,
    /// Remove `@param` tags naming parameters the method no longer has.
    pub validate_param_tags: bool,
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub enabled: bool,
    pub values: IndexMap<String, String>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            doc_annotation: DEFAULT_DOC_ANNOTATION.to_string(),
            internal_annotations: vec!["groovy.transform.Internal".to_string()],
            marker_interfaces: vec![DYNAMIC_OBJECT_MARKER.to_string()],
            excluded_methods: vec!["getMetaClass".to_string(), "setMetaClass".to_string()],
            excluded_nested_suffixes: vec![
                "$Trait$Helper".to_string(),
                "$Trait$FieldHelper".to_string(),
                "$Trait$StaticFieldHelper".to_string(),
            ],
            documentation_suffix: DEFAULT_DOCUMENTATION_SUFFIX.to_string(),
            validate_param_tags: true,
            templates: TemplateConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ReconstructionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Adds a template value and turns templating on.
    pub fn with_template_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.templates.enabled = true;
        self.templates.values.insert(key.into(), value.into());
        self
    }

    /// Whether `name` (canonical or binary form) is an internal-use marker.
    pub fn is_internal_annotation(&self, canonical: &str, binary: &str) -> bool {
        self.internal_annotations
            .iter()
            .any(|marker| marker == canonical || marker == binary)
    }

    pub fn is_doc_annotation(&self, canonical: &str, binary: &str) -> bool {
        self.doc_annotation == canonical || self.doc_annotation == binary
    }

    pub fn is_excluded_nested(&self, binary_name: &str) -> bool {
        self.excluded_nested_suffixes
            .iter()
            .any(|suffix| binary_name.ends_with(suffix.as_str()))
    }
}
