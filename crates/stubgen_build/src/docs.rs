use crate::config::DEFAULT_DOCUMENTATION_SUFFIX;
use crate::locator::ClassLocator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use stubgen_docs::{DocumentationStore, MemberKey, PropertiesDocumentation};
use tracing::{debug, warn};

/// Reads documentation from the properties file stored next to each class
/// file (`a/b/Outer$Inner__annodoc.properties`).
///
/// Each file is decoded at most once; unreadable or malformed files are
/// logged and treated as absent.
pub struct ColocatedDocumentationStore {
    locator: Arc<dyn ClassLocator>,
    suffix: String,
    cache: Mutex<HashMap<String, Option<Arc<PropertiesDocumentation>>>>,
}

impl ColocatedDocumentationStore {
    pub fn new(locator: Arc<dyn ClassLocator>) -> Self {
        Self::with_suffix(locator, DEFAULT_DOCUMENTATION_SUFFIX)
    }

    pub fn with_suffix(locator: Arc<dyn ClassLocator>, suffix: impl Into<String>) -> Self {
        Self {
            locator,
            suffix: suffix.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn resource_path(&self, type_name: &str) -> String {
        format!("{}{}", type_name.replace('.', "/"), self.suffix)
    }

    fn documentation_for(&self, type_name: &str) -> Option<Arc<PropertiesDocumentation>> {
        if let Some(cached) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
        {
            return cached.clone();
        }

        let loaded = self.load(type_name).map(Arc::new);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.to_string(), loaded.clone());
        loaded
    }

    fn load(&self, type_name: &str) -> Option<PropertiesDocumentation> {
        let path = self.resource_path(type_name);
        let bytes = match self.locator.resource(&path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(type_name, path = %path, "no documentation file");
                return None;
            }
            Err(error) => {
                warn!(type_name, path = %path, %error, "cannot read documentation file");
                return None;
            }
        };
        // Properties files are ISO-8859-1; every byte maps to the same code point.
        let text: String = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(error) => error.into_bytes().into_iter().map(char::from).collect(),
        };
        match PropertiesDocumentation::parse(&text) {
            Ok(docs) => Some(docs),
            Err(error) => {
                warn!(type_name, path = %path, %error, "malformed documentation file");
                None
            }
        }
    }
}

impl DocumentationStore for ColocatedDocumentationStore {
    fn lookup(&self, type_name: &str, key: &MemberKey) -> Option<String> {
        self.documentation_for(type_name)?
            .get(key)
            .map(str::to_string)
    }
}
