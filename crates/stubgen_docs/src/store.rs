use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Identifies one documented declaration within a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKey {
    /// The type's own documentation.
    Type,
    Field(String),
    /// Constructors use the name `<init>`. Parameter types are dotted names
    /// without type arguments, e.g. `java.util.List`, `int[]` or `T`.
    Method {
        name: String,
        parameter_types: Vec<String>,
    },
}

impl MemberKey {
    pub fn field(name: impl Into<String>) -> Self {
        MemberKey::Field(name.into())
    }

    pub fn method<I, S>(name: impl Into<String>, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemberKey::Method {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Type => f.write_str("classDoc"),
            MemberKey::Field(name) => write!(f, "field.{name}"),
            MemberKey::Method {
                name,
                parameter_types,
            } => write!(f, "method.{name}({})", parameter_types.join(",")),
        }
    }
}

/// Source of documentation text recorded when the types were compiled.
///
/// `type_name` is the binary name of the declaring type (`a.b.Outer$Inner`).
/// A missing entry is not an error; it simply means "undocumented".
pub trait DocumentationStore: Send + Sync {
    fn lookup(&self, type_name: &str, key: &MemberKey) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentationStore {
    entries: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryDocumentationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, type_name: impl Into<String>, key: &MemberKey, text: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_name.into())
            .or_default()
            .insert(key.to_string(), text.into());
    }

    pub fn with_entry(self, type_name: &str, key: &MemberKey, text: &str) -> Self {
        self.insert(type_name, key, text);
        self
    }
}

impl DocumentationStore for InMemoryDocumentationStore {
    fn lookup(&self, type_name: &str, key: &MemberKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(type_name)?.get(&key.to_string()).cloned()
    }
}
