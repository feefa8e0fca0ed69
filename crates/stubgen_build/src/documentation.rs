//! Reattaches documentation text to reconstructed declarations.

use crate::config::ReconstructionConfig;
use crate::members::BuiltExecutable;
use stubgen_docs::{
    render_templates, strip_stale_param_tags, DocText, DocumentationStore, MemberKey,
};
use stubgen_model::TypeParameter;
use tracing::debug;

pub(crate) struct DocumentationContext<'a> {
    pub store: &'a dyn DocumentationStore,
    pub config: &'a ReconstructionConfig,
    /// Binary name of the declaring type.
    pub type_name: &'a str,
}

impl DocumentationContext<'_> {
    pub fn type_documentation(&self, inline: Option<String>) -> Option<String> {
        let raw = inline.or_else(|| self.store.lookup(self.type_name, &MemberKey::Type))?;
        self.finish(&raw, &[] as &[&str])
    }

    pub fn field_documentation(&self, name: &str, inline: Option<String>) -> Option<String> {
        let raw = inline.or_else(|| self.store.lookup(self.type_name, &MemberKey::field(name)))?;
        self.finish(&raw, &[] as &[&str])
    }

    pub fn executable_documentation(&self, built: &BuiltExecutable) -> Option<String> {
        let spec = &built.spec;
        let raw = match &built.inline_documentation {
            Some(inline) => inline.clone(),
            None => self.stored_executable_text(built)?,
        };
        let names = spec.parameter_names();

        let raw = if self.config.validate_param_tags && built.names_recovered {
            self.without_stale_params(&spec.name, raw, &names, &spec.type_parameters)
        } else {
            raw
        };
        self.finish(&raw, &names)
    }

    /// Stored text under the generic key, falling back to the erased one.
    fn stored_executable_text(&self, built: &BuiltExecutable) -> Option<String> {
        let spec = &built.spec;
        let key = MemberKey::method(
            spec.name.clone(),
            spec.parameters.iter().map(|param| param.ty.documentation_key()),
        );
        if let Some(text) = self.store.lookup(self.type_name, &key) {
            return Some(text);
        }
        let erased = MemberKey::method(
            spec.name.clone(),
            built.erased_parameters.iter().map(|ty| ty.documentation_key()),
        );
        if erased == key {
            return None;
        }
        self.store.lookup(self.type_name, &erased)
    }

    fn without_stale_params(
        &self,
        member: &str,
        raw: String,
        names: &[&str],
        type_parameters: &[TypeParameter],
    ) -> String {
        let type_names: Vec<&str> = type_parameters.iter().map(|tp| tp.name.as_str()).collect();
        let parsed = DocText::parse(&raw);
        let all_valid = parsed.named_tags("param").keys().all(|tag| {
            match tag.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
                Some(type_name) => type_names.contains(&type_name),
                None => names.contains(&tag.as_str()),
            }
        });
        if all_valid {
            return raw;
        }
        let outcome = strip_stale_param_tags(&raw, names, &type_names);
        debug!(
            type_name = self.type_name,
            member,
            removed = ?outcome.removed,
            "removed stale parameter tags"
        );
        outcome.text
    }

    fn finish<S: AsRef<str>>(&self, raw: &str, parameters: &[S]) -> Option<String> {
        let text = if self.config.templates.enabled {
            render_templates(raw, &self.config.templates.values, parameters)
        } else {
            raw.trim().to_string()
        };
        (!text.is_empty()).then_some(text)
    }
}
