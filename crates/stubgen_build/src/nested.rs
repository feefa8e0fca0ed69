use crate::error::ReconstructError;
use crate::reconstruct::Reconstructor;
use std::collections::{HashMap, HashSet};
use stubgen_classfile::access::{has, ACC_PRIVATE, ACC_SYNTHETIC};
use stubgen_classfile::{CompiledModule, InnerClassEntry};
use stubgen_model::TypeModel;
use tracing::{debug, warn};

/// Per-run bookkeeping keyed by binary name. Types still being built are
/// never attached again, which breaks cycles in nesting metadata.
#[derive(Debug, Default)]
pub(crate) struct ReconstructionCache {
    in_progress: HashSet<String>,
    completed: HashMap<String, TypeModel>,
}

impl ReconstructionCache {
    pub fn begin(&mut self, binary_name: &str) {
        self.in_progress.insert(binary_name.to_string());
    }

    pub fn finish(&mut self, binary_name: &str) {
        self.in_progress.remove(binary_name);
    }

    fn is_in_progress(&self, binary_name: &str) -> bool {
        self.in_progress.contains(binary_name)
    }
}

impl Reconstructor<'_> {
    /// Member classes of `module`, in class-file order.
    pub(crate) fn nested_types(
        &self,
        module: &CompiledModule,
        cache: &mut ReconstructionCache,
    ) -> Vec<TypeModel> {
        module
            .member_classes()
            .filter_map(|entry| self.nested_type(entry, cache))
            .collect()
    }

    fn nested_type(
        &self,
        entry: &InnerClassEntry,
        cache: &mut ReconstructionCache,
    ) -> Option<TypeModel> {
        let binary_name = entry.inner_class.replace('/', ".");
        if has(entry.access_flags, ACC_SYNTHETIC) || has(entry.access_flags, ACC_PRIVATE) {
            debug!(nested = %binary_name, "nested type skipped");
            return None;
        }
        if self.config.is_excluded_nested(&binary_name) {
            debug!(nested = %binary_name, "generated helper type skipped");
            return None;
        }
        if cache.is_in_progress(&binary_name) {
            debug!(nested = %binary_name, "nesting cycle, not attached again");
            return None;
        }
        if let Some(done) = cache.completed.get(&binary_name) {
            debug!(nested = %binary_name, "nested type reused from cache");
            return Some(done.clone());
        }

        let built = self
            .locator
            .resolve(&binary_name)
            .map_err(ReconstructError::from)
            .and_then(|module| self.build(&module, Some(entry.access_flags), cache));
        match built {
            Ok(model) => {
                cache.completed.insert(binary_name, model.clone());
                Some(model)
            }
            Err(error) => {
                warn!(nested = %binary_name, %error, "skipping nested type");
                None
            }
        }
    }
}
