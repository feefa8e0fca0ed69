use crate::error::ReconstructError;
use crate::reconstruct::Reconstructor;
use rayon::prelude::*;
use stubgen_model::TypeModel;
use tracing::{info, warn};

/// A type that could not be reconstructed, with the reason.
#[derive(Debug)]
pub struct FailureReport {
    pub type_name: String,
    pub cause: ReconstructError,
}

/// Outcome of reconstructing many top-level types. Order follows the input.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub models: Vec<TypeModel>,
    pub failures: Vec<FailureReport>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconstructs every named type in parallel. A failing type never stops
/// the others.
pub fn reconstruct_all<S>(reconstructor: &Reconstructor<'_>, type_names: &[S]) -> BatchReport
where
    S: AsRef<str> + Sync,
{
    let results: Vec<(String, Result<TypeModel, ReconstructError>)> = type_names
        .par_iter()
        .map(|name| {
            let name = name.as_ref();
            (name.to_string(), reconstructor.reconstruct(name))
        })
        .collect();

    let mut report = BatchReport::default();
    for (type_name, result) in results {
        match result {
            Ok(model) => report.models.push(model),
            Err(cause) => {
                warn!(type_name = %type_name, error = %cause, "reconstruction failed");
                report.failures.push(FailureReport { type_name, cause });
            }
        }
    }
    info!(
        reconstructed = report.models.len(),
        failed = report.failures.len(),
        "batch finished"
    );
    report
}
