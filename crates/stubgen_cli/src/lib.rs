// stubgen CLI library
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stubgen_build::{
    reconstruct_all, BatchReport, ClassLocator, ClasspathLocator, ColocatedDocumentationStore,
    DirectoryLocator, ReconstructionConfig, Reconstructor,
};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "stubgen")]
#[command(about = "Rebuilds documented type skeletons from compiled classes")]
#[command(version)]
pub struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct the named types
    Reconstruct {
        #[command(flatten)]
        options: SharedOptions,
        /// Binary names such as `com.example.Outer$Inner`
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// Reconstruct every top-level type found in a class output directory
    Scan {
        /// Directory of compiled classes
        classes: PathBuf,
        #[command(flatten)]
        options: SharedOptions,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SharedOptions {
    /// Directories and jar files to search; may be repeated or joined with
    /// the platform path separator
    #[arg(long, short = 'c')]
    pub classpath: Vec<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write one JSON file per type into this directory instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Template value as KEY=VALUE; enables templating
    #[arg(long = "template", value_parser = parse_template)]
    pub templates: Vec<(String, String)>,
}

pub fn parse_template(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

/// Configuration file (or defaults) with command line template values on top.
pub fn load_config(options: &SharedOptions) -> Result<ReconstructionConfig> {
    let mut config = match &options.config {
        Some(path) => ReconstructionConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ReconstructionConfig::default(),
    };
    for (key, value) in &options.templates {
        config = config.with_template_value(key.clone(), value.clone());
    }
    Ok(config)
}

/// Search path from `--classpath`, with `classes` (when scanning) first.
pub fn build_locator(classes: Option<&Path>, classpath: &[String]) -> Result<ClasspathLocator> {
    let mut locator = ClasspathLocator::new();
    if let Some(dir) = classes {
        locator.push(DirectoryLocator::new(dir));
    }
    let rest = ClasspathLocator::from_paths(classpath).context("Failed to open classpath")?;
    if !rest.is_empty() {
        locator.push(rest);
    }
    Ok(locator)
}

/// Binary names of the top-level classes under `dir`, sorted.
pub fn scan_type_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("class")
        {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let parts: Vec<String> = relative
            .with_extension("")
            .components()
            .map(|part| part.as_os_str().to_string_lossy().into_owned())
            .collect();
        let Some(simple) = parts.last() else { continue };
        if simple.contains('$') || simple == "package-info" || simple == "module-info" {
            debug!(path = %path.display(), "not a top-level type");
            continue;
        }
        names.push(parts.join("."));
    }
    names.sort();
    Ok(names)
}

/// Runs a batch and writes its models; returns the report for exit status.
pub fn run_batch(
    locator: ClasspathLocator,
    config: &ReconstructionConfig,
    types: &[String],
    out: Option<&Path>,
) -> Result<BatchReport> {
    let locator: Arc<dyn ClassLocator> = Arc::new(locator);
    let docs = ColocatedDocumentationStore::with_suffix(
        Arc::clone(&locator),
        config.documentation_suffix.clone(),
    );
    let reconstructor = Reconstructor::new(locator.as_ref(), &docs, config);

    info!(types = types.len(), "reconstructing");
    let report = reconstruct_all(&reconstructor, types);
    write_models(&report, out)?;
    Ok(report)
}

pub fn write_models(report: &BatchReport, out: Option<&Path>) -> Result<()> {
    match out {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
            for model in &report.models {
                let path = dir.join(format!("{}.json", model.name.binary_name()));
                let json = serde_json::to_string_pretty(model)
                    .context("Failed to serialize type model")?;
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        None => {
            let json = serde_json::to_string_pretty(&report.models)
                .context("Failed to serialize type models")?;
            println!("{json}");
        }
    }
    Ok(())
}

/// One line per failed type, `type: cause`.
pub fn failure_lines(report: &BatchReport) -> Vec<String> {
    report
        .failures
        .iter()
        .map(|failure| format!("{}: {}", failure.type_name, failure.cause))
        .collect()
}
