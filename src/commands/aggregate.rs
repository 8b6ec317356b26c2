//! Aggregate command implementation
//!
//! Assembles several features into one application. Bundles present in
//! more than one feature keep their highest version.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use feature_model::builder::{assemble_application, BuilderContext};
use feature_model::json::write_application_file;
use feature_model::model::{Application, ArtifactId};

use super::ResolverArgs;

/// Arguments for the aggregate command
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Feature files or artifact references to aggregate
    #[arg(value_name = "FEATURE", required = true)]
    pub features: Vec<String>,

    /// Framework artifact of the application
    #[arg(long, value_name = "ID")]
    pub framework: Option<String>,

    /// Directory searched for included features, may be repeated
    #[arg(long = "features-dir", value_name = "PATH")]
    pub features_dirs: Vec<PathBuf>,

    /// Output file for the application
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Execute the aggregate command
pub fn execute(args: AggregateArgs) -> Result<()> {
    let manager = Arc::new(args.resolver.manager()?);
    let features = args
        .features
        .iter()
        .map(|reference| super::read_feature_reference(reference, &manager))
        .collect::<Result<Vec<_>>>()?;

    let mut app = Application::new();
    if let Some(framework) = &args.framework {
        app.framework = Some(
            ArtifactId::parse(framework)
                .with_context(|| format!("Invalid framework id {}", framework))?,
        );
    }

    let context = BuilderContext::new(super::feature_provider(&args.features_dirs, manager)?);
    let app = assemble_application(Some(app), &context, &features)
        .context("Failed to assemble the application")?;
    write_application_file(&app, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Aggregated {} features ({} bundles) into {}",
        app.feature_ids().len(),
        app.bundles.len(),
        args.output.display()
    );
    Ok(())
}
