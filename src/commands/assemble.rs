//! Assemble command implementation
//!
//! Resolves the includes of a single feature and writes the assembled
//! feature as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use feature_model::builder::{assemble_feature, BuilderContext};
use feature_model::json::write_feature_file;
use feature_model::regions::ApiRegionsMergeHandler;

use super::ResolverArgs;

/// Arguments for the assemble command
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Feature file or artifact reference to assemble
    #[arg(value_name = "FEATURE")]
    pub feature: String,

    /// Directory searched for included features, may be repeated
    #[arg(long = "features-dir", value_name = "PATH")]
    pub features_dirs: Vec<PathBuf>,

    /// Output file for the assembled feature
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Execute the assemble command
pub fn execute(args: AssembleArgs) -> Result<()> {
    let manager = Arc::new(args.resolver.manager()?);
    let feature = super::read_feature_reference(&args.feature, &manager)?;
    let context = BuilderContext::new(super::feature_provider(&args.features_dirs, manager)?)
        .with_handler(ApiRegionsMergeHandler);

    let assembled = assemble_feature(&feature, &context)
        .with_context(|| format!("Failed to assemble {}", feature.id))?;
    write_feature_file(&assembled, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Assembled {} into {}", assembled.id, args.output.display());
    Ok(())
}
