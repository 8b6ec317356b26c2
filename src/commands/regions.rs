//! Regions command implementation
//!
//! Assembles features with the API regions handlers registered and writes
//! the derived region property files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use feature_model::builder::{assemble_feature, BuilderContext};
use feature_model::merge::{post_process, ExtensionHandlers};
use feature_model::regions::{
    ApiRegionsMergeHandler, BundleSymbolicNameHandler, RegionDataFiles, RegionMapHandler,
};

use super::ResolverArgs;

/// Arguments for the regions command
#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// Feature files or artifact references to derive region data from
    #[arg(value_name = "FEATURE", required = true)]
    pub features: Vec<String>,

    /// Directory receiving the region property files
    #[arg(long, value_name = "PATH")]
    pub output_dir: PathBuf,

    /// Also resolve every bundle and record its symbolic name and version
    #[arg(long)]
    pub bsn: bool,

    /// Directory searched for included features, may be repeated
    #[arg(long = "features-dir", value_name = "PATH")]
    pub features_dirs: Vec<PathBuf>,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Execute the regions command
pub fn execute(args: RegionsArgs) -> Result<()> {
    let manager = Arc::new(args.resolver.manager()?);
    let files = RegionDataFiles::in_directory(&args.output_dir);

    let mut handlers = ExtensionHandlers::new()
        .with(ApiRegionsMergeHandler)
        .with(RegionMapHandler::new(files.clone())?);
    if args.bsn {
        handlers.register(Box::new(BundleSymbolicNameHandler::new(
            &files.idbsnver,
            manager.clone(),
        )?));
    }
    let context = BuilderContext::new(super::feature_provider(&args.features_dirs, manager.clone())?)
        .with_handlers(handlers);

    for reference in &args.features {
        let feature = super::read_feature_reference(reference, &manager)?;
        let mut assembled = assemble_feature(&feature, &context)
            .with_context(|| format!("Failed to assemble {}", feature.id))?;
        post_process(&mut assembled, context.handlers())
            .with_context(|| format!("Failed to derive regions of {}", feature.id))?;
    }

    println!(
        "Wrote region data for {} features to {}",
        args.features.len(),
        args.output_dir.display()
    );
    Ok(())
}
