//! Fetch command implementation
//!
//! Resolves artifact references in parallel and prints where each one was
//! found.

use anyhow::Result;
use clap::Args;

use super::ResolverArgs;

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Artifact references: mvn: URLs, absolute URLs or file paths
    #[arg(value_name = "REF", required = true)]
    pub references: Vec<String>,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

/// Execute the fetch command
pub fn execute(args: FetchArgs) -> Result<()> {
    let manager = args.resolver.manager()?;
    let results = manager.fetch_all(&args.references);

    let mut failures = 0;
    for (reference, result) in args.references.iter().zip(results) {
        match result {
            Ok(handler) => println!("{} -> {}", handler.url(), handler.file().display()),
            Err(e) => {
                eprintln!("{}: {}", reference, e);
                failures += 1;
            }
        }
    }

    let context = manager.context();
    log::info!(
        "Local: {}, cached: {}, downloaded: {}",
        context.local_artifacts(),
        context.cached_artifacts(),
        context.downloaded_artifacts()
    );

    if failures > 0 {
        anyhow::bail!(
            "{} of {} artifacts could not be resolved",
            failures,
            args.references.len()
        );
    }
    Ok(())
}
