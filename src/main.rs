mod config;
mod error;
mod genepanels;
mod input;
mod logging;
mod manifest;
mod pipeline;
mod platform;

#[cfg(test)]
#[path = "../tests/src_inline/fixtures.rs"]
mod fixtures;

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::config::AssayConfig;
use crate::error::{ReportsError, Result};
use crate::pipeline::{ManifestSource, ReportsRequest, run_reports};
use crate::platform::dx::DxCli;

#[derive(Debug, Parser)]
#[command(
    name = "dias-reports",
    author,
    version,
    about = "Resolve manifests to gene panels and launch the reports workflow as a batch job"
)]
struct Cli {
    /// Logging verbosity (e.g. error, warn, info, debug)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set off reports jobs for samples booked in an Epic or Gemini manifest.
    Reports(ReportsArgs),
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("manifest")
        .required(true)
        .args(["epic_manifest", "gemini_manifest"])
))]
struct ReportsArgs {
    /// Single-sample workflow output folder, e.g. /output/CEN-240101_1200
    #[arg(value_name = "INPUT_DIR")]
    input_dir: String,

    /// Assay identifier used to name the output folder
    #[arg(long)]
    assay_id: String,

    /// Assay config JSON
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Epic manifest with sample identifiers and test codes
    #[arg(long, value_name = "FILE")]
    epic_manifest: Option<PathBuf>,

    /// Gemini manifest with X numbers and clinical indications
    #[arg(long, value_name = "FILE")]
    gemini_manifest: Option<PathBuf>,

    /// Set everything up but delete the output folder instead of running
    #[arg(long)]
    dry_run: bool,

    /// Do not submit when the batch file fails its column check
    #[arg(long)]
    strict_batch: bool,

    /// Local folder for the batch file and job report
    #[arg(long, value_name = "DIR", default_value = ".")]
    work_dir: PathBuf,

    /// dx client to invoke
    #[arg(long, value_name = "PATH", default_value = "dx")]
    dx: String,
}

impl ReportsArgs {
    fn manifest_source(&self) -> Result<ManifestSource> {
        match (&self.epic_manifest, &self.gemini_manifest) {
            (Some(path), None) => Ok(ManifestSource::Epic(path.clone())),
            (None, Some(path)) => Ok(ManifestSource::Gemini(path.clone())),
            _ => Err(ReportsError::Precondition(
                "exactly one of --epic-manifest or --gemini-manifest is required".to_string(),
            )),
        }
    }

    fn request(&self) -> Result<ReportsRequest> {
        Ok(ReportsRequest {
            assay_id: self.assay_id.clone(),
            input_dir: self.input_dir.clone(),
            manifest: self.manifest_source()?,
            dry_run: self.dry_run,
            strict_batch: self.strict_batch,
            work_dir: self.work_dir.clone(),
        })
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Reports(args) => {
            let config = AssayConfig::from_path(&args.config)?;
            let request = args.request()?;
            let platform = DxCli::new(args.dx.clone());
            let outcome = run_reports(&platform, &config, &request)?;
            tracing::info!(
                "reports output folder {} ({} jobs)",
                outcome.output_dir,
                outcome.jobs.starting.len()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
