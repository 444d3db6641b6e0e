//! The reports launch, stage by stage: discover samples, match them to the
//! manifest, resolve panels, build batch rows, write the batch file and job
//! report, then submit.

use std::path::{Path, PathBuf};

use crate::config::AssayConfig;
use crate::error::{ReportsError, Result};
use crate::genepanels::GenepanelsIndex;
use crate::manifest::{Manifest, ManifestKind};
use crate::platform::{Platform, SubmitRequest};

pub mod stage1_discover;
pub mod stage2_match;
pub mod stage3_resolve;
pub mod stage4_rows;
pub mod stage5_batch;
pub mod stage6_report;

use stage1_discover::{VCF_PATTERN, sample_names_from_vcfs};
use stage2_match::match_samples;
use stage3_resolve::resolve_indications;
use stage4_rows::{JobBuckets, build_rows, prepare_stage_rows};
use stage5_batch::{BatchCheck, BatchFile, assess_batch_file};
use stage6_report::{folder_basename, write_job_report};

/// Single-sample output folders must live under this root.
pub const INPUT_DIR_ROOT: &str = "/output/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Epic(PathBuf),
    Gemini(PathBuf),
}

impl ManifestSource {
    pub fn kind(&self) -> ManifestKind {
        match self {
            ManifestSource::Epic(_) => ManifestKind::Epic,
            ManifestSource::Gemini(_) => ManifestKind::Gemini,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ManifestSource::Epic(path) | ManifestSource::Gemini(path) => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportsRequest {
    pub assay_id: String,
    pub input_dir: String,
    pub manifest: ManifestSource,
    pub dry_run: bool,
    /// Refuse to submit when the batch file fails its column check.
    pub strict_batch: bool,
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportsOutcome {
    pub output_dir: String,
    pub batch_file: PathBuf,
    pub report_file: PathBuf,
    pub matched: Vec<String>,
    pub jobs: JobBuckets,
    pub check: BatchCheck,
    pub command: String,
}

pub fn check_input_dir(input_dir: &str) -> Result<()> {
    if !input_dir.starts_with(INPUT_DIR_ROOT) {
        return Err(ReportsError::Precondition(format!(
            "input directory must be a full path starting with {INPUT_DIR_ROOT}: {input_dir}"
        )));
    }
    Ok(())
}

pub fn run_reports(
    platform: &dyn Platform,
    config: &AssayConfig,
    request: &ReportsRequest,
) -> Result<ReportsOutcome> {
    check_input_dir(&request.input_dir)?;

    // Local inputs first so a bad file fails before anything is created remotely.
    let index = GenepanelsIndex::from_path(&config.genepanels_file)?;
    let mut manifest = Manifest::from_path(request.manifest.kind(), request.manifest.path())?;
    tracing::info!(
        "running reports with {} manifest {}",
        manifest.kind.label(),
        request.manifest.path().display()
    );

    let project = platform.project_context()?;
    tracing::info!(
        "jobs will be set off in project {} ({}) for assay {} {}",
        project.name,
        project.id,
        config.assay_name,
        config.assay_version.as_deref().unwrap_or("(unversioned)")
    );

    let output_dir = platform.create_workflow_output_folder(
        &config.rpt_workflow_id,
        &request.assay_id,
        &request.input_dir,
    )?;
    let stages = platform.workflow_stages(&config.rpt_workflow_id)?;
    let stage_dirs = platform.create_stage_output_folders(&stages, &output_dir)?;

    let vcfs = platform.find_files(&project.name, &request.input_dir, VCF_PATTERN)?;
    let sample_names = sample_names_from_vcfs(&vcfs);
    tracing::info!(
        "found {} VCFs for {} samples in {}",
        vcfs.len(),
        sample_names.len(),
        request.input_dir
    );

    let matched = match_samples(&mut manifest, &sample_names);
    let indications = resolve_indications(&manifest, &matched, &index);
    tracing::info!(
        "resolved clinical indications for {} samples ({} codes unresolved)",
        indications.len(),
        indications.iter().map(|(_, r)| r.unresolved_count()).sum::<usize>()
    );
    if indications.is_empty() {
        tracing::warn!("no sample in {} has clinical indications to report on", request.input_dir);
    }

    let inputs = platform.gather_stage_input_files(
        &project.name,
        &request.input_dir,
        &matched,
        &config.rpt_stage_input_dict,
    )?;
    let staged = prepare_stage_rows(&inputs, &matched, &config.rpt_dynamic_files);
    let rows = build_rows(&staged, &indications, config);
    tracing::info!(
        "{} starting, {} missing from manifest, {} held for symbols",
        rows.jobs.starting.len(),
        rows.jobs.missing_from_manifest.len(),
        rows.jobs.symbols.len()
    );

    let report_file = write_job_report(&request.work_dir, &output_dir, &matched, &rows.jobs)?;
    let report_id = platform.upload_file(&report_file, &output_dir)?;
    tracing::info!(
        "created and uploaded job report {} ({})",
        report_file.display(),
        report_id
    );

    let batch_file = request
        .work_dir
        .join(format!("{}_batch.tsv", folder_basename(&output_dir)));
    BatchFile {
        tables: vec![rows.table],
    }
    .write(&batch_file)?;

    let check = assess_batch_file(&batch_file)?;
    match check {
        BatchCheck::Valid => {
            tracing::info!("format of the batch file is correct: {}", batch_file.display())
        }
        BatchCheck::Mismatch {
            line,
            expected,
            found,
        } => {
            tracing::warn!(
                "number of columns in header ({}) doesn't match number of columns in values ({}) at line {} of {}",
                expected,
                found,
                line,
                batch_file.display()
            );
            if request.strict_batch {
                return Err(ReportsError::Precondition(format!(
                    "malformed batch file {} at line {line}",
                    batch_file.display()
                )));
            }
        }
    }

    let submit = SubmitRequest::for_reports(config, &batch_file, &output_dir, &stages);
    let command = submit.command_line();

    if request.dry_run {
        tracing::info!("created workflow output folder: {}", output_dir);
        tracing::info!(
            "created stage output folders: {}",
            serde_json::to_string_pretty(&stage_dirs)?
        );
        tracing::info!("inputs gathered: {}", serde_json::to_string_pretty(&inputs)?);
        tracing::info!("final command: {}", command);
        tracing::info!("deleting {} as part of the dry run", output_dir);
        platform.remove_folder(&output_dir)?;
    } else {
        tracing::info!("submitting: {}", command);
        platform.submit_batch_job(&submit)?;
    }

    Ok(ReportsOutcome {
        output_dir,
        batch_file,
        report_file,
        matched,
        jobs: rows.jobs,
        check,
        command,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
