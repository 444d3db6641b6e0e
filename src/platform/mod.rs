//! Narrow interface to the execution platform.
//!
//! Everything the launcher needs from DNAnexus goes through [`Platform`]; the
//! resolution and batch logic never talks to the platform directly.
//! [`dx::DxCli`] is the production implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::config::{AssayConfig, StageInputSpec};
use crate::error::Result;

pub mod dx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageInfo {
    pub stage_id: String,
    pub executable: String,
    pub name: String,
}

impl StageInfo {
    /// Output folder of the stage, relative to the workflow output folder.
    pub fn folder_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
    pub folder: String,
}

/// sample -> stage input -> files found for it.
pub type StageInputFiles = BTreeMap<String, BTreeMap<String, Vec<FileDescriptor>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub workflow_id: String,
    pub batch_file: PathBuf,
    pub destination: String,
    pub extra_inputs: Vec<(String, String)>,
    pub stage_folders: Vec<(String, String)>,
}

impl SubmitRequest {
    pub fn for_reports(
        config: &AssayConfig,
        batch_file: &Path,
        destination: &str,
        stages: &[StageInfo],
    ) -> Self {
        let mut extra_inputs = vec![(
            format!("{}.flank", config.generate_bed_vep_stage_id),
            config.vep_bed_flank.to_string(),
        )];
        if config.is_twe() {
            extra_inputs.push((
                format!("{}.buffer_size", config.vep_stage_id),
                "1000".to_string(),
            ));
        }
        Self {
            workflow_id: config.rpt_workflow_id.clone(),
            batch_file: batch_file.to_path_buf(),
            destination: destination.to_string(),
            extra_inputs,
            stage_folders: stages
                .iter()
                .map(|s| (s.stage_id.clone(), s.folder_name().to_string()))
                .collect(),
        }
    }

    /// Arguments following `dx`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-y".to_string(),
            "--rerun-stage".to_string(),
            "*".to_string(),
            self.workflow_id.clone(),
            format!("--batch-tsv={}", self.batch_file.display()),
        ];
        for (input, value) in &self.extra_inputs {
            args.push(format!("-i{input}={value}"));
        }
        args.push(format!("--destination={}", self.destination));
        for (stage_id, folder) in &self.stage_folders {
            args.push("--stage-relative-output-folder".to_string());
            args.push(stage_id.clone());
            args.push(folder.clone());
        }
        args
    }

    pub fn command_line(&self) -> String {
        let mut out = String::from("dx");
        for arg in self.args() {
            out.push(' ');
            out.push_str(&shell_quote(&arg));
        }
        out
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.,:/=@+".contains(c));
    if plain && !arg.is_empty() {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

pub trait Platform {
    fn project_context(&self) -> Result<ProjectContext>;

    /// Creates a fresh output folder for one workflow run under `parent_dir`.
    fn create_workflow_output_folder(
        &self,
        workflow_id: &str,
        assay_id: &str,
        parent_dir: &str,
    ) -> Result<String>;

    fn workflow_stages(&self, workflow_id: &str) -> Result<Vec<StageInfo>>;

    /// Returns stage id -> created folder.
    fn create_stage_output_folders(
        &self,
        stages: &[StageInfo],
        out_dir: &str,
    ) -> Result<BTreeMap<String, String>>;

    /// Files under `dir` (recursively) whose name matches the regex `pattern`.
    fn find_files(&self, project: &str, dir: &str, pattern: &str) -> Result<Vec<FileDescriptor>>;

    /// Uploads a local file into `folder`, returning the new file id.
    fn upload_file(&self, path: &Path, folder: &str) -> Result<String>;

    fn remove_folder(&self, folder: &str) -> Result<()>;

    fn submit_batch_job(&self, request: &SubmitRequest) -> Result<()>;

    fn gather_stage_input_files(
        &self,
        project: &str,
        dir: &str,
        samples: &[String],
        stage_inputs: &BTreeMap<String, StageInputSpec>,
    ) -> Result<StageInputFiles> {
        let mut out = StageInputFiles::new();
        for sample in samples {
            let mut per_input = BTreeMap::new();
            for (input, spec) in stage_inputs {
                let pattern = format!("^{}{}", regex::escape(sample), spec.pattern);
                Regex::new(&pattern)?;
                let search_dir = format!("{}/{}", dir.trim_end_matches('/'), spec.folder);
                let files = self.find_files(project, &search_dir, &pattern)?;
                if files.is_empty() {
                    tracing::warn!(
                        "no files for stage input {} of sample {} in {}",
                        input,
                        sample,
                        search_dir
                    );
                }
                per_input.insert(input.clone(), files);
            }
            out.insert(sample.clone(), per_input);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/platform/mod.rs"]
mod tests;

#[cfg(test)]
#[path = "../../tests/src_inline/platform/fake.rs"]
pub(crate) mod fake;
