use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ReportsError, Result};
use crate::platform::{FileDescriptor, Platform, ProjectContext, StageInfo, SubmitRequest};

const PROJECT_CONTEXT_VAR: &str = "DX_PROJECT_CONTEXT_ID";
const MAX_OUTPUT_FOLDERS: u32 = 100;

/// [`Platform`] backed by the `dx` command line client.
#[derive(Debug, Clone)]
pub struct DxCli {
    program: String,
}

#[derive(Debug, Deserialize)]
struct Described {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowDescription {
    stages: Vec<WorkflowStage>,
}

#[derive(Debug, Deserialize)]
struct WorkflowStage {
    id: String,
    executable: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FoundObject {
    id: String,
    describe: FoundDescribe,
}

#[derive(Debug, Deserialize)]
struct FoundDescribe {
    name: String,
    folder: String,
}

impl DxCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", self.program, args.join(" "));
        tracing::debug!("running {}", command);
        let output = Command::new(&self.program).args(args).output()?;
        if !output.status.success() {
            return Err(ReportsError::Platform {
                command,
                msg: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let stdout = self.run(args)?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn object_name(&self, id: &str) -> Result<String> {
        let described: Described = self.run_json(&["describe", id, "--json"])?;
        Ok(described.name)
    }

    fn folder_exists(&self, folder: &str) -> bool {
        self.run(&["ls", folder]).is_ok()
    }

    fn project_id(&self) -> Result<String> {
        if let Ok(id) = std::env::var(PROJECT_CONTEXT_VAR)
            && !id.is_empty()
        {
            return Ok(id);
        }
        let env = self.run(&["env", "--bash"])?;
        parse_project_context(&env).ok_or_else(|| ReportsError::Platform {
            command: format!("{} env --bash", self.program),
            msg: format!("{PROJECT_CONTEXT_VAR} not set"),
        })
    }
}

/// Reads the project id out of `dx env --bash` output.
pub fn parse_project_context(env: &str) -> Option<String> {
    env.lines().find_map(|line| {
        let line = line.trim().trim_start_matches("export ");
        let value = line.strip_prefix(PROJECT_CONTEXT_VAR)?.strip_prefix('=')?;
        let value = value.trim_matches(|c| c == '\'' || c == '"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

impl Platform for DxCli {
    fn project_context(&self) -> Result<ProjectContext> {
        let id = self.project_id()?;
        let name = self.object_name(&id)?;
        Ok(ProjectContext { id, name })
    }

    fn create_workflow_output_folder(
        &self,
        workflow_id: &str,
        assay_id: &str,
        parent_dir: &str,
    ) -> Result<String> {
        let workflow_name = self.object_name(workflow_id)?;
        let parent = parent_dir.trim_end_matches('/');
        for index in 1..=MAX_OUTPUT_FOLDERS {
            let folder = format!("{parent}/{workflow_name}-{assay_id}-{index}");
            if self.folder_exists(&folder) {
                continue;
            }
            self.run(&["mkdir", "-p", &folder])?;
            tracing::info!("created workflow output folder {}", folder);
            return Ok(folder);
        }
        Err(ReportsError::Platform {
            command: format!("{} mkdir", self.program),
            msg: format!("no free output folder name for {workflow_name} under {parent}"),
        })
    }

    fn workflow_stages(&self, workflow_id: &str) -> Result<Vec<StageInfo>> {
        let description: WorkflowDescription =
            self.run_json(&["describe", workflow_id, "--json"])?;
        let mut stages = Vec::with_capacity(description.stages.len());
        for stage in description.stages {
            let name = match stage.name {
                Some(name) if !name.is_empty() => name,
                _ => self.object_name(&stage.executable)?,
            };
            stages.push(StageInfo {
                stage_id: stage.id,
                executable: stage.executable,
                name,
            });
        }
        Ok(stages)
    }

    fn create_stage_output_folders(
        &self,
        stages: &[StageInfo],
        out_dir: &str,
    ) -> Result<BTreeMap<String, String>> {
        let mut dirs = BTreeMap::new();
        for stage in stages {
            let folder = format!("{}/{}", out_dir.trim_end_matches('/'), stage.folder_name());
            self.run(&["mkdir", "-p", &folder])?;
            dirs.insert(stage.stage_id.clone(), folder);
        }
        Ok(dirs)
    }

    fn find_files(&self, project: &str, dir: &str, pattern: &str) -> Result<Vec<FileDescriptor>> {
        let path = format!("{project}:{dir}");
        let found: Vec<FoundObject> = self.run_json(&[
            "find",
            "data",
            "--json",
            "--path",
            &path,
            "--name",
            pattern,
            "--name-mode",
            "regexp",
        ])?;
        Ok(found
            .into_iter()
            .map(|obj| FileDescriptor {
                id: obj.id,
                name: obj.describe.name,
                folder: obj.describe.folder,
            })
            .collect())
    }

    fn upload_file(&self, path: &Path, folder: &str) -> Result<String> {
        let local = path.display().to_string();
        let dest = format!("{}/", folder.trim_end_matches('/'));
        let id = self.run(&["upload", &local, "--path", &dest, "--brief"])?;
        Ok(id.trim().to_string())
    }

    fn remove_folder(&self, folder: &str) -> Result<()> {
        self.run(&["rm", "-r", folder])?;
        Ok(())
    }

    fn submit_batch_job(&self, request: &SubmitRequest) -> Result<()> {
        let args = request.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args)?;
        Ok(())
    }
}
