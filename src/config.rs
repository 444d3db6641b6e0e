use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportsError, Result};

/// Where a reports stage input is found in the upstream output folder.
///
/// `folder` is the app output folder under the single-sample directory and
/// `pattern` a regex applied to file names after the sample name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInputSpec {
    pub folder: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssayConfig {
    pub assay_name: String,
    #[serde(default)]
    pub assay_version: Option<String>,
    pub rpt_workflow_id: String,
    pub genepanels_file: PathBuf,
    pub rpt_stage_input_dict: BTreeMap<String, StageInputSpec>,
    #[serde(default)]
    pub rpt_dynamic_files: BTreeMap<String, String>,
    pub generate_workbook_stage_id: String,
    pub generate_bed_vep_stage_id: String,
    pub generate_bed_athena_stage_id: String,
    pub vep_stage_id: String,
    pub vep_bed_flank: u32,
}

impl AssayConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AssayConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("rpt_workflow_id", &self.rpt_workflow_id),
            ("generate_workbook_stage_id", &self.generate_workbook_stage_id),
            ("generate_bed_vep_stage_id", &self.generate_bed_vep_stage_id),
            ("generate_bed_athena_stage_id", &self.generate_bed_athena_stage_id),
            ("vep_stage_id", &self.vep_stage_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ReportsError::Config(format!("{name} is empty")));
            }
        }
        if self.rpt_stage_input_dict.is_empty() {
            return Err(ReportsError::Config(
                "rpt_stage_input_dict has no stage inputs".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_twe(&self) -> bool {
        self.assay_name == "TWE"
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
