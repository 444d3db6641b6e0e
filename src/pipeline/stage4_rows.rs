use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::AssayConfig;
use crate::pipeline::stage3_resolve::{IndicationRecord, SampleIndications};
use crate::pipeline::stage5_batch::BatchTable;
use crate::platform::{FileDescriptor, StageInputFiles};

pub const BATCH_ID_COLUMN: &str = "batch ID";

/// Samples grouped by what happens to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobBuckets {
    pub starting: Vec<String>,
    pub missing_from_manifest: Vec<String>,
    /// Sample and its joined clinical indications, held for manual review.
    pub symbols: Vec<(String, String)>,
    /// Sample and the comma-joined codes that resolved to nothing. A sample
    /// here also appears in one of the other buckets.
    pub unresolved: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Starting { indications: String, panels: String },
    MissingFromManifest,
    /// Every requested code failed to resolve, so there is nothing to report on.
    NoPanels,
    Symbols { indications: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOutcome {
    pub table: BatchTable,
    pub jobs: JobBuckets,
}

/// Builds the header and one row per sample from the gathered stage inputs.
///
/// Stage inputs come in key order, dynamic inputs after them with the same
/// value on every row.
pub fn prepare_stage_rows(
    inputs: &StageInputFiles,
    samples: &[String],
    dynamic_inputs: &BTreeMap<String, String>,
) -> BatchTable {
    let stage_inputs: Vec<&String> = {
        let mut names: Vec<&String> = inputs.values().flat_map(|m| m.keys()).collect();
        names.sort();
        names.dedup();
        names
    };

    let mut header = Vec::with_capacity(1 + stage_inputs.len() + dynamic_inputs.len());
    header.push(BATCH_ID_COLUMN.to_string());
    header.extend(stage_inputs.iter().map(|s| s.to_string()));
    header.extend(dynamic_inputs.keys().cloned());

    let mut rows = Vec::with_capacity(samples.len());
    for sample in samples {
        let Some(per_input) = inputs.get(sample) else {
            tracing::warn!("no stage inputs gathered for {}", sample);
            continue;
        };
        let mut row = Vec::with_capacity(header.len());
        row.push(sample.clone());
        for input in &stage_inputs {
            row.push(
                per_input
                    .get(*input)
                    .map(|files| file_cell(files))
                    .unwrap_or_default(),
            );
        }
        row.extend(dynamic_inputs.values().cloned());
        rows.push(row);
    }

    BatchTable { header, rows }
}

/// A single file is written as its id, several as a JSON array of ids.
fn file_cell(files: &[FileDescriptor]) -> String {
    match files {
        [] => String::new(),
        [file] => file.id.clone(),
        many => {
            let ids: Vec<String> = many.iter().map(|f| f.id.clone()).collect();
            serde_json::Value::from(ids).to_string()
        }
    }
}

pub fn extend_header(header: &[String], config: &AssayConfig) -> Vec<String> {
    let mut out = header.to_vec();
    out.extend([
        format!("{}.clinical_indication", config.generate_workbook_stage_id),
        format!("{}.panel", config.generate_bed_vep_stage_id),
        format!("{}.panel", config.generate_bed_athena_stage_id),
        format!("{}.panel", config.generate_workbook_stage_id),
    ]);
    out
}

pub fn classify(record: Option<&IndicationRecord>) -> Disposition {
    let Some(record) = record else {
        return Disposition::MissingFromManifest;
    };
    if record.has_unconfirmed_single_genes() {
        return Disposition::Symbols {
            indications: record.joined_indications(),
        };
    }
    if !record.has_panels() {
        return Disposition::NoPanels;
    }
    Disposition::Starting {
        indications: record.joined_indications(),
        panels: record.joined_panels(),
    }
}

/// Folds the staged rows into batch rows and job buckets.
pub fn build_rows(
    staged: &BatchTable,
    indications: &SampleIndications,
    config: &AssayConfig,
) -> RowOutcome {
    let initial = RowOutcome {
        table: BatchTable {
            header: extend_header(&staged.header, config),
            rows: Vec::new(),
        },
        jobs: JobBuckets::default(),
    };

    staged.rows.iter().fold(initial, |mut acc, row| {
        let Some(sample) = row.first() else {
            return acc;
        };
        let record = indications.get(sample);
        if let Some(record) = record
            && record.unresolved_count() > 0
        {
            acc.jobs
                .unresolved
                .push((sample.clone(), record.unresolved.join(",")));
        }
        match classify(record) {
            Disposition::Starting {
                indications: cis,
                panels,
            } => {
                let mut line = row.clone();
                line.extend([cis.clone(), cis.clone(), cis, panels]);
                acc.table.rows.push(line);
                acc.jobs.starting.push(sample.clone());
            }
            Disposition::MissingFromManifest => {
                acc.jobs.missing_from_manifest.push(sample.clone());
            }
            Disposition::NoPanels => {
                tracing::warn!(
                    "{}: no clinical indication resolved to a panel; not starting",
                    sample
                );
                acc.jobs.missing_from_manifest.push(sample.clone());
            }
            Disposition::Symbols { indications: cis } => {
                tracing::warn!(
                    "{}: single genes not given as HGNC ids ({}); held for review",
                    sample,
                    cis
                );
                acc.jobs.symbols.push((sample.clone(), cis));
            }
        }
        acc
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_rows.rs"]
mod tests;
