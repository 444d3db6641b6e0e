use std::collections::BTreeMap;
use std::path::PathBuf;

use super::*;
use crate::fixtures::{assay_config, strings};

fn config() -> AssayConfig {
    assay_config(PathBuf::from("genepanels.tsv"))
}

fn record(cis: &[&str], panels: &[&str]) -> IndicationRecord {
    IndicationRecord {
        clinical_indications: cis.iter().map(|s| Some(s.to_string())).collect(),
        panels: strings(panels),
        unresolved: vec![],
    }
}

fn staged(samples: &[&str]) -> BatchTable {
    BatchTable {
        header: strings(&["batch ID", "stage-rpt_vep.vcf"]),
        rows: samples
            .iter()
            .map(|s| vec![s.to_string(), format!("file-{s}")])
            .collect(),
    }
}

fn file(id: &str) -> FileDescriptor {
    FileDescriptor {
        id: id.to_string(),
        name: format!("{id}.vcf.gz"),
        folder: "/output/CEN-1/sentieon-dnaseq".to_string(),
    }
}

#[test]
fn test_prepare_stage_rows_columns() {
    let mut inputs = StageInputFiles::new();
    let mut s1 = BTreeMap::new();
    s1.insert("stage-rpt_vep.vcf".to_string(), vec![file("file-1")]);
    s1.insert(
        "stage-rpt_athena.mosdepth_files".to_string(),
        vec![file("file-2"), file("file-3")],
    );
    inputs.insert("S1".to_string(), s1);
    let mut s2 = BTreeMap::new();
    s2.insert("stage-rpt_vep.vcf".to_string(), vec![]);
    s2.insert("stage-rpt_athena.mosdepth_files".to_string(), vec![file("file-4")]);
    inputs.insert("S2".to_string(), s2);

    let mut dynamic = BTreeMap::new();
    dynamic.insert("stage-rpt_vep.config_file".to_string(), "file-cfg".to_string());

    let table = prepare_stage_rows(&inputs, &strings(&["S2", "S1", "S3"]), &dynamic);
    assert_eq!(
        table.header,
        vec![
            "batch ID",
            "stage-rpt_athena.mosdepth_files",
            "stage-rpt_vep.vcf",
            "stage-rpt_vep.config_file",
        ]
    );
    assert_eq!(
        table.rows,
        vec![
            strings(&["S2", "file-4", "", "file-cfg"]),
            strings(&["S1", r#"["file-2","file-3"]"#, "file-1", "file-cfg"]),
        ]
    );
}

#[test]
fn test_extend_header_appends_panel_columns() {
    let header = extend_header(&strings(&["batch ID"]), &config());
    assert_eq!(
        header,
        vec![
            "batch ID",
            "stage-rpt_generate_workbook.clinical_indication",
            "stage-rpt_generate_bed_vep.panel",
            "stage-rpt_generate_bed_athena.panel",
            "stage-rpt_generate_workbook.panel",
        ]
    );
}

#[test]
fn test_starting_row_extended() {
    let mut indications = SampleIndications::default();
    indications.insert("S1".to_string(), record(&["R123_disease"], &["PanelA", "PanelB"]));

    let outcome = build_rows(&staged(&["S1"]), &indications, &config());
    assert_eq!(outcome.jobs.starting, strings(&["S1"]));
    assert_eq!(
        outcome.table.rows,
        vec![strings(&[
            "S1",
            "file-S1",
            "R123_disease",
            "R123_disease",
            "R123_disease",
            "PanelA;PanelB",
        ])]
    );
    for row in &outcome.table.rows {
        assert_eq!(row.len(), outcome.table.header.len());
    }
}

#[test]
fn test_hgnc_only_sample_starts() {
    let mut indications = SampleIndications::default();
    indications.insert("S1".to_string(), record(&["_HGNC:5"], &["_HGNC:5"]));
    let outcome = build_rows(&staged(&["S1"]), &indications, &config());
    assert_eq!(outcome.jobs.starting, strings(&["S1"]));
    assert_eq!(outcome.table.rows[0][5], "_HGNC:5");
}

#[test]
fn test_symbol_sample_held_back() {
    let mut indications = SampleIndications::default();
    indications.insert(
        "S1".to_string(),
        record(&["R123_disease", "_BRCA1"], &["PanelA", "_BRCA1"]),
    );
    indications.insert(
        "S2".to_string(),
        record(&["_HGNC:5", "_TP53"], &["_HGNC:5", "_TP53"]),
    );
    let outcome = build_rows(&staged(&["S1", "S2"]), &indications, &config());
    assert!(outcome.jobs.starting.is_empty());
    assert!(outcome.table.rows.is_empty());
    assert_eq!(
        outcome.jobs.symbols,
        vec![
            ("S1".to_string(), "R123_disease;_BRCA1".to_string()),
            ("S2".to_string(), "_HGNC:5;_TP53".to_string()),
        ]
    );
}

#[test]
fn test_unknown_sample_missing_from_manifest() {
    let indications = SampleIndications::default();
    let outcome = build_rows(&staged(&["S9"]), &indications, &config());
    assert_eq!(outcome.jobs.missing_from_manifest, strings(&["S9"]));
    assert!(outcome.table.rows.is_empty());
}

#[test]
fn test_sample_without_panels_not_started() {
    let mut indications = SampleIndications::default();
    indications.insert(
        "S1".to_string(),
        IndicationRecord {
            clinical_indications: vec![None],
            panels: vec![],
            unresolved: strings(&["R999"]),
        },
    );
    let outcome = build_rows(&staged(&["S1"]), &indications, &config());
    assert_eq!(classify(indications.get("S1")), Disposition::NoPanels);
    assert_eq!(outcome.jobs.missing_from_manifest, strings(&["S1"]));
    assert!(outcome.jobs.starting.is_empty());
    assert_eq!(outcome.jobs.unresolved, vec![("S1".to_string(), "R999".to_string())]);
}

#[test]
fn test_partly_unresolved_sample_starts_and_is_reported() {
    let mut indications = SampleIndications::default();
    indications.insert(
        "S1".to_string(),
        IndicationRecord {
            clinical_indications: vec![None, Some("R123_disease".to_string()), None],
            panels: strings(&["PanelA"]),
            unresolved: strings(&["R999", "R998"]),
        },
    );
    indications.insert("S2".to_string(), record(&["R1_x"], &["P1"]));
    let outcome = build_rows(&staged(&["S1", "S2"]), &indications, &config());
    assert_eq!(outcome.jobs.starting, strings(&["S1", "S2"]));
    assert_eq!(
        outcome.jobs.unresolved,
        vec![("S1".to_string(), "R999,R998".to_string())]
    );
}

#[test]
fn test_buckets_are_disjoint_and_complete() {
    let mut indications = SampleIndications::default();
    indications.insert("A".to_string(), record(&["R1_x"], &["P1"]));
    indications.insert("B".to_string(), record(&["_SYM"], &["_SYM"]));
    let outcome = build_rows(&staged(&["A", "B", "C"]), &indications, &config());

    let jobs = &outcome.jobs;
    assert_eq!(jobs.starting, strings(&["A"]));
    assert_eq!(jobs.symbols.len(), 1);
    assert_eq!(jobs.missing_from_manifest, strings(&["C"]));
    assert_eq!(
        jobs.starting.len() + jobs.symbols.len() + jobs.missing_from_manifest.len(),
        3
    );
}

#[test]
fn test_build_rows_repeatable() {
    let mut indications = SampleIndications::default();
    indications.insert("A".to_string(), record(&["R1_x"], &["P1", "P2"]));
    let table = staged(&["A", "B"]);
    assert_eq!(
        build_rows(&table, &indications, &config()),
        build_rows(&table, &indications, &config())
    );
}
