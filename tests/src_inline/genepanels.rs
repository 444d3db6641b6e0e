use std::io::Cursor;

use super::*;

const GENEPANELS: &str = "\
R123_disease\tPanelA_1.0\tHGNC:1100
R123_disease\tPanelA_1.0\tHGNC:1101
R123_disease\tPanelB_2.1\tHGNC:1101
R134.1_Familial hypercholesterolaemia_G\tFH_3.0\tHGNC:6547

R149.1_Severe early-onset obesity_P\tObesity_4.0\tHGNC:8737
";

fn index() -> GenepanelsIndex {
    GenepanelsIndex::parse(Cursor::new(GENEPANELS)).unwrap()
}

#[test]
fn test_rows_grouped_by_indication() {
    let index = index();
    assert_eq!(index.len(), 3);
    let panels: Vec<&str> = index
        .panels("R123_disease")
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(panels, vec!["PanelA_1.0", "PanelB_2.1"]);
}

#[test]
fn test_header_row_skipped() {
    let text = "clinical_indication\tpanel\tgene\nR1_x\tP1\tHGNC:1\n";
    let index = GenepanelsIndex::parse(Cursor::new(text)).unwrap();
    assert_eq!(index.indications().collect::<Vec<_>>(), vec!["R1_x"]);
}

#[test]
fn test_short_row_reports_line() {
    let text = "R1_x\tP1\tHGNC:1\nR2_y\n";
    let err = GenepanelsIndex::parse(Cursor::new(text)).unwrap_err();
    match err {
        ReportsError::GenepanelsFormat { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_exact_prefix_rule() {
    let index = index();
    assert_eq!(
        index.resolve("R134.1", LookupRule::ExactPrefix),
        CodeLookup::Unique("R134.1_Familial hypercholesterolaemia_G".to_string())
    );
    assert_eq!(
        index.resolve("R134", LookupRule::ExactPrefix),
        CodeLookup::Missing
    );
    assert_eq!(index.resolve("R999", LookupRule::ExactPrefix), CodeLookup::Missing);
}

#[test]
fn test_starts_with_rule() {
    let index = index();
    assert_eq!(
        index.resolve("R134", LookupRule::StartsWith),
        CodeLookup::Unique("R134.1_Familial hypercholesterolaemia_G".to_string())
    );
    assert_eq!(
        index.resolve("R123_disease", LookupRule::StartsWith),
        CodeLookup::Unique("R123_disease".to_string())
    );
}

#[test]
fn test_ambiguous_prefix_lists_sorted_candidates() {
    let index = GenepanelsIndex::from_pairs([
        ("R14.2_b", "P2"),
        ("R14.1_a", "P1"),
        ("R15_c", "P3"),
    ]);
    assert_eq!(
        index.resolve("R14", LookupRule::StartsWith),
        CodeLookup::Ambiguous(vec!["R14.1_a".to_string(), "R14.2_b".to_string()])
    );
}

#[test]
fn test_empty_code_never_matches() {
    assert_eq!(index().resolve("", LookupRule::StartsWith), CodeLookup::Missing);
}
