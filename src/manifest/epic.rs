use std::path::Path;

use crate::error::{ReportsError, Result};
use crate::manifest::{Manifest, ManifestKind, split_fields};

pub const INSTRUMENT_ID: &str = "Instrument ID";
pub const SPECIMEN_ID: &str = "Specimen ID";
pub const REANALYSIS_INSTRUMENT_ID: &str = "Re-analysis Instrument ID";
pub const REANALYSIS_SPECIMEN_ID: &str = "Re-analysis Specimen ID";
pub const TEST_CODES: &str = "Test Codes";

const DELIMITER: char = ';';
const SPECIMEN_PREFIX: &str = "SP-";

struct Columns {
    instrument: usize,
    specimen: usize,
    reanalysis_instrument: Option<usize>,
    reanalysis_specimen: Option<usize>,
    test_codes: usize,
    width: usize,
}

impl Columns {
    fn from_header(fields: &[&str]) -> Option<Self> {
        let find = |name: &str| fields.iter().position(|f| *f == name);
        Some(Self {
            instrument: find(INSTRUMENT_ID)?,
            specimen: find(SPECIMEN_ID)?,
            reanalysis_instrument: find(REANALYSIS_INSTRUMENT_ID),
            reanalysis_specimen: find(REANALYSIS_SPECIMEN_ID),
            test_codes: find(TEST_CODES)?,
            width: fields.len(),
        })
    }
}

/// Parses a `;`-separated Epic export. Lines before the header row are
/// batch preamble and ignored.
pub fn parse_lines(lines: &[String], source: &Path) -> Result<Manifest> {
    let format_error = |line: usize, msg: String| ReportsError::ManifestFormat {
        path: source.to_path_buf(),
        line,
        msg,
    };

    let (header_idx, columns) = lines
        .iter()
        .enumerate()
        .find_map(|(idx, line)| {
            Columns::from_header(&split_fields(line, DELIMITER)).map(|c| (idx, c))
        })
        .ok_or_else(|| {
            format_error(
                1,
                format!("no header row with {INSTRUMENT_ID}, {SPECIMEN_ID} and {TEST_CODES}"),
            )
        })?;

    let mut manifest = Manifest::new(ManifestKind::Epic);
    for (idx, line) in lines.iter().enumerate().skip(header_idx + 1) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line, DELIMITER);
        if fields.len() < columns.width {
            return Err(format_error(
                line_no,
                format!(
                    "expected {} columns, found {}",
                    columns.width,
                    fields.len()
                ),
            ));
        }

        let instrument = pick(&fields, columns.reanalysis_instrument, columns.instrument);
        let specimen = pick(&fields, columns.reanalysis_specimen, columns.specimen);
        let specimen = specimen.strip_prefix(SPECIMEN_PREFIX).unwrap_or(specimen);
        if instrument.is_empty() || specimen.is_empty() {
            return Err(format_error(
                line_no,
                format!("empty {INSTRUMENT_ID} or {SPECIMEN_ID}"),
            ));
        }

        let codes = fields[columns.test_codes]
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty());
        manifest.push_codes(&format!("{instrument}-{specimen}"), codes);
    }

    Ok(manifest)
}

/// Re-analysis identifiers take precedence when present.
fn pick<'a>(fields: &[&'a str], reanalysis: Option<usize>, primary: usize) -> &'a str {
    reanalysis
        .map(|idx| fields[idx])
        .filter(|value| !value.is_empty())
        .unwrap_or(fields[primary])
}
