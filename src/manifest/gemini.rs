use std::path::Path;

use crate::error::{ReportsError, Result};
use crate::manifest::{Manifest, ManifestKind, split_fields};

/// Parses a tab-separated `X-number <TAB> clinical indication` file.
pub fn parse_lines(lines: &[String], source: &Path) -> Result<Manifest> {
    let mut manifest = Manifest::new(ManifestKind::Gemini);
    let mut seen_content = false;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line, '\t');
        if !seen_content {
            seen_content = true;
            if is_header(fields[0]) {
                continue;
            }
        }
        if fields.len() < 2 || fields[0].is_empty() || fields[1].is_empty() {
            return Err(ReportsError::ManifestFormat {
                path: source.to_path_buf(),
                line: line_no,
                msg: "expected an X number and a clinical indication".to_string(),
            });
        }
        manifest.push_codes(fields[0], [fields[1]]);
    }

    Ok(manifest)
}

fn is_header(first: &str) -> bool {
    let lower = first.to_ascii_lowercase();
    lower.starts_with("sample") || lower.starts_with("x number")
}
