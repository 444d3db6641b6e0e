use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

const COLUMN_SEPARATOR: char = '\t';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One or more header/row groups written back to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFile {
    pub tables: Vec<BatchTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchCheck {
    Valid,
    /// `line` is the 1-indexed line of the first row whose column count
    /// differs from the header's.
    Mismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl BatchFile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            push_line(&mut out, &table.header);
            for row in &table.rows {
                push_line(&mut out, row);
            }
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(path)?);
        w.write_all(self.render().as_bytes())?;
        w.flush()?;
        Ok(())
    }
}

fn push_line(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(COLUMN_SEPARATOR);
        }
        out.push_str(field);
    }
    out.push('\n');
}

pub fn assess(text: &str) -> BatchCheck {
    let mut lines = text.lines();
    let Some(header) = lines.next() else {
        return BatchCheck::Valid;
    };
    let expected = header.split(COLUMN_SEPARATOR).count();
    for (idx, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let found = line.split(COLUMN_SEPARATOR).count();
        if found != expected {
            return BatchCheck::Mismatch {
                line: idx + 2,
                expected,
                found,
            };
        }
    }
    BatchCheck::Valid
}

pub fn assess_batch_file(path: &Path) -> Result<BatchCheck> {
    let text = fs::read_to_string(path)?;
    Ok(assess(&text))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_batch.rs"]
mod tests;
