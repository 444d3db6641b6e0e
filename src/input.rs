use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Result;

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads every line of a plain or gzipped text file, stripping line endings.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut lines = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        lines.push(buf.trim_end_matches(['\n', '\r']).to_string());
    }
    Ok(lines)
}
