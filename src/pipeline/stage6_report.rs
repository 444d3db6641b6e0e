use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::stage4_rows::JobBuckets;

pub fn render_job_report<W: Write>(
    w: &mut W,
    output_dir: &str,
    matched: &[String],
    jobs: &JobBuckets,
) -> std::io::Result<()> {
    writeln!(w, "Reports workflow output folder: {output_dir}")?;
    writeln!(w)?;

    write_section(
        w,
        "Samples with a VCF found in the manifest",
        matched.iter().map(String::as_str),
    )?;
    write_section(
        w,
        "Reports jobs expected to start",
        jobs.starting.iter().map(String::as_str),
    )?;
    write_section(
        w,
        "Samples missing from the manifest or without panels",
        jobs.missing_from_manifest.iter().map(String::as_str),
    )?;

    writeln!(
        w,
        "Unresolved clinical indication codes: {}",
        jobs.unresolved.len()
    )?;
    for (sample, codes) in &jobs.unresolved {
        writeln!(w, "{sample}\t{codes}")?;
    }
    writeln!(w)?;

    writeln!(
        w,
        "Samples booked with gene symbols, held for manual review: {}",
        jobs.symbols.len()
    )?;
    for (sample, indications) in &jobs.symbols {
        writeln!(w, "{sample}\t{indications}")?;
    }
    Ok(())
}

fn write_section<'a, W: Write>(
    w: &mut W,
    title: &str,
    samples: impl ExactSizeIterator<Item = &'a str>,
) -> std::io::Result<()> {
    writeln!(w, "{title}: {}", samples.len())?;
    for sample in samples {
        writeln!(w, "{sample}")?;
    }
    writeln!(w)
}

/// Writes the report next to the batch file, named after the output folder.
pub fn write_job_report(
    work_dir: &Path,
    output_dir: &str,
    matched: &[String],
    jobs: &JobBuckets,
) -> Result<PathBuf> {
    fs::create_dir_all(work_dir)?;
    let path = work_dir.join(format!("{}.job_report.txt", folder_basename(output_dir)));
    let mut w = BufWriter::new(File::create(&path)?);
    render_job_report(&mut w, output_dir, matched, jobs)?;
    w.flush()?;
    Ok(path)
}

pub fn folder_basename(folder: &str) -> &str {
    folder
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("reports")
}
