//! Sample manifests booked through Epic or Gemini.
//!
//! Both formats collapse into a [`Manifest`]: a map from the partial sample
//! identifier the manifest knows about to the indication codes requested for
//! it. Full sample names only become known once VCFs are discovered, so each
//! entry carries an optional slot for the sample it was matched to.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::genepanels::LookupRule;
use crate::input::read_lines;

pub mod epic;
pub mod gemini;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `Instrument ID-Specimen ID` identifiers with R-codes.
    Epic,
    /// X-numbers with clinical indications.
    Gemini,
}

impl ManifestKind {
    /// The part of a full sample name the manifest is keyed by.
    pub fn partial_identifier(self, sample: &str) -> Option<String> {
        let mut tokens = sample.split('-');
        let first = tokens.next().filter(|t| !t.is_empty())?;
        match self {
            ManifestKind::Epic => {
                let second = tokens.next().filter(|t| !t.is_empty())?;
                Some(format!("{first}-{second}"))
            }
            ManifestKind::Gemini => Some(first.to_string()),
        }
    }

    pub fn lookup_rule(self) -> LookupRule {
        match self {
            ManifestKind::Epic => LookupRule::ExactPrefix,
            ManifestKind::Gemini => LookupRule::StartsWith,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ManifestKind::Epic => "Epic",
            ManifestKind::Gemini => "Gemini",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntry {
    pub codes: Vec<String>,
    pub sample: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub kind: ManifestKind,
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new(kind: ManifestKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn from_path(kind: ManifestKind, path: &Path) -> Result<Self> {
        let lines = read_lines(path)?;
        let manifest = match kind {
            ManifestKind::Epic => epic::parse_lines(&lines, path)?,
            ManifestKind::Gemini => gemini::parse_lines(&lines, path)?,
        };
        if manifest.is_empty() {
            tracing::warn!("{} manifest {} has no samples", kind.label(), path.display());
        }
        tracing::info!(
            "parsed {} manifest {}: {} entries",
            kind.label(),
            path.display(),
            manifest.len()
        );
        Ok(manifest)
    }

    pub fn push_codes<I, S>(&mut self, partial_id: &str, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .entry(partial_id.to_string())
            .or_default()
            .codes
            .extend(codes.into_iter().map(Into::into));
    }

    #[cfg(test)]
    pub fn get(&self, partial_id: &str) -> Option<&ManifestEntry> {
        self.entries.get(partial_id)
    }

    /// Codes requested for a full sample name, if the sample was matched to
    /// its manifest entry.
    pub fn codes_for_sample(&self, sample: &str) -> Option<&[String]> {
        let partial_id = self.kind.partial_identifier(sample)?;
        let entry = self.entries.get(&partial_id)?;
        (entry.sample.as_deref() == Some(sample)).then_some(entry.codes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits a delimited manifest line into trimmed fields.
pub(crate) fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).map(str::trim).collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/manifest/mod.rs"]
mod tests;
