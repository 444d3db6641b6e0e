use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;

use crate::error::{ReportsError, Result};
use crate::input::open_maybe_gz;

/// How a manifest code is compared against genepanels indication keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupRule {
    /// The key segment before the first `_` equals the code.
    ExactPrefix,
    /// The key starts with the code.
    StartsWith,
}

impl LookupRule {
    pub fn matches(self, key: &str, code: &str) -> bool {
        match self {
            LookupRule::ExactPrefix => key.split('_').next() == Some(code),
            LookupRule::StartsWith => key.starts_with(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLookup {
    Unique(String),
    /// Candidates in key order; the first one is used.
    Ambiguous(Vec<String>),
    Missing,
}

/// Clinical indication -> panel names, grouped from the genepanels table.
#[derive(Debug, Clone, Default)]
pub struct GenepanelsIndex {
    panels_by_indication: BTreeMap<String, BTreeSet<String>>,
}

impl GenepanelsIndex {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_maybe_gz(path)?;
        let index = Self::parse(reader)?;
        if index.is_empty() {
            tracing::warn!("genepanels {} has no rows", path.display());
        }
        tracing::info!(
            "loaded genepanels {}: {} clinical indications",
            path.display(),
            index.len()
        );
        Ok(index)
    }

    pub fn parse<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut panels_by_indication: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut buf = String::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = reader.read_line(&mut buf)?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let line = buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if line_no == 1 && fields[0].eq_ignore_ascii_case("clinical_indication") {
                continue;
            }
            if fields.len() < 2 {
                return Err(ReportsError::GenepanelsFormat {
                    line: line_no,
                    msg: format!("expected at least 2 columns, found {}", fields.len()),
                });
            }
            let (indication, panel) = (fields[0], fields[1]);
            if indication.is_empty() || panel.is_empty() {
                return Err(ReportsError::GenepanelsFormat {
                    line: line_no,
                    msg: "empty clinical indication or panel".to_string(),
                });
            }
            panels_by_indication
                .entry(indication.to_string())
                .or_default()
                .insert(panel.to_string());
        }

        Ok(Self {
            panels_by_indication,
        })
    }

    #[cfg(test)]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut panels_by_indication: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (indication, panel) in pairs {
            panels_by_indication
                .entry(indication.to_string())
                .or_default()
                .insert(panel.to_string());
        }
        Self {
            panels_by_indication,
        }
    }

    /// Finds the indication key a manifest code refers to.
    pub fn resolve(&self, code: &str, rule: LookupRule) -> CodeLookup {
        if code.is_empty() {
            return CodeLookup::Missing;
        }
        let mut candidates: Vec<String> = self
            .panels_by_indication
            .keys()
            .filter(|key| rule.matches(key, code))
            .cloned()
            .collect();
        match candidates.len() {
            0 => CodeLookup::Missing,
            1 => CodeLookup::Unique(candidates.remove(0)),
            _ => CodeLookup::Ambiguous(candidates),
        }
    }

    pub fn panels(&self, indication: &str) -> Option<&BTreeSet<String>> {
        self.panels_by_indication.get(indication)
    }

    #[cfg(test)]
    pub fn indications(&self) -> impl Iterator<Item = &str> {
        self.panels_by_indication.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.panels_by_indication.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels_by_indication.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/genepanels.rs"]
mod tests;
