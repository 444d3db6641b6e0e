use std::collections::BTreeMap;

use crate::genepanels::{CodeLookup, GenepanelsIndex, LookupRule};
use crate::manifest::Manifest;

/// Codes with this prefix request a single gene rather than a panel.
pub const SINGLE_GENE_PREFIX: &str = "_";
pub const HGNC_PREFIX: &str = "_HGNC";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicationRecord {
    /// One entry per requested code; `None` when the code did not resolve.
    pub clinical_indications: Vec<Option<String>>,
    pub panels: Vec<String>,
    /// Requested codes with no clinical indication in genepanels.
    pub unresolved: Vec<String>,
}

impl IndicationRecord {
    pub fn joined_indications(&self) -> String {
        self.clinical_indications
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn joined_panels(&self) -> String {
        self.panels.join(";")
    }

    pub fn has_panels(&self) -> bool {
        !self.panels.is_empty()
    }

    pub fn single_genes(&self) -> impl Iterator<Item = &str> {
        self.panels
            .iter()
            .map(String::as_str)
            .filter(|p| p.starts_with(SINGLE_GENE_PREFIX))
    }

    /// Single genes given as anything other than HGNC ids (usually symbols).
    pub fn has_unconfirmed_single_genes(&self) -> bool {
        self.single_genes().any(|gene| !gene.starts_with(HGNC_PREFIX))
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

/// Resolved records keyed by sample, remembering the order samples were
/// resolved in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleIndications {
    order: Vec<String>,
    records: BTreeMap<String, IndicationRecord>,
}

impl SampleIndications {
    pub fn insert(&mut self, sample: String, record: IndicationRecord) {
        if self.records.insert(sample.clone(), record).is_none() {
            self.order.push(sample);
        }
    }

    pub fn get(&self, sample: &str) -> Option<&IndicationRecord> {
        self.records.get(sample)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicationRecord)> {
        self.order
            .iter()
            .filter_map(|s| self.records.get(s).map(|r| (s.as_str(), r)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub fn resolve_indications(
    manifest: &Manifest,
    matched: &[String],
    index: &GenepanelsIndex,
) -> SampleIndications {
    let rule = manifest.kind.lookup_rule();
    let mut out = SampleIndications::default();
    for sample in matched {
        let Some(codes) = manifest.codes_for_sample(sample) else {
            continue;
        };
        out.insert(sample.clone(), resolve_codes(sample, codes, rule, index));
    }
    out
}

pub fn resolve_codes(
    sample: &str,
    codes: &[String],
    rule: LookupRule,
    index: &GenepanelsIndex,
) -> IndicationRecord {
    let mut record = IndicationRecord::default();

    for code in codes {
        if code.starts_with(SINGLE_GENE_PREFIX) {
            record.clinical_indications.push(Some(code.clone()));
            record.panels.push(code.clone());
            continue;
        }

        let key = match index.resolve(code, rule) {
            CodeLookup::Unique(key) => Some(key),
            CodeLookup::Ambiguous(keys) => {
                tracing::warn!(
                    "{}: code {} matches several clinical indications ({}); using {}",
                    sample,
                    code,
                    keys.join(", "),
                    keys[0]
                );
                keys.into_iter().next()
            }
            CodeLookup::Missing => {
                tracing::warn!("{}: code {} not found in genepanels", sample, code);
                record.unresolved.push(code.clone());
                None
            }
        };

        if let Some(panels) = key.as_deref().and_then(|k| index.panels(k)) {
            record.panels.extend(panels.iter().cloned());
        }
        record.clinical_indications.push(key);
    }

    record
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_resolve.rs"]
mod tests;
