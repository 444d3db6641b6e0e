use crate::manifest::Manifest;

/// Attaches discovered samples to manifest entries.
///
/// A sample matches when its partial identifier is exactly a manifest key.
/// Returns the matched samples in discovery order. When two samples share a
/// partial identifier the last one seen owns the entry; earlier ones are still
/// returned so they are reported rather than silently dropped.
pub fn match_samples(manifest: &mut Manifest, sample_names: &[String]) -> Vec<String> {
    let kind = manifest.kind;
    let mut matched: Vec<String> = Vec::new();

    for sample in sample_names {
        if matched.contains(sample) {
            continue;
        }
        let Some(partial_id) = kind.partial_identifier(sample) else {
            tracing::debug!("sample {} has no {} identifier", sample, kind.label());
            continue;
        };
        let Some(entry) = manifest.entries.get_mut(&partial_id) else {
            continue;
        };
        if let Some(previous) = entry.sample.replace(sample.clone()) {
            tracing::warn!(
                "{} and {} both match manifest entry {}; using {}",
                previous,
                sample,
                partial_id,
                sample
            );
        }
        matched.push(sample.clone());
    }

    tracing::info!(
        "{} of {} samples found in the {} manifest",
        matched.len(),
        sample_names.len(),
        kind.label()
    );
    matched
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_match.rs"]
mod tests;
