use std::collections::BTreeSet;

use crate::platform::FileDescriptor;

/// Matches both normal and genomic single-sample VCFs.
pub const VCF_PATTERN: &str = r"(.*)\.vcf\.gz$";

/// Sample names are everything before the first `_` of a VCF name, in
/// discovery order with repeats removed.
pub fn sample_names_from_vcfs(files: &[FileDescriptor]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for file in files {
        let name = file.name.split('_').next().unwrap_or_default();
        if name.is_empty() {
            tracing::warn!("skipping VCF without sample name: {}", file.name);
            continue;
        }
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    names
}
