use std::collections::HashMap;

/// Marker suffix requesting an auto-incrementing index, e.g. `"unit[$]"`.
pub const TEMPLATE_SUFFIX: &str = "[$]";

/// Returns `true` if `label` requests auto-indexed resolution.
pub fn is_templated(label: &str) -> bool {
    label.ends_with(TEMPLATE_SUFFIX)
}

/// Allocates indices for templated labels within a single fragment.
///
/// Each template prefix carries its own counter, queried and incremented
/// atomically with respect to the single-writer build (no concurrent access
/// is supported or needed). Non-templated labels pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelAllocator {
    counters: HashMap<String, usize>,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `label` to a concrete label, consuming one index per call for
    /// templated inputs.
    pub fn resolve(&mut self, label: &str) -> String {
        match label.strip_suffix(TEMPLATE_SUFFIX) {
            Some(prefix) => {
                let index = self.counters.entry(prefix.to_string()).or_insert(0);
                let resolved = format!("{prefix}{index}");
                *index += 1;
                resolved
            }
            None => label.to_string(),
        }
    }
}
