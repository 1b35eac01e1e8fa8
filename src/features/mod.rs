//! Feature extraction
//!
//! Pure, deterministic mappings from raw URL/text input to named numeric
//! features. The only networked step is the best-effort WHOIS lookup in
//! [`whois`], which degrades to default values on any failure.

pub mod text;
pub mod url;
pub mod whois;

/// Special characters counted by both the URL and text extractors.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()+=[]{}|;:,.<>?";

/// Insertion-ordered set of named features.
///
/// Extractors build one of these per request; the predictor aligns it to a
/// model's `feature_names` list to obtain the fixed-order vector the
/// classifier was trained on. Inserting a name that already exists replaces
/// its value in place. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    entries: Vec<(String, f64)>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Fold `other` in, keeping insertion order. Names present on both sides
    /// take the incoming value, so later extractors win a collision.
    pub fn merge(&mut self, other: FeatureSet) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project onto the ordered `names` a model expects.
    ///
    /// Features the model was not trained on are dropped; names the
    /// extractor did not produce become 0.0 (matching how the training
    /// pipeline fills absent columns).
    pub fn aligned(&self, names: &[String]) -> Vec<f64> {
        names.iter().map(|n| self.get(n).unwrap_or(0.0)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}
