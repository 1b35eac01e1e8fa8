//! Text (NLP) features
//!
//! Basic lexical statistics plus a TF-IDF projection against the trained
//! vectorizer's vocabulary. Tokenization is a lowercase alphanumeric split,
//! matching what the artifact export pipeline used.

use std::collections::HashMap;

use super::{FeatureSet, SPECIAL_CHARS};
use crate::ml::artifact::TfidfParams;

/// Keywords commonly found in phishing messages (urgency and lure words).
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "urgent", "immediate", "verify", "confirm", "account", "security",
    "suspended", "locked", "expired", "update", "click", "here",
    "phishing", "scam", "fraud", "fake", "suspicious",
];

/// English stop words for the stop-word ratio feature.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "did", "do", "does", "doing",
    "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i",
    "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my",
    "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "out", "over", "own", "same", "she", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "why", "will", "with", "you", "your",
];

/// Lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract the basic text feature set.
pub fn extract(text: &str) -> FeatureSet {
    let mut features = FeatureSet::new();
    let words = tokenize(text);

    features.insert("text_length", text.len() as f64);
    features.insert("word_count", words.len() as f64);

    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64
    };
    features.insert("avg_word_length", avg_word_length);

    let stop_word_count = words.iter().filter(|w| STOP_WORDS.contains(&w.as_str())).count();
    features.insert(
        "stop_word_ratio",
        if words.is_empty() {
            0.0
        } else {
            stop_word_count as f64 / words.len() as f64
        },
    );

    let special_char_count = text.chars().filter(|c| SPECIAL_CHARS.contains(*c)).count();
    features.insert(
        "special_char_ratio",
        if text.is_empty() {
            0.0
        } else {
            special_char_count as f64 / text.chars().count() as f64
        },
    );

    let text_lower = text.to_lowercase();
    features.insert(
        "suspicious_keywords",
        SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|k| text_lower.contains(*k))
            .count() as f64,
    );

    features
}

/// Project `text` onto the trained vocabulary as `tfidf_0..tfidf_{k-1}`.
///
/// Raw term counts weighted by the stored idf values, then l2-normalized,
/// the same scheme the vectorizer used at training time. Terms outside the
/// vocabulary are ignored; an empty document projects to all zeros.
pub fn tfidf_features(text: &str, params: &TfidfParams) -> FeatureSet {
    let k = params.idf.len();
    let mut weights = vec![0.0f64; k];

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let tokens = tokenize(text);
    for token in &tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }

    for (term, count) in counts {
        if let Some(&idx) = params.vocabulary.get(term) {
            if idx < k {
                weights[idx] = count as f64 * params.idf[idx];
            }
        }
    }

    let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in &mut weights {
            *w /= norm;
        }
    }

    let mut features = FeatureSet::new();
    for (i, w) in weights.iter().enumerate() {
        features.insert(format!("tfidf_{i}"), *w);
    }
    features
}
