//! Lexical URL features
//!
//! Everything here is computed from the URL string alone. An unparsable URL
//! is not an error: the domain/path/query features degrade to zero and the
//! raw-string counts still fire, since a malformed URL is itself a phishing
//! signal.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{FeatureSet, SPECIAL_CHARS};

// ============================================================================
// FIXED TABLES
// ============================================================================

/// Keywords commonly found in phishing URLs (brand names and lure words).
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "secure", "account", "update", "verify", "confirm", "login",
    "bank", "paypal", "amazon", "apple", "microsoft", "google",
    "facebook", "twitter", "instagram", "linkedin", "netflix",
    "suspicious", "phishing", "scam", "fraud", "fake",
];

/// TLDs with disproportionate phishing registrations.
pub const SUSPICIOUS_TLDS: &[&str] = &[
    ".tk", ".ml", ".ga", ".cf", ".click", ".download", ".review",
];

/// Known URL-shortener hosts.
pub const SHORTENER_HOSTS: &[&str] = &[
    "bit.ly", "tinyurl", "goo.gl", "t.co", "ow.ly", "short.link",
];

static IPV4_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("valid regex"));

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract the full lexical feature set for a URL.
pub fn extract(url: &str) -> FeatureSet {
    let mut features = FeatureSet::new();

    basic_features(url, &mut features);

    match url::Url::parse(url) {
        Ok(parsed) => {
            domain_features(&parsed, &mut features);
            path_features(&parsed, &mut features);
            query_features(&parsed, &mut features);
        }
        Err(_) => {
            // Unparsable: zero out the structured features.
            for name in [
                "domain_length",
                "num_subdomains",
                "has_ip",
                "has_https",
                "tld_length",
                "suspicious_tld",
                "path_length",
                "num_directories",
                "has_file_extension",
                "suspicious_path_keywords",
                "query_length",
                "num_params",
                "suspicious_query_keywords",
            ] {
                features.insert(name, 0.0);
            }
        }
    }

    suspicious_features(url, &mut features);

    features
}

fn basic_features(url: &str, features: &mut FeatureSet) {
    features.insert("url_length", url.len() as f64);
    features.insert("num_dots", count_char(url, '.'));
    features.insert("num_hyphens", count_char(url, '-'));
    features.insert("num_underscores", count_char(url, '_'));
    features.insert("num_slashes", count_char(url, '/'));
    features.insert("num_digits", url.chars().filter(|c| c.is_ascii_digit()).count() as f64);
    features.insert(
        "num_special_chars",
        url.chars().filter(|c| SPECIAL_CHARS.contains(*c)).count() as f64,
    );
}

fn domain_features(parsed: &url::Url, features: &mut FeatureSet) {
    let domain = parsed.host_str().unwrap_or("").to_lowercase();

    features.insert("domain_length", domain.len() as f64);
    // Labels beyond registrable domain + TLD count as subdomains.
    features.insert(
        "num_subdomains",
        (domain.split('.').count() as i64 - 2).max(0) as f64,
    );
    features.insert("has_ip", bool_flag(IPV4_HOST.is_match(&domain)));
    features.insert("has_https", bool_flag(parsed.scheme() == "https"));

    let tld = domain.rsplit('.').next().filter(|_| domain.contains('.')).unwrap_or("");
    features.insert("tld_length", tld.len() as f64);
    features.insert(
        "suspicious_tld",
        bool_flag(SUSPICIOUS_TLDS.iter().any(|t| domain.ends_with(t))),
    );
}

fn path_features(parsed: &url::Url, features: &mut FeatureSet) {
    let path = parsed.path();

    features.insert("path_length", path.len() as f64);
    features.insert(
        "num_directories",
        path.split('/').filter(|s| !s.is_empty()).count() as f64,
    );
    let last_segment = path.rsplit('/').next().unwrap_or("");
    features.insert("has_file_extension", bool_flag(last_segment.contains('.')));
    features.insert(
        "suspicious_path_keywords",
        keyword_count(&path.to_lowercase(), SUSPICIOUS_KEYWORDS),
    );
}

fn query_features(parsed: &url::Url, features: &mut FeatureSet) {
    let query = parsed.query().unwrap_or("");

    features.insert("query_length", query.len() as f64);
    features.insert(
        "num_params",
        if query.is_empty() { 0.0 } else { query.split('&').count() as f64 },
    );
    features.insert(
        "suspicious_query_keywords",
        keyword_count(&query.to_lowercase(), SUSPICIOUS_KEYWORDS),
    );
}

fn suspicious_features(url: &str, features: &mut FeatureSet) {
    let url_lower = url.to_lowercase();

    features.insert(
        "suspicious_keywords",
        keyword_count(&url_lower, SUSPICIOUS_KEYWORDS),
    );
    features.insert(
        "is_shortened",
        bool_flag(SHORTENER_HOSTS.iter().any(|s| url_lower.contains(s))),
    );
    features.insert("has_repeated_chars", bool_flag(has_repeated_run(url, 3)));
    features.insert(
        "has_mixed_case",
        bool_flag(
            url.chars().any(|c| c.is_lowercase()) && url.chars().any(|c| c.is_uppercase()),
        ),
    );
}

// ============================================================================
// HELPERS
// ============================================================================

fn count_char(s: &str, c: char) -> f64 {
    s.chars().filter(|&x| x == c).count() as f64
}

fn bool_flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Presence count: how many keywords from the table appear at least once.
fn keyword_count(haystack: &str, keywords: &[&str]) -> f64 {
    keywords.iter().filter(|k| haystack.contains(*k)).count() as f64
}

/// True if any character repeats `run` or more times consecutively.
fn has_repeated_run(s: &str, run: usize) -> bool {
    let mut count = 0usize;
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if Some(c) == prev {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            prev = Some(c);
            count = 1;
        }
    }
    false
}
