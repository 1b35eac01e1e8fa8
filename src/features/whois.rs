//! Best-effort WHOIS features
//!
//! A single raw port-43 query with a bounded timeout. Any failure (disabled,
//! unreachable server, timeout, unparsable reply) yields the zero defaults;
//! registration data is a signal booster, never a dependency.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::FeatureSet;

/// WHOIS-derived features for a domain. Defaults to all zeros.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WhoisFeatures {
    pub domain_age_days: f64,
    pub has_registrar: f64,
    pub has_country: f64,
}

impl WhoisFeatures {
    pub fn write_into(&self, features: &mut FeatureSet) {
        features.insert("domain_age_days", self.domain_age_days);
        features.insert("has_registrar", self.has_registrar);
        features.insert("has_country", self.has_country);
    }
}

/// WHOIS lookup settings, sourced from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct WhoisConfig {
    pub enabled: bool,
    pub server: String,
    pub timeout: Duration,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server: "whois.iana.org".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Look up `domain` against the configured server.
///
/// Never errors: degraded data comes back as the zero defaults.
pub async fn lookup(domain: &str, config: &WhoisConfig) -> WhoisFeatures {
    if !config.enabled || domain.is_empty() {
        return WhoisFeatures::default();
    }

    let domain = domain.strip_prefix("www.").unwrap_or(domain);

    match tokio::time::timeout(config.timeout, query(domain, &config.server)).await {
        Ok(Ok(response)) => parse_response(&response),
        Ok(Err(e)) => {
            tracing::debug!("WHOIS query for {} failed: {}", domain, e);
            WhoisFeatures::default()
        }
        Err(_) => {
            tracing::debug!("WHOIS query for {} timed out", domain);
            WhoisFeatures::default()
        }
    }
}

async fn query(domain: &str, server: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect((server, 43)).await?;
    stream.write_all(domain.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

fn parse_response(response: &str) -> WhoisFeatures {
    let mut features = WhoisFeatures::default();

    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.as_str() {
            "creation date" | "created" | "registered" | "registration time" => {
                if features.domain_age_days == 0.0 {
                    if let Some(date) = parse_date(value) {
                        let age = (Utc::now().date_naive() - date).num_days();
                        features.domain_age_days = age.max(0) as f64;
                    }
                }
            }
            "registrar" => features.has_registrar = 1.0,
            "country" | "registrant country" => features.has_country = 1.0,
            _ => {}
        }
    }

    features
}

/// Registries disagree on date formats; try the common ones.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let candidate = value.split_whitespace().next()?;

    if let Ok(dt) = NaiveDateTime::parse_from_str(candidate, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Some(dt.date());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(candidate) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_registry_fields() {
        let response = "\
Domain Name: EXAMPLE.COM
Registrar: Example Registrar LLC
Creation Date: 2010-06-01T00:00:00Z
Country: US
";
        let f = parse_response(response);
        assert_eq!(f.has_registrar, 1.0);
        assert_eq!(f.has_country, 1.0);
        assert!(f.domain_age_days > 365.0);
    }

    #[test]
    fn garbage_response_yields_defaults() {
        let f = parse_response("no such domain\n% quota exceeded");
        assert_eq!(f.domain_age_days, 0.0);
        assert_eq!(f.has_registrar, 0.0);
        assert_eq!(f.has_country, 0.0);
    }

    #[tokio::test]
    async fn disabled_lookup_returns_defaults() {
        let f = lookup("example.com", &WhoisConfig::default()).await;
        assert_eq!(f.has_registrar, 0.0);
    }

    #[test]
    fn date_formats() {
        assert!(parse_date("2020-01-15").is_some());
        assert!(parse_date("2020-01-15T10:30:00Z").is_some());
        assert!(parse_date("15-Jan-2020").is_some());
        assert!(parse_date("gibberish").is_none());
    }
}
