// Structural feature extraction for URL risk scoring
// Every signal is computed locally and deterministically; no network access

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::utils::domain_lists;
use crate::utils::typosquat;

// =============================================================================
// STATIC REGEX PATTERNS
// =============================================================================

lazy_static! {
    /// Loose dotted-quad pattern. Deliberately unanchored and without octet
    /// range checks: an IP-looking sequence anywhere in the hostname is
    /// signal enough, and IPv6 literals are out of scope.
    static ref IPV4_PATTERN: Regex =
        Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("Invalid IPv4 pattern regex");

    /// Percent-escape triplet, e.g. %2F or %3a
    static ref PERCENT_ESCAPE: Regex =
        Regex::new(r"%[0-9A-Fa-f]{2}").expect("Invalid percent-escape regex");
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Malformed URL: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("Missing host in URL")]
    MissingHost,
}

// =============================================================================
// FEATURE SET
// =============================================================================

/// Structural metrics of a single URL, immutable once computed.
///
/// Counts over the full URL are taken on the raw input string, not the
/// normalized form, so obfuscation tricks (userinfo `@`, percent escapes,
/// unicode lookalikes) stay visible to the scorer.
#[derive(Debug, Clone, Serialize)]
pub struct UrlFeatures {
    pub url_length: usize,
    pub domain_length: usize,
    pub path_length: usize,

    pub num_dots: usize,
    pub num_hyphens: usize,
    pub num_digits: usize,
    pub num_special_chars: usize,

    pub has_https: bool,
    pub has_ip_address: bool,
    pub has_suspicious_tld: bool,
    pub has_at_symbol: bool,
    pub has_double_slash: bool,

    pub suspicious_keyword_count: usize,
    pub typosquatting_score: u8,

    pub encoded_char_count: usize,
    pub has_unicode_chars: bool,

    pub num_subdomains: usize,
    pub has_long_subdomain: bool,

    pub is_free_hosting: bool,
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Extract all structural features from a raw URL string.
///
/// Dots are counted on the full URL; hyphens and digits on the hostname
/// only. Special characters are anything outside `[a-zA-Z0-9.-]` across the
/// full URL. Keyword hits count each contained keyword once, so overlapping
/// keywords ("account" inside "account-recovery") stack.
pub fn extract_features(raw_url: &str) -> Result<UrlFeatures, FeatureError> {
    let parsed = Url::parse(raw_url)?;
    let domain = parsed
        .host_str()
        .ok_or(FeatureError::MissingHost)?
        .to_lowercase();
    let path = parsed.path();

    let url_lower = raw_url.to_lowercase();
    let suspicious_keyword_count = domain_lists::SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|keyword| url_lower.contains(**keyword))
        .count();

    Ok(UrlFeatures {
        url_length: raw_url.len(),
        domain_length: domain.len(),
        path_length: path.len(),

        num_dots: raw_url.matches('.').count(),
        num_hyphens: domain.matches('-').count(),
        num_digits: domain.chars().filter(|c| c.is_ascii_digit()).count(),
        num_special_chars: raw_url
            .chars()
            .filter(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-')
            .count(),

        has_https: parsed.scheme() == "https",
        has_ip_address: IPV4_PATTERN.is_match(&domain),

        has_suspicious_tld: domain_lists::has_suspicious_tld(&domain),
        has_at_symbol: raw_url.contains('@'),
        // Scheme separators never reach here; only the path is inspected
        has_double_slash: path.contains("//"),

        suspicious_keyword_count,
        typosquatting_score: typosquat::typosquatting_score(&domain),

        encoded_char_count: PERCENT_ESCAPE.find_iter(raw_url).count(),
        has_unicode_chars: !raw_url.is_ascii(),

        num_subdomains: domain.split('.').count().saturating_sub(2),
        has_long_subdomain: domain.split('.').any(|label| label.len() > 20),

        is_free_hosting: domain_lists::is_free_hosting(&domain),
    })
}

// =============================================================================
// TESTS
// =============================================================================
