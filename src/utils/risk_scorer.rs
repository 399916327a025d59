// Weighted additive risk model over extracted URL features
// Single authoritative scorer; every caller goes through this module

use serde::Serialize;
use url::Url;

use crate::utils::domain_lists;
use crate::utils::features::{self, UrlFeatures};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Score returned when a URL cannot be parsed at all
pub const NEUTRAL_FALLBACK_SCORE: u8 = 50;

/// Confidence attached to the neutral fallback
pub const NEUTRAL_FALLBACK_CONFIDENCE: f64 = 0.3;

/// Confidence is never reported as certainty
pub const MAX_CONFIDENCE: f64 = 0.95;

// =============================================================================
// SCORE RESULT
// =============================================================================

/// Outcome of local analysis: risk score in [0,100], confidence in [0,0.95]
/// (1.0 only for the trusted-domain bypass), and the extracted features when
/// extraction ran.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub score: u8,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<UrlFeatures>,
}

impl ScoreResult {
    /// Exact trusted-domain match; feature extraction is skipped entirely.
    pub fn trusted() -> Self {
        Self {
            score: 0,
            confidence: 1.0,
            features: None,
        }
    }

    /// Unparseable input degrades to a neutral midpoint rather than an error.
    pub fn neutral_fallback() -> Self {
        Self {
            score: NEUTRAL_FALLBACK_SCORE,
            confidence: NEUTRAL_FALLBACK_CONFIDENCE,
            features: None,
        }
    }
}

// =============================================================================
// SCORING
// =============================================================================

/// Additive risk score. Each active feature contributes a fixed delta;
/// stacking thresholds (length, special chars) are cumulative. Result is
/// clamped to 100.
pub fn score(features: &UrlFeatures) -> u8 {
    let mut score: u32 = 0;

    // Free hosting is a strong signal on its own
    if features.is_free_hosting {
        score += 35;
    }

    // Length penalties
    if features.url_length > 150 {
        score += 10;
    }
    if features.url_length > 250 {
        score += 10;
    }
    if features.domain_length > 40 {
        score += 15;
    }

    // Character anomalies
    if features.num_dots > 5 {
        score += 10;
    }
    if features.num_hyphens > 3 {
        score += 10;
    }
    if features.num_digits > 4 {
        score += 10;
    }
    if features.num_special_chars > 20 {
        score += 10;
    }
    if features.num_special_chars > 40 {
        score += 15;
    }

    // Transport and host shape
    if !features.has_https {
        score += 25;
    }
    if features.has_ip_address {
        score += 30;
    }

    // High-risk patterns
    if features.has_suspicious_tld {
        score += 35;
    }
    if features.has_at_symbol {
        score += 25;
    }
    if features.has_double_slash {
        score += 20;
    }

    // Credential-phishing keywords, 8 points per contained keyword
    score += features.suspicious_keyword_count as u32 * 8;

    // Brand lookalikes contribute their tier directly
    score += features.typosquatting_score as u32;

    // Obfuscation
    if features.encoded_char_count > 10 {
        score += 15;
    } else if features.encoded_char_count > 5 {
        score += 5;
    }
    if features.has_unicode_chars {
        score += 15;
    }

    // Subdomain anomalies
    if features.num_subdomains > 3 {
        score += 15;
    }
    if features.has_long_subdomain {
        score += 15;
    }

    score.min(100) as u8
}

/// Confidence in the score, from 0.5 baseline up to 0.95. Raised by the
/// signals that rarely appear on legitimate URLs.
pub fn confidence(features: &UrlFeatures) -> f64 {
    let mut confidence: f64 = 0.5;

    if features.has_ip_address {
        confidence += 0.2;
    }
    if features.has_suspicious_tld {
        confidence += 0.2;
    }
    if features.typosquatting_score > 30 {
        confidence += 0.15;
    }
    if !features.has_https {
        confidence += 0.1;
    }
    if features.is_free_hosting {
        confidence += 0.15;
    }
    if features.suspicious_keyword_count > 2 {
        confidence += 0.1;
    }

    confidence.min(MAX_CONFIDENCE)
}

/// Full local analysis of a raw URL string.
///
/// Exact trusted-domain hosts bypass extraction with score 0 and full
/// confidence. Unparseable input yields the neutral fallback instead of an
/// error so callers always get a usable result.
pub fn analyze(raw_url: &str) -> ScoreResult {
    if let Ok(parsed) = Url::parse(raw_url) {
        if let Some(host) = parsed.host_str() {
            if domain_lists::is_trusted_domain(&host.to_lowercase()) {
                return ScoreResult::trusted();
            }
        }
    }

    match features::extract_features(raw_url) {
        Ok(extracted) => ScoreResult {
            score: score(&extracted),
            confidence: confidence(&extracted),
            features: Some(extracted),
        },
        Err(_) => ScoreResult::neutral_fallback(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
