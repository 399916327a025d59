// Verdict model: the classification outcome for a single URL

use serde::{Deserialize, Serialize};

// =============================================================================
// REASON STRINGS
// =============================================================================

/// Stable reason identifiers attached to every verdict. These are part of
/// the API contract; clients switch on them, so they never change casing.
pub mod reasons {
    pub const WHITELISTED: &str = "whitelisted";
    pub const BLACKLISTED: &str = "blacklisted";
    pub const TRUSTED_DOMAIN: &str = "trusted_domain";
    pub const PHISHING_INDICATORS: &str = "phishing_indicators";
    pub const NO_API_KEY: &str = "no_api_key";
    pub const COMBINED_ANALYSIS: &str = "combined_analysis";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const REMOTE_UNAVAILABLE: &str = "remote_unavailable";
    pub const INVALID_URL: &str = "invalid_url";
    pub const STORAGE_ERROR: &str = "storage_error";
}

// =============================================================================
// SCAN STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Safe,
    Suspicious,
    Malicious,
    Error,
}

impl ScanStatus {
    /// Band a 0-100 risk score into a status. Used wherever a score is the
    /// only signal: indicator-only verdicts and fused final scores.
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            ScanStatus::Malicious
        } else if score >= 40 {
            ScanStatus::Suspicious
        } else {
            ScanStatus::Safe
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ScanStatus::Safe => "safe",
            ScanStatus::Suspicious => "suspicious",
            ScanStatus::Malicious => "malicious",
            ScanStatus::Error => "error",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// VERDICT
// =============================================================================

/// Final classification for a URL. Immutable once constructed; the optional
/// score breakdown fields are present only for combined local+remote
/// verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: ScanStatus,
    pub score: u8,
    pub reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_score: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_score: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_detections: Option<u32>,
}

impl Verdict {
    pub fn new(status: ScanStatus, score: u8, reason: &str) -> Self {
        Self {
            status,
            score,
            reason: reason.to_string(),
            indicator_score: None,
            remote_score: None,
            remote_detections: None,
        }
    }

    /// Fused local+remote verdict carrying the score breakdown.
    pub fn combined(
        final_score: u8,
        indicator_score: u8,
        remote_score: u8,
        remote_detections: u32,
    ) -> Self {
        Self {
            status: ScanStatus::from_score(final_score),
            score: final_score,
            reason: reasons::COMBINED_ANALYSIS.to_string(),
            indicator_score: Some(indicator_score),
            remote_score: Some(remote_score),
            remote_detections: Some(remote_detections),
        }
    }

    /// Verdict for input that could not be parsed as a URL. Not recorded to
    /// history or stats; there is no domain to attribute it to.
    pub fn invalid_url() -> Self {
        Self::new(ScanStatus::Error, 0, reasons::INVALID_URL)
    }
}

// =============================================================================
// TESTS
// =============================================================================
