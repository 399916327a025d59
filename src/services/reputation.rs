// Remote URL reputation client speaking the VirusTotal v3 API shape
// Lookup first; submit and poll once only when the URL is unknown

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::app_config::ReputationConfig;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Reputation service returned HTTP {status}")]
    Http { status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),
}

// =============================================================================
// REPORT TYPES
// =============================================================================

/// Standalone status thresholds for direct queries. The orchestrator bands
/// its own fused score instead; these are stricter, flagging a URL on a
/// handful of raw engine detections regardless of the normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationStatus {
    Safe,
    Suspicious,
    Malicious,
    Pending,
}

/// Per-engine detection buckets as reported by the remote service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStats {
    #[serde(default)]
    pub malicious: u32,
    #[serde(default)]
    pub suspicious: u32,
    #[serde(default)]
    pub harmless: u32,
    #[serde(default)]
    pub undetected: u32,
    #[serde(default)]
    pub timeout: u32,
}

impl EngineStats {
    pub fn total(&self) -> u32 {
        self.malicious + self.suspicious + self.harmless + self.undetected + self.timeout
    }
}

/// Parsed outcome of a reputation query.
#[derive(Debug, Clone, Serialize)]
pub struct ReputationReport {
    pub status: ReputationStatus,
    pub score: u8,
    pub detections: u32,
    pub total_engines: u32,
    pub malicious: u32,
    pub suspicious: u32,
}

impl ReputationReport {
    /// A submission that has not finished analyzing. Neutral score, no
    /// detections; never an error.
    pub fn pending() -> Self {
        Self {
            status: ReputationStatus::Pending,
            score: 50,
            detections: 0,
            total_engines: 0,
            malicious: 0,
            suspicious: 0,
        }
    }

    fn from_stats(stats: &EngineStats) -> Self {
        let detections = stats.malicious + stats.suspicious;
        let total = stats.total();
        let score = if total > 0 {
            ((detections as f64 / total as f64) * 100.0).round() as u8
        } else {
            0
        };

        let status = if stats.malicious > 5 {
            ReputationStatus::Malicious
        } else if stats.malicious > 0 || stats.suspicious > 3 {
            ReputationStatus::Suspicious
        } else {
            ReputationStatus::Safe
        };

        Self {
            status,
            score,
            detections,
            total_engines: total,
            malicious: stats.malicious,
            suspicious: stats.suspicious,
        }
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    data: ApiData,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    attributes: Option<ApiAttributes>,
}

#[derive(Debug, Deserialize)]
struct ApiAttributes {
    // Present on analysis resources: "queued" or "completed"
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    last_analysis_stats: Option<EngineStats>,
    #[serde(default)]
    stats: Option<EngineStats>,
}

// =============================================================================
// REPUTATION CLIENT
// =============================================================================

pub struct ReputationClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    poll_delay: Duration,
    privacy_mode: bool,
}

impl ReputationClient {
    pub fn new(
        api_url: &str,
        api_key: &str,
        poll_delay: Duration,
        timeout: Duration,
        privacy_mode: bool,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("PhishGuard-Scanner/1.0")
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            poll_delay,
            privacy_mode,
        }
    }

    /// Build a client from configuration; None when no credential is set.
    pub fn from_config(config: &ReputationConfig) -> Option<Self> {
        config.api_key.as_ref().map(|key| {
            Self::new(
                &config.api_url,
                key,
                Duration::from_secs(config.poll_delay_seconds),
                Duration::from_secs(config.timeout_seconds),
                config.privacy_mode,
            )
        })
    }

    /// Query the reputation of a URL.
    ///
    /// A previously analyzed URL is served from the remote database. An
    /// unknown URL is submitted, and after one fixed delay the analysis is
    /// polled exactly once; if it still has not completed the result is
    /// `pending`, not an error. In privacy mode the raw URL is never
    /// transmitted, so an unknown URL stays `pending` without a submission.
    pub async fn scan_url(&self, url: &str) -> Result<ReputationReport, ReputationError> {
        let url_id = self.url_identifier(url);

        let response = self
            .http_client
            .get(format!("{}/urls/{}", self.api_url, url_id))
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            let envelope: ApiEnvelope = response.json().await?;
            return Self::parse_report(&envelope);
        }

        debug!("No prior analysis for {}, submitting", url_id);

        if self.privacy_mode {
            return Ok(ReputationReport::pending());
        }

        let analysis_id = self.submit_url(url).await?;
        tokio::time::sleep(self.poll_delay).await;

        let response = self
            .http_client
            .get(format!("{}/analyses/{}", self.api_url, analysis_id))
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ReputationReport::pending());
        }

        let envelope: ApiEnvelope = response.json().await?;
        Self::parse_report(&envelope)
    }

    async fn submit_url(&self, url: &str) -> Result<String, ReputationError> {
        let response = self
            .http_client
            .post(format!("{}/urls", self.api_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReputationError::Http {
                status: response.status().as_u16(),
            });
        }

        let envelope: ApiEnvelope = response.json().await?;
        envelope.data.id.ok_or_else(|| {
            ReputationError::Parse("submission response missing analysis id".to_string())
        })
    }

    // URL resources are addressed by unpadded URL-safe base64 of the URL.
    // Privacy mode addresses by SHA-256 instead, which can only hit URLs
    // someone else already submitted.
    fn url_identifier(&self, url: &str) -> String {
        if self.privacy_mode {
            format!("{:x}", Sha256::digest(url.as_bytes()))
        } else {
            URL_SAFE_NO_PAD.encode(url)
        }
    }

    fn parse_report(envelope: &ApiEnvelope) -> Result<ReputationReport, ReputationError> {
        let attributes = envelope
            .data
            .attributes
            .as_ref()
            .ok_or_else(|| ReputationError::Parse("response missing attributes".to_string()))?;

        if let Some(status) = &attributes.status {
            if status != "completed" {
                return Ok(ReputationReport::pending());
            }
        }

        let stats = attributes
            .last_analysis_stats
            .as_ref()
            .or(attributes.stats.as_ref())
            .ok_or_else(|| ReputationError::Parse("response missing analysis stats".to_string()))?;

        Ok(ReputationReport::from_stats(stats))
    }
}

// =============================================================================
// TESTS
// =============================================================================
