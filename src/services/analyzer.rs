// Decision orchestrator: sequences lists, cache, local scoring and the
// remote reputation lookup into a final verdict
// One pass per request, terminal on the first matching branch

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::models::verdict::{reasons, ScanStatus, Verdict};
use crate::services::lists::ListService;
use crate::services::rate_limiter::SlidingWindowLimiter;
use crate::services::recorder::ScanRecorder;
use crate::services::reputation::ReputationClient;
use crate::services::scan_cache::ScanCache;
use crate::utils::domain_lists;
use crate::utils::risk_scorer;

/// Local score at or above this is conclusive on its own; the remote lookup
/// is skipped to save quota.
const CONCLUSIVE_INDICATOR_SCORE: u8 = 70;

/// Weights for fusing the local indicator score with the remote score.
const INDICATOR_WEIGHT: f64 = 0.3;
const REMOTE_WEIGHT: f64 = 0.7;

// =============================================================================
// URL ANALYZER
// =============================================================================

pub struct UrlAnalyzer {
    lists: Arc<ListService>,
    cache: Arc<ScanCache>,
    recorder: Arc<ScanRecorder>,
    reputation: Option<ReputationClient>,
    rate_limiter: SlidingWindowLimiter,
}

impl UrlAnalyzer {
    pub fn new(
        lists: Arc<ListService>,
        cache: Arc<ScanCache>,
        recorder: Arc<ScanRecorder>,
        reputation: Option<ReputationClient>,
        rate_limiter: SlidingWindowLimiter,
    ) -> Self {
        Self {
            lists,
            cache,
            recorder,
            reputation,
            rate_limiter,
        }
    }

    /// Classify a URL. Always yields a verdict; failures along the way
    /// degrade the result instead of escaping.
    ///
    /// Precedence: whitelist, then blacklist, then the trusted-domain set,
    /// then cached verdicts, then local scoring, then the rate-limited
    /// remote lookup. Every terminal branch except `error` verdicts is
    /// recorded to history and stats.
    pub async fn classify(&self, url: &str) -> Verdict {
        debug!("Analyzing {}", url);

        let domain = match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_lowercase(),
                None => return Verdict::invalid_url(),
            },
            Err(e) => {
                debug!("Rejecting unparseable URL {}: {}", url, e);
                return Verdict::invalid_url();
            },
        };

        // List overrides come before any scoring, whitelist first
        let whitelisted = match self.lists.is_whitelisted(&domain).await {
            Ok(listed) => listed,
            Err(e) => return Self::storage_failure(&domain, e),
        };
        if whitelisted {
            let verdict = Verdict::new(ScanStatus::Safe, 0, reasons::WHITELISTED);
            return self.finish(url, &domain, verdict, false).await;
        }

        let blacklisted = match self.lists.is_blacklisted(&domain).await {
            Ok(listed) => listed,
            Err(e) => return Self::storage_failure(&domain, e),
        };
        if blacklisted {
            info!("Blacklisted domain {}", domain);
            let verdict = Verdict::new(ScanStatus::Malicious, 100, reasons::BLACKLISTED);
            return self.finish(url, &domain, verdict, false).await;
        }

        if domain_lists::is_trusted_domain(&domain) {
            let verdict = Verdict::new(ScanStatus::Safe, 0, reasons::TRUSTED_DOMAIN);
            return self.finish(url, &domain, verdict, false).await;
        }

        // Cached verdicts still count as a scan
        match self.cache.get(url).await {
            Ok(Some(cached)) => {
                debug!("Cache hit for {}", url);
                return self.finish(url, &domain, cached, false).await;
            },
            Ok(None) => {},
            Err(e) => warn!("Cache read failed for {}: {}", url, e),
        }

        let local = risk_scorer::analyze(url);
        let indicator_score = local.score;
        debug!(
            "Indicator score {} (confidence {:.2}) for {}",
            indicator_score, local.confidence, url
        );

        if indicator_score >= CONCLUSIVE_INDICATOR_SCORE {
            info!(
                "Local indicators conclusive for {}: score {}",
                url, indicator_score
            );
            let verdict = Verdict::new(
                ScanStatus::Malicious,
                indicator_score,
                reasons::PHISHING_INDICATORS,
            );
            return self.finish(url, &domain, verdict, true).await;
        }

        let reputation = match &self.reputation {
            Some(client) => client,
            None => {
                let verdict = Verdict::new(
                    ScanStatus::from_score(indicator_score),
                    indicator_score,
                    reasons::NO_API_KEY,
                );
                return self.finish(url, &domain, verdict, true).await;
            },
        };

        // Non-blocking admission check: when the window is full, fall back
        // to the local verdict rather than queueing behind the limiter
        if !self.rate_limiter.can_make_request() {
            warn!(
                "Reputation lookups rate limited, next slot in {:?}",
                self.rate_limiter.wait_time()
            );
            let verdict = Verdict::new(
                ScanStatus::from_score(indicator_score),
                indicator_score,
                reasons::RATE_LIMITED,
            );
            return self.finish(url, &domain, verdict, false).await;
        }
        self.rate_limiter.record_request();

        match reputation.scan_url(url).await {
            Ok(report) => {
                let final_score = Self::fuse_scores(indicator_score, report.score);
                let verdict = Verdict::combined(
                    final_score,
                    indicator_score,
                    report.score,
                    report.detections,
                );
                if verdict.status == ScanStatus::Malicious {
                    info!(
                        "Combined analysis flags {}: {} ({} detections)",
                        url, final_score, report.detections
                    );
                }
                self.finish(url, &domain, verdict, true).await
            },
            Err(e) => {
                // A failed lookup is never itself evidence of phishing
                warn!("Reputation lookup failed for {}: {}", url, e);
                let verdict = Verdict::new(
                    ScanStatus::from_score(indicator_score),
                    indicator_score,
                    reasons::REMOTE_UNAVAILABLE,
                );
                self.finish(url, &domain, verdict, false).await
            },
        }
    }

    /// Weighted fusion of local and remote scores, remote-dominant.
    fn fuse_scores(indicator_score: u8, remote_score: u8) -> u8 {
        (INDICATOR_WEIGHT * indicator_score as f64 + REMOTE_WEIGHT * remote_score as f64).round()
            as u8
    }

    fn storage_failure(domain: &str, e: crate::storage::StorageError) -> Verdict {
        error!("List lookup failed for {}: {}", domain, e);
        Verdict::new(ScanStatus::Error, 0, reasons::STORAGE_ERROR)
    }

    // Record the terminal verdict; cacheable branches also write the cache.
    // Persistence failures are logged and swallowed so the verdict still
    // reaches the caller.
    async fn finish(&self, url: &str, domain: &str, verdict: Verdict, cacheable: bool) -> Verdict {
        if cacheable {
            if let Err(e) = self.cache.set(url, &verdict).await {
                warn!("Failed to cache verdict for {}: {}", url, e);
            }
        }

        if let Err(e) = self.recorder.record(url, domain, &verdict).await {
            warn!("Failed to record scan of {}: {}", url, e);
        }

        verdict
    }
}

// =============================================================================
// TESTS
// =============================================================================
