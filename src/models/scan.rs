// Request and record types for the scan API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::verdict::Verdict;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Body of POST /api/v1/scan. The configurable length cap is enforced in
/// the handler; only structural checks live here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScanRequest {
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,
}

/// Body of POST /api/v1/lists/whitelist and /api/v1/lists/blacklist
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DomainRequest {
    #[validate(length(min = 1, max = 253, message = "Domain must be 1-253 characters"))]
    pub domain: String,
}

/// Query parameters for GET /api/v1/history
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    50
}

// =============================================================================
// SCAN RECORDS
// =============================================================================

/// One entry in the scan history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub domain: String,
    pub result: Verdict,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate scan counters. Monotonically incremented, never reset except
/// through clearing the backing store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_scans: u64,
    pub malicious: u64,
    pub suspicious: u64,
    pub safe: u64,
}

/// Response body of GET /api/v1/lists
#[derive(Debug, Clone, Serialize)]
pub struct ListsResponse {
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

impl From<crate::services::lists::ListSet> for ListsResponse {
    fn from(lists: crate::services::lists::ListSet) -> Self {
        Self {
            whitelist: lists.whitelist,
            blacklist: lists.blacklist,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
