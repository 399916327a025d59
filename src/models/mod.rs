pub mod scan;
pub mod verdict;

// Re-export common types
pub use scan::{DomainRequest, HistoryEntry, HistoryQuery, ListsResponse, ScanRequest, ScanStats};
pub use verdict::{reasons, ScanStatus, Verdict};
