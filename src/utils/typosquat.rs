// Typosquatting detection via edit-distance similarity against known brands

use strsim::normalized_levenshtein;

use crate::utils::domain_lists::BRAND_DOMAINS;

// =============================================================================
// SCORE TIERS
// =============================================================================

/// Contribution for a near-exact lookalike (similarity above 0.85)
pub const STRONG_LOOKALIKE_SCORE: u8 = 45;

/// Contribution for a weaker lookalike (similarity above 0.75)
pub const WEAK_LOOKALIKE_SCORE: u8 = 25;

// =============================================================================
// DETECTION
// =============================================================================

/// Highest normalized Levenshtein similarity between `domain` and any brand
/// in the reference set. Similarity is (max_len - distance) / max_len, so
/// identical strings score 1.0 and disjoint strings approach 0.0.
pub fn max_brand_similarity(domain: &str) -> f64 {
    BRAND_DOMAINS
        .iter()
        .map(|brand| normalized_levenshtein(domain, brand))
        .fold(0.0, f64::max)
}

/// Risk contribution for lookalike domains. An exact brand match contributes
/// nothing: genuine brand domains are cleared by the trusted-domain bypass
/// before scoring, so only near misses matter here.
pub fn typosquatting_score(domain: &str) -> u8 {
    let similarity = max_brand_similarity(domain);

    if similarity >= 1.0 {
        0
    } else if similarity > 0.85 {
        STRONG_LOOKALIKE_SCORE
    } else if similarity > 0.75 {
        WEAK_LOOKALIKE_SCORE
    } else {
        0
    }
}

// =============================================================================
// TESTS
// =============================================================================
