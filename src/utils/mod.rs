// Utility modules for PhishGuard

pub mod api_error;
pub mod domain_lists;
pub mod features;
pub mod risk_scorer;
pub mod typosquat;

pub use api_error::ApiError;
pub use features::{extract_features, FeatureError, UrlFeatures};
pub use risk_scorer::ScoreResult;
pub use typosquat::{max_brand_similarity, typosquatting_score};
