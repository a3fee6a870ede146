// Core algorithm exports
pub mod filters;
pub mod recommender;
pub mod scoring;
pub mod sports;

pub use filters::{matches_sport, search_partners, PartnerSearch, MAX_SEARCH_RESULTS};
pub use recommender::{rank_candidates, BatchSummary, RankedCandidate, RecommendError, Recommender};
pub use scoring::{calculate_match_score, meets_threshold, ACCEPTANCE_THRESHOLD, DEFAULT_RECOMMENDATION_LIMIT};
pub use sports::parse_sports;
