// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{country_display_name, MatchExplanation, MatchScore, Profile, Recommendation, SportsField};
pub use requests::{BatchRequest, DismissRequest, ListRecommendationsQuery, PartnerSearchQuery, RecommendRequest, ScorePreviewRequest, UpsertProfileRequest};
pub use responses::{ErrorResponse, HealthResponse, ListRecommendationsResponse, PartnerResult, PartnerSearchResponse, RecommendResponse, ScorePreviewResponse, SuccessResponse};
