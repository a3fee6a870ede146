use serde::{Deserialize, Serialize};
use crate::core::sports::parse_sports;
use crate::models::domain::{country_display_name, MatchExplanation, Profile, Recommendation};

/// Response for the generate and refresh endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub created: usize,
}

/// Response for the list recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecommendationsResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub recommendations: Vec<Recommendation>,
    pub count: usize,
}

/// Response for the score preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePreviewResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "candidateUserId")]
    pub candidate_user_id: String,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    #[serde(rename = "meetsThreshold")]
    pub meets_threshold: bool,
    pub reasons: Vec<String>,
    pub explanation: MatchExplanation,
}

/// One profile returned by a partner search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerResult {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub sports: Vec<String>,
    pub country: String,
    #[serde(rename = "countryName")]
    pub country_name: String,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub availability: Option<String>,
    pub gender: Option<String>,
}

impl From<Profile> for PartnerResult {
    fn from(profile: Profile) -> Self {
        Self {
            sports: parse_sports(&profile.sports).into_iter().collect(),
            country_name: country_display_name(&profile.country).to_string(),
            city: profile.city().map(str::to_string),
            age: profile.age(),
            availability: profile.availability().map(str::to_string),
            gender: profile.gender().map(str::to_string),
            user_id: profile.user_id,
            country: profile.country,
        }
    }
}

/// Response for the partner search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSearchResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub sport: Option<String>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    pub results: Vec<PartnerResult>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Generic success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}
