use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Profile, SportsField};

/// Request to generate or refresh recommendations for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to run generation (or refresh) over every active user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub refresh: bool,
}

/// Query parameters for listing a user's recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListRecommendationsQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Query parameters for searching partners
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PartnerSearchQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub sport: Option<String>,
}

/// Request to dismiss one recommendation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DismissRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Request to score a pair of users without persisting anything
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScorePreviewRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_user_id", rename = "candidateUserId")]
    pub candidate_user_id: String,
}

/// Request to create or update a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sports: SportsField,
    #[validate(length(min = 1, max = 10))]
    pub country: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub city: Option<String>,
    #[validate(range(max = 150))]
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub availability: Option<String>,
    #[validate(length(max = 10))]
    #[serde(default)]
    pub gender: Option<String>,
}

fn default_true() -> bool { true }

impl From<UpsertProfileRequest> for Profile {
    fn from(req: UpsertProfileRequest) -> Self {
        Profile {
            user_id: req.user_id,
            is_active: req.is_active,
            sports: req.sports,
            country: req.country,
            city: req.city,
            age: req.age,
            availability: req.availability,
            gender: req.gender,
        }
    }
}
