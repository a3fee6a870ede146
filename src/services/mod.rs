// Service exports
pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Profile, Recommendation};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Errors that can occur when reading or writing persisted data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Rows touched by an atomic delete-then-insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub deleted: u64,
    pub inserted: u64,
}

/// Read/write access to user profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a single user's profile
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    /// All active profiles except the given user's
    async fn list_active_candidates(&self, exclude_user_id: &str) -> Result<Vec<Profile>, StoreError>;

    /// Ids of every active user with a profile
    async fn list_active_user_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Create or replace a profile
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError>;
}

/// Read/write access to persisted recommendations
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Ids of every user already recommended to `user_id`
    async fn existing_recommended_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError>;

    /// Insert new recommendations, skipping pairs that already exist.
    /// Returns the number of rows actually inserted.
    async fn insert_recommendations(&self, recommendations: &[Recommendation]) -> Result<u64, StoreError>;

    /// Delete every recommendation where `user_id` is the source and insert
    /// the given batch, as one atomic step
    async fn replace_recommendations(
        &self,
        user_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<ReplaceOutcome, StoreError>;

    /// Delete every recommendation where `user_id` is the source.
    /// Returns the number deleted.
    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError>;

    /// Recommendations for a user, best score first, newest first on ties
    async fn list_for_user(
        &self,
        user_id: &str,
        include_dismissed: bool,
        limit: usize,
    ) -> Result<Vec<Recommendation>, StoreError>;

    /// Flag recommendations as viewed. Returns the number updated.
    async fn mark_viewed(&self, user_id: &str, ids: &[Uuid]) -> Result<u64, StoreError>;

    /// Dismiss a recommendation owned by `user_id`.
    /// Returns false when no such recommendation exists.
    async fn dismiss(&self, user_id: &str, recommendation_id: Uuid) -> Result<bool, StoreError>;

    /// Health check for the backing storage
    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
