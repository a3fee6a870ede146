use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Profile, Recommendation};
use crate::services::{ProfileStore, RecommendationStore, ReplaceOutcome, StoreError};

/// In-process store for tests and local runs
///
/// Profiles are kept ordered by user id so candidate enumeration is
/// deterministic. Recommendations keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<BTreeMap<String, Profile>>,
    recommendations: RwLock<Vec<Recommendation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with profiles
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.user_id.clone(), profile))
            .collect();

        Self {
            profiles: RwLock::new(profiles),
            recommendations: RwLock::new(Vec::new()),
        }
    }

    /// Every stored recommendation for a user, dismissed ones included
    pub async fn recommendations_for(&self, user_id: &str) -> Vec<Recommendation> {
        self.recommendations
            .read()
            .await
            .iter()
            .filter(|rec| rec.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn list_active_candidates(&self, exclude_user_id: &str) -> Result<Vec<Profile>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .filter(|p| p.is_active && p.user_id != exclude_user_id)
            .cloned()
            .collect())
    }

    async fn list_active_user_ids(&self) -> Result<Vec<String>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.user_id.clone())
            .collect())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

fn push_unique(stored: &mut Vec<Recommendation>, batch: &[Recommendation]) -> u64 {
    let mut inserted = 0;
    for rec in batch {
        let exists = stored
            .iter()
            .any(|r| r.user_id == rec.user_id && r.recommended_user_id == rec.recommended_user_id);
        if !exists {
            stored.push(rec.clone());
            inserted += 1;
        }
    }
    inserted
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn existing_recommended_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let recommendations = self.recommendations.read().await;
        Ok(recommendations
            .iter()
            .filter(|rec| rec.user_id == user_id)
            .map(|rec| rec.recommended_user_id.clone())
            .collect())
    }

    async fn insert_recommendations(&self, recommendations: &[Recommendation]) -> Result<u64, StoreError> {
        let mut stored = self.recommendations.write().await;
        Ok(push_unique(&mut stored, recommendations))
    }

    async fn replace_recommendations(
        &self,
        user_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<ReplaceOutcome, StoreError> {
        if let Some(foreign) = recommendations.iter().find(|rec| rec.user_id != user_id) {
            return Err(StoreError::InvalidInput(format!(
                "recommendation {} belongs to {}, not {}",
                foreign.id, foreign.user_id, user_id
            )));
        }

        // Single write guard covers both steps
        let mut stored = self.recommendations.write().await;
        let before = stored.len();
        stored.retain(|rec| rec.user_id != user_id);
        let deleted = (before - stored.len()) as u64;
        let inserted = push_unique(&mut stored, recommendations);

        Ok(ReplaceOutcome { deleted, inserted })
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut stored = self.recommendations.write().await;
        let before = stored.len();
        stored.retain(|rec| rec.user_id != user_id);
        Ok((before - stored.len()) as u64)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        include_dismissed: bool,
        limit: usize,
    ) -> Result<Vec<Recommendation>, StoreError> {
        let mut found: Vec<Recommendation> = self
            .recommendations_for(user_id)
            .await
            .into_iter()
            .filter(|rec| include_dismissed || !rec.is_dismissed)
            .collect();

        found.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        found.truncate(limit);

        Ok(found)
    }

    async fn mark_viewed(&self, user_id: &str, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut stored = self.recommendations.write().await;
        let mut updated = 0;
        for rec in stored.iter_mut().filter(|r| r.user_id == user_id && ids.contains(&r.id)) {
            rec.is_viewed = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn dismiss(&self, user_id: &str, recommendation_id: Uuid) -> Result<bool, StoreError> {
        let mut stored = self.recommendations.write().await;
        match stored
            .iter_mut()
            .find(|r| r.user_id == user_id && r.id == recommendation_id)
        {
            Some(rec) => {
                rec.is_dismissed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
