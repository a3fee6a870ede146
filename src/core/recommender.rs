use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::filters::{search_partners, PartnerSearch, MAX_SEARCH_RESULTS};
use crate::core::scoring::{calculate_match_score, meets_threshold, DEFAULT_RECOMMENDATION_LIMIT};
use crate::models::{MatchScore, Profile, Recommendation};
use crate::services::{ProfileStore, RecommendationStore, StoreError};

/// Errors raised while generating recommendations
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
}

/// A candidate that cleared the acceptance threshold
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub user_id: String,
    pub score: MatchScore,
}

/// Score every candidate against `profile` and keep the best `limit`
///
/// # Pipeline
/// 1. Drop the user themselves, inactive profiles and anyone in `exclude`
/// 2. Score each remaining pair
/// 3. Drop scores below the acceptance threshold
/// 4. Sort by score descending (ties keep candidate order) and truncate
pub fn rank_candidates(
    profile: &Profile,
    candidates: &[Profile],
    exclude: &HashSet<String>,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.user_id != profile.user_id)
        .filter(|candidate| candidate.is_active)
        .filter(|candidate| !exclude.contains(&candidate.user_id))
        .filter_map(|candidate| {
            let score = calculate_match_score(profile, candidate);
            meets_threshold(score.score).then(|| RankedCandidate {
                user_id: candidate.user_id.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable, so equal scores stay in enumeration order
    ranked.sort_by(|a, b| {
        b.score
            .score
            .partial_cmp(&a.score.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked.truncate(limit);
    ranked
}

/// Outcome of a population-wide generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    #[serde(rename = "usersProcessed")]
    pub users_processed: usize,
    #[serde(rename = "usersWithRecommendations")]
    pub users_with_recommendations: usize,
    #[serde(rename = "usersWithoutMatches")]
    pub users_without_matches: usize,
    #[serde(rename = "usersFailed")]
    pub users_failed: usize,
    #[serde(rename = "recommendationsCreated")]
    pub recommendations_created: usize,
}

/// Drives generation and refresh of stored recommendations
///
/// Assumes a single writer per user: two concurrent `generate` calls for the
/// same user may both score the same candidates, and only the store's pair
/// uniqueness keeps duplicates out.
#[derive(Clone)]
pub struct Recommender {
    profiles: Arc<dyn ProfileStore>,
    recommendations: Arc<dyn RecommendationStore>,
    default_limit: usize,
}

impl Recommender {
    pub fn new(profiles: Arc<dyn ProfileStore>, recommendations: Arc<dyn RecommendationStore>) -> Self {
        Self {
            profiles,
            recommendations,
            default_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn store(&self) -> &Arc<dyn RecommendationStore> {
        &self.recommendations
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    /// Create up to `limit` new recommendations for a user
    ///
    /// Candidates already recommended to the user are skipped, so repeated
    /// calls never create a second record for the same pair. A user without
    /// a profile gets zero recommendations.
    ///
    /// # Returns
    /// Number of recommendations actually created
    pub async fn generate(&self, user_id: &str, limit: Option<usize>) -> Result<usize, RecommendError> {
        let limit = limit.unwrap_or(self.default_limit);

        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            tracing::debug!("No profile for {}, skipping generation", user_id);
            return Ok(0);
        };

        let existing = self.recommendations.existing_recommended_ids(user_id).await?;
        let candidates = self.profiles.list_active_candidates(user_id).await?;

        tracing::debug!(
            "Scoring {} candidates for {} ({} already recommended)",
            candidates.len(),
            user_id,
            existing.len()
        );

        let batch = self.build_batch(&profile, &candidates, &existing, limit);
        let created = self.recommendations.insert_recommendations(&batch).await?;

        tracing::info!("Generated {} recommendations for {}", created, user_id);

        Ok(created as usize)
    }

    /// Delete every recommendation for a user and regenerate from scratch
    ///
    /// Deletion and insertion happen in one store call, so a failure leaves
    /// the previous recommendations in place. The user's old records are
    /// removed even when they no longer have a profile.
    pub async fn refresh(&self, user_id: &str, limit: Option<usize>) -> Result<usize, RecommendError> {
        let limit = limit.unwrap_or(self.default_limit);

        let batch = match self.profiles.get_profile(user_id).await? {
            Some(profile) => {
                let candidates = self.profiles.list_active_candidates(user_id).await?;
                self.build_batch(&profile, &candidates, &HashSet::new(), limit)
            }
            None => {
                tracing::debug!("No profile for {}, clearing recommendations only", user_id);
                Vec::new()
            }
        };

        let outcome = self.recommendations.replace_recommendations(user_id, &batch).await?;

        tracing::info!(
            "Refreshed recommendations for {}: {} removed, {} created",
            user_id,
            outcome.deleted,
            outcome.inserted
        );

        Ok(outcome.inserted as usize)
    }

    /// Run `generate` (or `refresh`) for every active user
    ///
    /// A failure for one user is logged and counted; the run continues with
    /// the next user. Only failing to enumerate users aborts the run.
    pub async fn run_batch(&self, refresh: bool) -> Result<BatchSummary, RecommendError> {
        let user_ids = self.profiles.list_active_user_ids().await?;
        let mut summary = BatchSummary::default();

        tracing::info!(
            "Starting batch {} for {} users",
            if refresh { "refresh" } else { "generation" },
            user_ids.len()
        );

        for user_id in &user_ids {
            summary.users_processed += 1;

            let result = if refresh {
                self.refresh(user_id, None).await
            } else {
                self.generate(user_id, None).await
            };

            match result {
                Ok(0) => {
                    tracing::debug!("{}: no compatible partners found", user_id);
                    summary.users_without_matches += 1;
                }
                Ok(count) => {
                    summary.users_with_recommendations += 1;
                    summary.recommendations_created += count;
                }
                Err(e) => {
                    tracing::error!("Failed to build recommendations for {}: {}", user_id, e);
                    summary.users_failed += 1;
                }
            }
        }

        tracing::info!(
            "Batch finished: {} recommendations for {} users ({} failed)",
            summary.recommendations_created,
            summary.users_with_recommendations,
            summary.users_failed
        );

        Ok(summary)
    }

    /// Score a pair of users without persisting anything
    pub async fn preview(&self, user_id: &str, candidate_user_id: &str) -> Result<MatchScore, RecommendError> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| RecommendError::ProfileNotFound(user_id.to_string()))?;
        let candidate = self
            .profiles
            .get_profile(candidate_user_id)
            .await?
            .ok_or_else(|| RecommendError::ProfileNotFound(candidate_user_id.to_string()))?;

        Ok(calculate_match_score(&profile, &candidate))
    }

    /// Search active partners for a user, optionally narrowed to one sport
    ///
    /// The caller does not need a profile of their own.
    pub async fn search(&self, user_id: &str, sport: Option<&str>) -> Result<PartnerSearch, RecommendError> {
        let candidates = self.profiles.list_active_candidates(user_id).await?;
        let search = search_partners(user_id, candidates, sport, MAX_SEARCH_RESULTS);

        tracing::debug!(
            "Partner search for {} (sport: {}) matched {} profiles",
            user_id,
            sport.unwrap_or("any"),
            search.total_results
        );

        Ok(search)
    }

    fn build_batch(
        &self,
        profile: &Profile,
        candidates: &[Profile],
        exclude: &HashSet<String>,
        limit: usize,
    ) -> Vec<Recommendation> {
        let created_at = chrono::Utc::now();

        rank_candidates(profile, candidates, exclude, limit)
            .into_iter()
            .map(|ranked| Recommendation::new(&profile.user_id, &ranked.user_id, ranked.score, created_at))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SportsField;

    fn create_candidate(id: &str, sports: &[&str], city: &str, age: u32) -> Profile {
        Profile {
            user_id: id.to_string(),
            is_active: true,
            sports: SportsField::List(sports.iter().map(|s| s.to_string()).collect()),
            country: "TN".to_string(),
            city: Some(city.to_string()),
            age: Some(age),
            availability: Some("weekend".to_string()),
            gender: Some("female".to_string()),
        }
    }

    fn create_user() -> Profile {
        create_candidate("me", &["football", "running"], "Tunis", 27)
    }

    #[test]
    fn test_rank_excludes_self() {
        let user = create_user();
        let candidates = vec![create_user()];

        let ranked = rank_candidates(&user, &candidates, &HashSet::new(), 10);

        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_applies_threshold() {
        let user = create_user();
        let candidates = vec![
            // 15 + 25 + 20 + 7 + 5 = 72
            create_candidate("good", &["football"], "Tunis", 29),
            // 0 + 15 + 0 + 7 + 5 = 27
            create_candidate("poor", &["golf"], "Sfax", 60),
        ];

        let ranked = rank_candidates(&user, &candidates, &HashSet::new(), 10);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, "good");
        assert_eq!(ranked[0].score.score, 72.0);
    }

    #[test]
    fn test_rank_sorted_and_limited() {
        let user = create_user();
        let candidates = vec![
            create_candidate("one-sport", &["football"], "Tunis", 29),
            create_candidate("two-sports", &["football", "running"], "Tunis", 29),
            create_candidate("one-sport-b", &["running"], "Tunis", 29),
        ];

        let ranked = rank_candidates(&user, &candidates, &HashSet::new(), 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user_id, "two-sports");
        // Equal scores keep enumeration order
        assert_eq!(ranked[1].user_id, "one-sport");
    }

    #[test]
    fn test_rank_skips_excluded_and_inactive() {
        let user = create_user();
        let mut inactive = create_candidate("inactive", &["football"], "Tunis", 29);
        inactive.is_active = false;
        let candidates = vec![
            create_candidate("seen", &["football"], "Tunis", 29),
            inactive,
            create_candidate("fresh", &["football"], "Tunis", 29),
        ];
        let exclude = HashSet::from(["seen".to_string()]);

        let ranked = rank_candidates(&user, &candidates, &exclude, 10);

        let ids: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[test]
    fn test_rank_zero_limit() {
        let user = create_user();
        let candidates = vec![create_candidate("good", &["football"], "Tunis", 29)];

        assert!(rank_candidates(&user, &candidates, &HashSet::new(), 0).is_empty());
    }
}
