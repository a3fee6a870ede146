use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::core::sports::parse_sports;
use crate::models::{MatchExplanation, Profile, Recommendation, SportsField};
use crate::services::{ProfileStore, RecommendationStore, ReplaceOutcome, StoreError};

/// PostgreSQL-backed profile and recommendation store
///
/// Profiles live in `profiles`, recommendations in
/// `partner_recommendations`. A unique index on
/// `(user_id, recommended_user_id)` guarantees a pair is never stored twice,
/// even when two generation runs for the same user overlap.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections.unwrap_or(10)
        );

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool. Migrations are not run.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn profile_from_row(row: &PgRow) -> Result<Profile, StoreError> {
    let sports: Option<Json<serde_json::Value>> = row.try_get("sports")?;
    let age: Option<i32> = row.try_get("age")?;

    Ok(Profile {
        user_id: row.try_get("user_id")?,
        is_active: row.try_get("is_active")?,
        sports: sports.map(|Json(value)| SportsField::from(value)).unwrap_or_default(),
        country: row.try_get("country")?,
        city: row.try_get("city")?,
        age: age.and_then(|a| u32::try_from(a).ok()),
        availability: row.try_get("availability")?,
        gender: row.try_get("gender")?,
    })
}

fn recommendation_from_row(row: &PgRow) -> Result<Recommendation, StoreError> {
    let Json(explanation): Json<MatchExplanation> = row.try_get("explanation")?;
    let Json(reasons): Json<Vec<String>> = row.try_get("reasons")?;

    Ok(Recommendation {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        recommended_user_id: row.try_get("recommended_user_id")?,
        match_score: row.try_get("match_score")?,
        explanation,
        reasons,
        created_at: row.try_get("created_at")?,
        is_viewed: row.try_get("is_viewed")?,
        is_dismissed: row.try_get("is_dismissed")?,
    })
}

const INSERT_RECOMMENDATION: &str = r#"
    INSERT INTO partner_recommendations
        (id, user_id, recommended_user_id, match_score, explanation, reasons, created_at, is_viewed, is_dismissed)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (user_id, recommended_user_id) DO NOTHING
"#;

async fn insert_all(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recommendations: &[Recommendation],
) -> Result<u64, StoreError> {
    let mut inserted = 0;

    for rec in recommendations {
        let result = sqlx::query(INSERT_RECOMMENDATION)
            .bind(rec.id)
            .bind(&rec.user_id)
            .bind(&rec.recommended_user_id)
            .bind(rec.match_score)
            .bind(Json(rec.explanation.clone()))
            .bind(Json(rec.reasons.clone()))
            .bind(rec.created_at)
            .bind(rec.is_viewed)
            .bind(rec.is_dismissed)
            .execute(&mut **tx)
            .await?;

        inserted += result.rows_affected();
    }

    Ok(inserted)
}

#[async_trait]
impl ProfileStore for PostgresStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let query = r#"
            SELECT user_id, is_active, sports, country, city, age, availability, gender
            FROM profiles
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query).bind(user_id).fetch_optional(&self.pool).await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn list_active_candidates(&self, exclude_user_id: &str) -> Result<Vec<Profile>, StoreError> {
        let query = r#"
            SELECT user_id, is_active, sports, country, city, age, availability, gender
            FROM profiles
            WHERE is_active AND user_id <> $1
            ORDER BY user_id
        "#;

        let rows = sqlx::query(query).bind(exclude_user_id).fetch_all(&self.pool).await?;

        tracing::debug!("Loaded {} candidate profiles excluding {}", rows.len(), exclude_user_id);

        rows.iter().map(profile_from_row).collect()
    }

    async fn list_active_user_ids(&self) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT user_id
            FROM profiles
            WHERE is_active
            ORDER BY user_id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("user_id").map_err(StoreError::from))
            .collect()
    }

    /// Sports are always written as a structured array, so legacy
    /// JSON-in-text values are normalized the first time a profile is saved
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let age = profile
            .age
            .map(i32::try_from)
            .transpose()
            .map_err(|_| StoreError::InvalidInput(format!("age out of range for {}", profile.user_id)))?;
        let sports: Vec<String> = parse_sports(&profile.sports).into_iter().collect();

        let query = r#"
            INSERT INTO profiles (user_id, is_active, sports, country, city, age, availability, gender, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                is_active = EXCLUDED.is_active,
                sports = EXCLUDED.sports,
                country = EXCLUDED.country,
                city = EXCLUDED.city,
                age = EXCLUDED.age,
                availability = EXCLUDED.availability,
                gender = EXCLUDED.gender,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(&profile.user_id)
            .bind(profile.is_active)
            .bind(Json(sports))
            .bind(&profile.country)
            .bind(&profile.city)
            .bind(age)
            .bind(&profile.availability)
            .bind(&profile.gender)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Upserted profile {}", profile.user_id);

        Ok(())
    }
}

#[async_trait]
impl RecommendationStore for PostgresStore {
    async fn existing_recommended_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let query = r#"
            SELECT recommended_user_id
            FROM partner_recommendations
            WHERE user_id = $1
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("recommended_user_id").map_err(StoreError::from))
            .collect()
    }

    async fn insert_recommendations(&self, recommendations: &[Recommendation]) -> Result<u64, StoreError> {
        if recommendations.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let inserted = insert_all(&mut tx, recommendations).await?;
        tx.commit().await?;

        Ok(inserted)
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

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM partner_recommendations WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let inserted = insert_all(&mut tx, recommendations).await?;

        tx.commit().await?;

        tracing::info!(
            "Replaced recommendations for {}: {} deleted, {} inserted",
            user_id,
            deleted,
            inserted
        );

        Ok(ReplaceOutcome { deleted, inserted })
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let deleted = sqlx::query("DELETE FROM partner_recommendations WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!("Deleted {} recommendations for {}", deleted, user_id);

        Ok(deleted)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        include_dismissed: bool,
        limit: usize,
    ) -> Result<Vec<Recommendation>, StoreError> {
        let query = r#"
            SELECT id, user_id, recommended_user_id, match_score, explanation, reasons,
                   created_at, is_viewed, is_dismissed
            FROM partner_recommendations
            WHERE user_id = $1 AND ($2 OR NOT is_dismissed)
            ORDER BY match_score DESC, created_at DESC
            LIMIT $3
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(include_dismissed)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(recommendation_from_row).collect()
    }

    async fn mark_viewed(&self, user_id: &str, ids: &[Uuid]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let query = r#"
            UPDATE partner_recommendations
            SET is_viewed = TRUE
            WHERE user_id = $1 AND id = ANY($2)
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn dismiss(&self, user_id: &str, recommendation_id: Uuid) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE partner_recommendations
            SET is_dismissed = TRUE
            WHERE user_id = $1 AND id = $2
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(recommendation_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::calculate_match_score;

    fn profile(user_id: &str) -> Profile {
        Profile {
            user_id: user_id.to_string(),
            is_active: true,
            sports: SportsField::Encoded(r#"["tennis"]"#.to_string()),
            country: "FR".to_string(),
            city: Some("Paris".to_string()),
            age: Some(30),
            availability: Some("weekend".to_string()),
            gender: Some("female".to_string()),
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
    async fn test_replace_is_atomic_and_deduplicated() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let store = PostgresStore::new(&url, 2, 1, Duration::from_secs(5), Duration::from_secs(60))
            .await
            .expect("Failed to connect");

        let a = profile("pg-test-a");
        let b = profile("pg-test-b");
        store.upsert_profile(&a).await.unwrap();
        store.upsert_profile(&b).await.unwrap();

        let loaded = store.get_profile("pg-test-a").await.unwrap().unwrap();
        assert_eq!(loaded.sports, SportsField::List(vec!["tennis".to_string()]));

        let rec = Recommendation::new("pg-test-a", "pg-test-b", calculate_match_score(&a, &b), chrono::Utc::now());
        let duplicate = Recommendation::new("pg-test-a", "pg-test-b", calculate_match_score(&a, &b), chrono::Utc::now());

        store.replace_recommendations("pg-test-a", &[]).await.unwrap();
        assert_eq!(store.insert_recommendations(&[rec]).await.unwrap(), 1);
        assert_eq!(store.insert_recommendations(&[duplicate]).await.unwrap(), 0);

        let outcome = store.replace_recommendations("pg-test-a", &[]).await.unwrap();
        assert_eq!(outcome, ReplaceOutcome { deleted: 1, inserted: 0 });
    }
}
