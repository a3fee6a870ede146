use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::{meets_threshold, RecommendError};
use crate::models::{
    BatchRequest, DismissRequest, ErrorResponse, HealthResponse, ListRecommendationsQuery,
    ListRecommendationsResponse, RecommendRequest, RecommendResponse, ScorePreviewRequest,
    ScorePreviewResponse, SuccessResponse,
};
use crate::routes::{internal_error, validation_error, AppState};

/// Recommendations shown per page, matching the listing page size
const LIST_PAGE_SIZE: usize = 10;

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::get().to(list_recommendations))
        .route("/recommendations/generate", web::post().to(generate))
        .route("/recommendations/refresh", web::post().to(refresh))
        .route("/recommendations/batch", web::post().to(run_batch))
        .route("/recommendations/{id}/dismiss", web::post().to(dismiss))
        .route("/matches/score", web::post().to(score_preview));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.recommender.store().health_check().await.unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate recommendations endpoint
///
/// POST /api/v1/recommendations/generate
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 10
/// }
/// ```
async fn generate(state: web::Data<AppState>, req: web::Json<RecommendRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let limit = state.limits.effective_limit(req.limit.map(usize::from));

    match state.recommender.generate(&req.user_id, Some(limit)).await {
        Ok(created) => HttpResponse::Ok().json(RecommendResponse {
            user_id: req.user_id.clone(),
            created,
        }),
        Err(e) => {
            tracing::error!("Failed to generate recommendations for {}: {}", req.user_id, e);
            internal_error("Failed to generate recommendations", e)
        }
    }
}

/// Refresh recommendations endpoint
///
/// POST /api/v1/recommendations/refresh
///
/// Deletes the user's existing recommendations and regenerates them.
async fn refresh(state: web::Data<AppState>, req: web::Json<RecommendRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let limit = state.limits.effective_limit(req.limit.map(usize::from));

    match state.recommender.refresh(&req.user_id, Some(limit)).await {
        Ok(created) => HttpResponse::Ok().json(RecommendResponse {
            user_id: req.user_id.clone(),
            created,
        }),
        Err(e) => {
            tracing::error!("Failed to refresh recommendations for {}: {}", req.user_id, e);
            internal_error("Failed to refresh recommendations", e)
        }
    }
}

/// Batch generation endpoint
///
/// POST /api/v1/recommendations/batch
///
/// Request body:
/// ```json
/// { "refresh": false }
/// ```
async fn run_batch(state: web::Data<AppState>, req: web::Json<BatchRequest>) -> impl Responder {
    match state.recommender.run_batch(req.refresh).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            tracing::error!("Batch recommendation run failed: {}", e);
            internal_error("Batch run failed", e)
        }
    }
}

/// List recommendations endpoint
///
/// GET /api/v1/recommendations?userId={userId}
///
/// Returns the user's best non-dismissed recommendations and marks them
/// as viewed.
async fn list_recommendations(
    state: web::Data<AppState>,
    query: web::Query<ListRecommendationsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let store = state.recommender.store();
    let user_id = &query.user_id;

    let mut recommendations = match store.list_for_user(user_id, false, LIST_PAGE_SIZE).await {
        Ok(recs) => recs,
        Err(e) => {
            tracing::error!("Failed to list recommendations for {}: {}", user_id, e);
            return internal_error("Failed to list recommendations", e);
        }
    };

    let ids: Vec<Uuid> = recommendations.iter().map(|rec| rec.id).collect();
    match store.mark_viewed(user_id, &ids).await {
        Ok(_) => recommendations.iter_mut().for_each(|rec| rec.is_viewed = true),
        Err(e) => tracing::warn!("Failed to mark recommendations viewed for {}: {}", user_id, e),
    }

    HttpResponse::Ok().json(ListRecommendationsResponse {
        user_id: user_id.clone(),
        count: recommendations.len(),
        recommendations,
    })
}

/// Dismiss recommendation endpoint
///
/// POST /api/v1/recommendations/{id}/dismiss
async fn dismiss(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<DismissRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let recommendation_id = path.into_inner();

    match state.recommender.store().dismiss(&req.user_id, recommendation_id).await {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Recommendation not found".to_string(),
            message: format!("No recommendation {} for user {}", recommendation_id, req.user_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to dismiss {}: {}", recommendation_id, e);
            internal_error("Failed to dismiss recommendation", e)
        }
    }
}

/// Score preview endpoint
///
/// POST /api/v1/matches/score
///
/// Scores two users against each other without storing anything.
async fn score_preview(state: web::Data<AppState>, req: web::Json<ScorePreviewRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.recommender.preview(&req.user_id, &req.candidate_user_id).await {
        Ok(score) => HttpResponse::Ok().json(ScorePreviewResponse {
            user_id: req.user_id.clone(),
            candidate_user_id: req.candidate_user_id.clone(),
            match_score: score.score,
            meets_threshold: meets_threshold(score.score),
            reasons: score.reasons,
            explanation: score.explanation,
        }),
        Err(RecommendError::ProfileNotFound(user_id)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Profile not found".to_string(),
            message: format!("No profile for user {}", user_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to score {} against {}: {}", req.user_id, req.candidate_user_id, e);
            internal_error("Failed to score profiles", e)
        }
    }
}
