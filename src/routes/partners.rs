use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{PartnerResult, PartnerSearchQuery, PartnerSearchResponse};
use crate::routes::{internal_error, validation_error, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/partners/search", web::get().to(search_partners));
}

/// Partner search endpoint
///
/// GET /api/v1/partners/search?userId={userId}&sport={sport}
///
/// Lists other active players, optionally only those practicing `sport`.
/// At most 20 are returned; `totalResults` counts every match.
async fn search_partners(state: web::Data<AppState>, query: web::Query<PartnerSearchQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let query = query.into_inner();
    let sport = query.sport.filter(|s| !s.trim().is_empty());

    match state.recommender.search(&query.user_id, sport.as_deref()).await {
        Ok(search) => HttpResponse::Ok().json(PartnerSearchResponse {
            user_id: query.user_id,
            sport,
            total_results: search.total_results,
            results: search.results.into_iter().map(PartnerResult::from).collect(),
        }),
        Err(e) => {
            tracing::error!("Partner search failed for {}: {}", query.user_id, e);
            internal_error("Partner search failed", e)
        }
    }
}
