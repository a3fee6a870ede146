use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{Profile, SuccessResponse, UpsertProfileRequest};
use crate::routes::{internal_error, validation_error, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::put().to(upsert_profile));
}

/// Create or update a profile
///
/// PUT /api/v1/profiles
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "country": "TN",
///   "city": "Tunis",
///   "age": 27,
///   "sports": ["football", "running"],
///   "availability": "weekend mornings",
///   "gender": "male"
/// }
/// ```
async fn upsert_profile(state: web::Data<AppState>, req: web::Json<UpsertProfileRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let profile = Profile::from(req.into_inner());

    match state.recommender.profiles().upsert_profile(&profile).await {
        Ok(()) => {
            tracing::debug!("Stored profile {}", profile.user_id);
            HttpResponse::Ok().json(SuccessResponse { success: true })
        }
        Err(e) => {
            tracing::error!("Failed to store profile {}: {}", profile.user_id, e);
            internal_error("Failed to store profile", e)
        }
    }
}
