// libs/review-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{ReviewError, SubmitReviewRequest};
use crate::ReviewState;

#[axum::debug_handler]
pub async fn submit_review(
    State(state): State<Arc<ReviewState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let review = state
        .gate
        .submit(&user, request)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!({
        "success": true,
        "review": review,
        "message": "Review recorded"
    })))
}

#[axum::debug_handler]
pub async fn list_clinic_reviews(
    State(state): State<Arc<ReviewState>>,
    Path(clinic_id): Path<Uuid>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let reviews = state.queries.clinic_reviews(clinic_id).await;

    Ok(Json(json!({
        "success": true,
        "reviews": reviews
    })))
}

#[axum::debug_handler]
pub async fn clinic_rating(
    State(state): State<Arc<ReviewState>>,
    Path(clinic_id): Path<Uuid>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let rating = state.queries.clinic_rating(clinic_id).await;

    Ok(Json(json!({
        "success": true,
        "rating": rating
    })))
}

#[axum::debug_handler]
pub async fn clinic_detail(
    State(state): State<Arc<ReviewState>>,
    Path(clinic_id): Path<Uuid>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let detail = state
        .queries
        .clinic_detail(clinic_id)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!({
        "success": true,
        "clinic": detail
    })))
}

pub(crate) fn map_review_error(e: ReviewError) -> AppError {
    match e {
        ReviewError::InvalidRating(_) => AppError::BadRequest(e.to_string()),
        ReviewError::NotEligible(msg) => AppError::Forbidden(msg),
        ReviewError::BookingNotFound => AppError::NotFound("Booking not found".to_string()),
        ReviewError::ClinicNotFound => AppError::NotFound("Clinic not found".to_string()),
        ReviewError::Timeout => AppError::Timeout("Directory service timed out".to_string()),
        ReviewError::Upstream(msg) => AppError::ExternalService(msg),
    }
}
