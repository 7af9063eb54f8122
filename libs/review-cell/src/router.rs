// libs/review-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::ReviewState;

pub fn review_routes(state: Arc<ReviewState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::submit_review))
        .route("/clinics/{clinic_id}", get(handlers::list_clinic_reviews))
        .route("/clinics/{clinic_id}/rating", get(handlers::clinic_rating))
        .route("/clinics/{clinic_id}/detail", get(handlers::clinic_detail))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
