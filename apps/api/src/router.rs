use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use booking_cell::BookingState;
use review_cell::router::review_routes;
use review_cell::ReviewState;

pub fn create_router(booking_state: Arc<BookingState>, review_state: Arc<ReviewState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Medibook API is running!" }))
        .nest("/bookings", booking_routes(booking_state))
        .nest("/reviews", review_routes(review_state))
}
