// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::BookingState;

pub fn booking_routes(state: Arc<BookingState>) -> Router {
    // Every booking operation requires an authenticated caller.
    let protected_routes = Router::new()
        .route("/", post(handlers::create_booking))
        .route("/slots", get(handlers::available_slots))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/transition", post(handlers::transition_booking))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/clinics/{clinic_id}", get(handlers::list_clinic_bookings))
        .route("/patients/{patient_id}", get(handlers::list_patient_bookings))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
