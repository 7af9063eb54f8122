// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{BookingError, CreateBookingRequest, SlotWindow, TransitionRequest};
use crate::BookingState;

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub clinic_service_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<BookingState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    // Patients book for themselves; admins may book on a patient's behalf.
    let is_patient = request.patient_id == user.id;
    if !is_patient && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to book for this patient".to_string(),
        ));
    }

    let booking = state
        .ledger
        .create(&user, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Appointment requested"
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let booking = state
        .ledger
        .get(booking_id)
        .await
        .map_err(map_booking_error)?;

    let involved = user.id == booking.patient_id || user.id == booking.clinic_id;
    if !involved && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this booking".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn transition_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = state
        .ledger
        .transition(&user, booking_id, request.status)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": format!("Booking is now {}", booking.status)
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let booking = state
        .ledger
        .cancel(&user, booking_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking cancelled"
    })))
}

#[axum::debug_handler]
pub async fn list_clinic_bookings(
    State(state): State<Arc<BookingState>>,
    Path(clinic_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    if user.id != clinic_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this clinic's bookings".to_string(),
        ));
    }

    let bookings = state.ledger.list_for_clinic(clinic_id).await;

    Ok(Json(json!({
        "success": true,
        "bookings": bookings
    })))
}

#[axum::debug_handler]
pub async fn list_patient_bookings(
    State(state): State<Arc<BookingState>>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    if user.id != patient_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this patient's bookings".to_string(),
        ));
    }

    let bookings = state.ledger.list_for_patient(patient_id).await;

    Ok(Json(json!({
        "success": true,
        "bookings": bookings
    })))
}

#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<SlotQuery>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let window = SlotWindow {
        from: query.from,
        to: query.to,
    };

    let slots = state
        .slots
        .available_slots(query.clinic_service_id, window)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "slots": slots
    })))
}

pub(crate) fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::NotFound => AppError::NotFound("Booking or catalog record not found".to_string()),
        BookingError::SlotUnavailable => {
            AppError::Conflict("Appointment slot no longer available".to_string())
        }
        BookingError::InvalidTime(msg) => AppError::BadRequest(msg),
        BookingError::InvalidRange(msg) => AppError::BadRequest(msg),
        BookingError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
        BookingError::Unauthorized => {
            AppError::Forbidden("Actor is not permitted to perform this operation".to_string())
        }
        BookingError::Timeout => AppError::Timeout("Directory service timed out".to_string()),
        BookingError::Catalog(msg) => AppError::ExternalService(msg),
    }
}
