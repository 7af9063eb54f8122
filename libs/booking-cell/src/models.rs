// libs/booking-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use catalog_cell::models::CatalogError;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// A scheduled appointment between a patient and a clinic's service.
///
/// `clinic_id` and `duration_minutes` are captured from the catalog at
/// creation time so overlap checks never go back to the directory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub clinic_service_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_start: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn appointment_end(&self) -> DateTime<Utc> {
        self.appointment_start + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    /// Half-open interval test: [s1, e1) and [s2, e2) overlap iff
    /// s1 < e2 && s2 < e1.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.appointment_start < end && start < self.appointment_end()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Completed and cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Only pending and confirmed bookings hold their slot on the calendar.
    pub fn blocks_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub patient_id: Uuid,
    pub clinic_service_id: Uuid,
    pub appointment_start: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: BookingStatus,
}

/// Forward-looking window slots are calculated over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// A candidate appointment start time not conflicting with existing bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableSlot {
    pub clinic_service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Appointment slot not available")]
    SlotUnavailable,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Invalid slot window: {0}")]
    InvalidRange(String),

    #[error("Booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Actor is not permitted to perform this operation")]
    Unauthorized,

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl From<CatalogError> for BookingError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => BookingError::NotFound,
            CatalogError::Timeout => BookingError::Timeout,
            CatalogError::Invalid(msg) => BookingError::Catalog(msg),
            CatalogError::Upstream(msg) => BookingError::Catalog(msg),
        }
    }
}
