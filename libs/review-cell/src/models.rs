// libs/review-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use booking_cell::models::BookingError;
use catalog_cell::models::{CatalogError, ClinicProfile, ClinicService, InsurancePlan};

// ==============================================================================
// CORE REVIEW MODELS
// ==============================================================================

/// A patient's rating of a completed appointment.
///
/// `clinic_id` and `patient_id` are copied from the booking at submission
/// time so clinic pages never need a join back into the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Aggregate rating for a clinic. `average` is `None` until the first
/// review lands; it is never reported as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: usize,
}

/// Everything a clinic page needs in one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicDetail {
    pub clinic: ClinicProfile,
    pub services: Vec<ClinicService>,
    pub accepted_insurance: Vec<InsurancePlan>,
    pub rating: RatingSummary,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReviewError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("Not eligible to review: {0}")]
    NotEligible(String),

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Clinic not found")]
    ClinicNotFound,

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<CatalogError> for ReviewError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => ReviewError::ClinicNotFound,
            CatalogError::Timeout => ReviewError::Timeout,
            CatalogError::Invalid(msg) => ReviewError::Upstream(msg),
            CatalogError::Upstream(msg) => ReviewError::Upstream(msg),
        }
    }
}

impl From<BookingError> for ReviewError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::NotFound => ReviewError::BookingNotFound,
            BookingError::Timeout => ReviewError::Timeout,
            other => ReviewError::Upstream(other.to_string()),
        }
    }
}
