// libs/catalog-cell/src/models.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinic metadata as published by the directory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicProfile {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub description: Option<String>,
    pub contact: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub image_url: Option<String>,
}

/// A generic service offered by a specific clinic at a clinic-specific price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicService {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_minutes: i32,
}

impl ClinicService {
    /// Directory records are trusted but still checked on ingest; price edits
    /// happen in the directory service, never here.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.duration_minutes <= 0 {
            return Err(CatalogError::Invalid(format!(
                "clinic service {} has non-positive duration",
                self.id
            )));
        }
        if self.price < 0.0 {
            return Err(CatalogError::Invalid(format!(
                "clinic service {} has negative price",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: Uuid,
    pub name: String,
    pub clinic_id: Uuid,
}

/// Daily booking window for a clinic, local times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for OperatingHours {
    fn default() -> Self {
        // Business-hours fallback for clinics that never published hours.
        Self {
            open: NaiveTime::from_hms_opt(8, 0, 0).expect("valid constant time"),
            close: NaiveTime::from_hms_opt(18, 0, 0).expect("valid constant time"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog record not found")]
    NotFound,

    #[error("Catalog request timed out")]
    Timeout,

    #[error("Invalid catalog record: {0}")]
    Invalid(String),

    #[error("Directory service error: {0}")]
    Upstream(String),
}
