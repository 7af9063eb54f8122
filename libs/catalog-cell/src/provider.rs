use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CatalogError, ClinicProfile, ClinicService, InsurancePlan, OperatingHours};

/// Read-only view of the clinic directory. The booking core never mutates
/// catalog data; clinic and service management live in the directory service.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn clinic(&self, clinic_id: Uuid) -> Result<ClinicProfile, CatalogError>;

    async fn clinic_service(&self, clinic_service_id: Uuid)
        -> Result<ClinicService, CatalogError>;

    async fn clinic_services(&self, clinic_id: Uuid) -> Result<Vec<ClinicService>, CatalogError>;

    /// `None` means the clinic has not published hours; callers fall back to
    /// [`OperatingHours::default`].
    async fn operating_hours(&self, clinic_id: Uuid)
        -> Result<Option<OperatingHours>, CatalogError>;

    async fn accepted_insurance(&self, clinic_id: Uuid)
        -> Result<Vec<InsurancePlan>, CatalogError>;
}
