// libs/catalog-cell/src/memory.rs
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CatalogError, ClinicProfile, ClinicService, InsurancePlan, OperatingHours};
use crate::provider::CatalogProvider;

/// In-memory catalog used in tests and local runs without a directory
/// service. Seeded up front, read-only afterwards from the core's view.
#[derive(Default)]
pub struct StaticCatalog {
    inner: RwLock<CatalogData>,
}

#[derive(Default)]
struct CatalogData {
    clinics: HashMap<Uuid, ClinicProfile>,
    services: HashMap<Uuid, ClinicService>,
    hours: HashMap<Uuid, OperatingHours>,
    insurance: HashMap<Uuid, Vec<InsurancePlan>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_clinic(&self, clinic: ClinicProfile) {
        let mut data = self.inner.write().expect("catalog lock poisoned");
        data.clinics.insert(clinic.id, clinic);
    }

    pub fn insert_service(&self, service: ClinicService) -> Result<(), CatalogError> {
        service.validate()?;
        let mut data = self.inner.write().expect("catalog lock poisoned");
        data.services.insert(service.id, service);
        Ok(())
    }

    pub fn set_hours(&self, clinic_id: Uuid, hours: OperatingHours) {
        let mut data = self.inner.write().expect("catalog lock poisoned");
        data.hours.insert(clinic_id, hours);
    }

    pub fn insert_insurance(&self, plan: InsurancePlan) {
        let mut data = self.inner.write().expect("catalog lock poisoned");
        data.insurance.entry(plan.clinic_id).or_default().push(plan);
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn clinic(&self, clinic_id: Uuid) -> Result<ClinicProfile, CatalogError> {
        let data = self.inner.read().expect("catalog lock poisoned");
        data.clinics.get(&clinic_id).cloned().ok_or(CatalogError::NotFound)
    }

    async fn clinic_service(
        &self,
        clinic_service_id: Uuid,
    ) -> Result<ClinicService, CatalogError> {
        let data = self.inner.read().expect("catalog lock poisoned");
        data.services
            .get(&clinic_service_id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    async fn clinic_services(&self, clinic_id: Uuid) -> Result<Vec<ClinicService>, CatalogError> {
        let data = self.inner.read().expect("catalog lock poisoned");
        let mut services: Vec<ClinicService> = data
            .services
            .values()
            .filter(|s| s.clinic_id == clinic_id)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn operating_hours(
        &self,
        clinic_id: Uuid,
    ) -> Result<Option<OperatingHours>, CatalogError> {
        let data = self.inner.read().expect("catalog lock poisoned");
        Ok(data.hours.get(&clinic_id).copied())
    }

    async fn accepted_insurance(
        &self,
        clinic_id: Uuid,
    ) -> Result<Vec<InsurancePlan>, CatalogError> {
        let data = self.inner.read().expect("catalog lock poisoned");
        Ok(data.insurance.get(&clinic_id).cloned().unwrap_or_default())
    }
}
