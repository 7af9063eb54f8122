// libs/catalog-cell/src/client.rs
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{CatalogError, ClinicProfile, ClinicService, InsurancePlan, OperatingHours};
use crate::provider::CatalogProvider;

/// REST client for the clinic directory service. Every request carries the
/// configured timeout; a timeout surfaces as [`CatalogError::Timeout`] and is
/// never retried here.
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpCatalog {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.directory_url.clone(),
            api_key: config.directory_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers
    }

    async fn request<T>(&self, method: Method, path: &str) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making directory request to {}", url);

        let response = self
            .client
            .request(method, &url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout
                } else {
                    CatalogError::Upstream(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Directory API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::NOT_FOUND => CatalogError::NotFound,
                StatusCode::GATEWAY_TIMEOUT => CatalogError::Timeout,
                _ => CatalogError::Upstream(format!("{}: {}", status, error_text)),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Upstream(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn clinic(&self, clinic_id: Uuid) -> Result<ClinicProfile, CatalogError> {
        let path = format!("/directory/v1/clinics/{}", clinic_id);
        self.request(Method::GET, &path).await
    }

    async fn clinic_service(
        &self,
        clinic_service_id: Uuid,
    ) -> Result<ClinicService, CatalogError> {
        let path = format!("/directory/v1/clinic-services/{}", clinic_service_id);
        let service: ClinicService = self.request(Method::GET, &path).await?;
        service.validate()?;
        Ok(service)
    }

    async fn clinic_services(&self, clinic_id: Uuid) -> Result<Vec<ClinicService>, CatalogError> {
        let path = format!("/directory/v1/clinics/{}/services", clinic_id);
        let services: Vec<ClinicService> = self.request(Method::GET, &path).await?;
        for service in &services {
            service.validate()?;
        }
        Ok(services)
    }

    async fn operating_hours(
        &self,
        clinic_id: Uuid,
    ) -> Result<Option<OperatingHours>, CatalogError> {
        let path = format!("/directory/v1/clinics/{}/hours", clinic_id);
        match self.request::<OperatingHours>(Method::GET, &path).await {
            Ok(hours) => Ok(Some(hours)),
            Err(CatalogError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn accepted_insurance(
        &self,
        clinic_id: Uuid,
    ) -> Result<Vec<InsurancePlan>, CatalogError> {
        let path = format!("/directory/v1/clinics/{}/insurance", clinic_id);
        self.request(Method::GET, &path).await
    }
}
