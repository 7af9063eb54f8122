// libs/review-cell/src/services/queries.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::try_join;
use tracing::{debug, warn};
use uuid::Uuid;

use catalog_cell::models::CatalogError;
use catalog_cell::provider::CatalogProvider;

use crate::models::{ClinicDetail, RatingSummary, Review, ReviewError};
use crate::services::gate::ReviewGate;

/// Read-side composition over the catalog and the review store. Never holds
/// state of its own.
pub struct ClinicQueries {
    catalog: Arc<dyn CatalogProvider>,
    gate: Arc<ReviewGate>,
    upstream_timeout: Duration,
}

impl ClinicQueries {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        gate: Arc<ReviewGate>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            gate,
            upstream_timeout,
        }
    }

    pub async fn clinic_reviews(&self, clinic_id: Uuid) -> Vec<Review> {
        self.gate.list_for_clinic(clinic_id).await
    }

    /// Average rating rounded half-up to one decimal place. The sum is kept
    /// in tenths as an integer so 4.45 rounds to 4.5 rather than drifting.
    pub async fn clinic_rating(&self, clinic_id: Uuid) -> RatingSummary {
        let reviews = self.gate.list_for_clinic(clinic_id).await;
        summarize(&reviews)
    }

    /// One-call clinic page: profile, services, accepted insurance and the
    /// rating summary, fetched concurrently.
    pub async fn clinic_detail(&self, clinic_id: Uuid) -> Result<ClinicDetail, ReviewError> {
        debug!("Composing clinic detail for {}", clinic_id);

        let (clinic, services, accepted_insurance) = try_join!(
            self.fetch(self.catalog.clinic(clinic_id)),
            self.fetch(self.catalog.clinic_services(clinic_id)),
            self.fetch(self.catalog.accepted_insurance(clinic_id)),
        )?;

        let rating = self.clinic_rating(clinic_id).await;

        Ok(ClinicDetail {
            clinic,
            services,
            accepted_insurance,
            rating,
        })
    }

    async fn fetch<T>(
        &self,
        fut: impl Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, ReviewError> {
        match tokio::time::timeout(self.upstream_timeout, fut).await {
            Ok(result) => result.map_err(ReviewError::from),
            Err(_) => {
                warn!("Directory request timed out");
                Err(ReviewError::Timeout)
            }
        }
    }
}

fn summarize(reviews: &[Review]) -> RatingSummary {
    if reviews.is_empty() {
        return RatingSummary {
            average: None,
            count: 0,
        };
    }

    let tenths: i64 = reviews.iter().map(|r| r.rating as i64 * 10).sum();
    let average = (tenths as f64 / reviews.len() as f64).round() / 10.0;

    RatingSummary {
        average: Some(average),
        count: reviews.len(),
    }
}
