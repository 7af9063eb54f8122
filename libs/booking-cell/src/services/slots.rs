// libs/booking-cell/src/services/slots.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use catalog_cell::models::{ClinicService, OperatingHours};
use catalog_cell::provider::CatalogProvider;

use crate::models::{AvailableSlot, BookingError, SlotWindow};
use crate::services::ledger::BookingLedger;

/// Derives bookable start times for a clinic service: candidates at the
/// service's duration granularity within operating hours, minus anything
/// intersecting a non-cancelled booking. Pure read; the same ledger state
/// always yields the same sequence.
pub struct SlotCalculator {
    catalog: Arc<dyn CatalogProvider>,
    ledger: Arc<BookingLedger>,
    upstream_timeout: Duration,
}

impl SlotCalculator {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        ledger: Arc<BookingLedger>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            ledger,
            upstream_timeout,
        }
    }

    pub async fn available_slots(
        &self,
        clinic_service_id: Uuid,
        window: SlotWindow,
    ) -> Result<Vec<AvailableSlot>, BookingError> {
        debug!(
            "Calculating slots for clinic service {} between {} and {}",
            clinic_service_id, window.from, window.to
        );

        self.validate_window(&window)?;

        let service = self.fetch_service(clinic_service_id).await?;
        let hours = self
            .fetch_hours(service.clinic_id)
            .await?
            .unwrap_or_default();

        let busy: Vec<_> = self
            .ledger
            .list_for_clinic(service.clinic_id)
            .await
            .into_iter()
            .filter(|b| b.status != crate::models::BookingStatus::Cancelled)
            .collect();

        let duration = ChronoDuration::minutes(service.duration_minutes as i64);
        let mut slots = Vec::new();

        let mut day = window.from.date_naive();
        let last_day = window.to.date_naive();
        while day <= last_day {
            let mut current = day.and_time(hours.open).and_utc();
            let day_close = day.and_time(hours.close).and_utc();

            while current + duration <= day_close {
                let slot_end = current + duration;

                if current >= window.from && slot_end <= window.to {
                    let taken = busy.iter().any(|b| b.overlaps(current, slot_end));
                    if !taken {
                        slots.push(AvailableSlot {
                            clinic_service_id: service.id,
                            start_time: current,
                            end_time: slot_end,
                            duration_minutes: service.duration_minutes,
                        });
                    }
                }

                current += duration;
            }

            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        debug!("Found {} available slots", slots.len());
        Ok(slots)
    }

    fn validate_window(&self, window: &SlotWindow) -> Result<(), BookingError> {
        if window.to <= window.from {
            return Err(BookingError::InvalidRange(
                "Window end must be after window start".to_string(),
            ));
        }
        if window.from < Utc::now() {
            return Err(BookingError::InvalidRange(
                "Window must not start in the past".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_service(&self, clinic_service_id: Uuid) -> Result<ClinicService, BookingError> {
        match tokio::time::timeout(
            self.upstream_timeout,
            self.catalog.clinic_service(clinic_service_id),
        )
        .await
        {
            Ok(result) => result.map_err(BookingError::from),
            Err(_) => {
                warn!("Catalog lookup for service {} timed out", clinic_service_id);
                Err(BookingError::Timeout)
            }
        }
    }

    async fn fetch_hours(&self, clinic_id: Uuid) -> Result<Option<OperatingHours>, BookingError> {
        match tokio::time::timeout(self.upstream_timeout, self.catalog.operating_hours(clinic_id))
            .await
        {
            Ok(result) => result.map_err(BookingError::from),
            Err(_) => {
                warn!("Operating hours lookup for clinic {} timed out", clinic_id);
                Err(BookingError::Timeout)
            }
        }
    }
}
