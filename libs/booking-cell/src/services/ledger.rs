// libs/booking-cell/src/services/ledger.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use catalog_cell::models::ClinicService;
use catalog_cell::provider::CatalogProvider;
use shared_models::auth::{AuthUser, UserRole};

use crate::models::{Booking, BookingError, BookingStatus, CreateBookingRequest};
use crate::services::lifecycle::BookingLifecycle;

/// Owner of all appointment records. One calendar per clinic, each behind its
/// own mutex: creates and transitions for a clinic are serialized against each
/// other, while clinics never block one another.
pub struct BookingLedger {
    catalog: Arc<dyn CatalogProvider>,
    lifecycle: BookingLifecycle,
    upstream_timeout: Duration,
    calendars: RwLock<HashMap<Uuid, Arc<Mutex<ClinicCalendar>>>>,
    clinic_of: RwLock<HashMap<Uuid, Uuid>>,
}

#[derive(Default)]
struct ClinicCalendar {
    bookings: HashMap<Uuid, Booking>,
}

impl BookingLedger {
    pub fn new(catalog: Arc<dyn CatalogProvider>, upstream_timeout: Duration) -> Self {
        Self {
            catalog,
            lifecycle: BookingLifecycle::new(),
            upstream_timeout,
            calendars: RwLock::new(HashMap::new()),
            clinic_of: RwLock::new(HashMap::new()),
        }
    }

    /// Book an appointment. The overlap check and the insert happen inside the
    /// clinic's critical section with no await point in between, so two
    /// concurrent requests for the same clinic resolve to exactly one success.
    pub async fn create(
        &self,
        actor: &AuthUser,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        debug!(
            "Creating booking for patient {} on clinic service {}",
            request.patient_id, request.clinic_service_id
        );

        let is_owner = actor.role == UserRole::Patient && actor.id == request.patient_id;
        if !is_owner && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }

        let service = self.fetch_service(request.clinic_service_id).await?;

        let now = Utc::now();
        if request.appointment_start <= now {
            return Err(BookingError::InvalidTime(
                "Appointment must be scheduled for a future time".to_string(),
            ));
        }

        let end = request.appointment_start
            + chrono::Duration::minutes(service.duration_minutes as i64);

        let calendar = self.calendar(service.clinic_id).await;
        let mut guard = calendar.lock().await;

        let conflict = guard
            .bookings
            .values()
            .any(|b| b.status.blocks_slot() && b.overlaps(request.appointment_start, end));
        if conflict {
            warn!(
                "Booking conflict for clinic {} at {}",
                service.clinic_id, request.appointment_start
            );
            return Err(BookingError::SlotUnavailable);
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            clinic_id: service.clinic_id,
            clinic_service_id: service.id,
            patient_id: request.patient_id,
            appointment_start: request.appointment_start,
            duration_minutes: service.duration_minutes,
            status: BookingStatus::Pending,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        guard.bookings.insert(booking.id, booking.clone());
        drop(guard);

        self.clinic_of
            .write()
            .await
            .insert(booking.id, booking.clinic_id);

        info!(
            "Booking {} created for clinic {} at {}",
            booking.id, booking.clinic_id, booking.appointment_start
        );
        Ok(booking)
    }

    /// Move a booking through the state machine. Structural validity is
    /// checked before actor permission so a terminal booking reports
    /// `InvalidTransition` no matter who asks.
    pub async fn transition(
        &self,
        actor: &AuthUser,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> Result<Booking, BookingError> {
        debug!("Transitioning booking {} to {}", booking_id, target);

        let calendar = self.calendar_of_booking(booking_id).await?;
        let mut guard = calendar.lock().await;

        let booking = guard
            .bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::NotFound)?;

        self.lifecycle.validate_transition(booking.status, target)?;
        self.lifecycle.authorize(actor, booking, target)?;

        booking.status = target;
        booking.updated_at = Utc::now();

        info!("Booking {} moved to {}", booking_id, target);
        Ok(booking.clone())
    }

    /// Cancel from pending or confirmed, by the owning patient or clinic.
    pub async fn cancel(&self, actor: &AuthUser, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.transition(actor, booking_id, BookingStatus::Cancelled).await
    }

    pub async fn get(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let calendar = self.calendar_of_booking(booking_id).await?;
        let guard = calendar.lock().await;
        guard
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or(BookingError::NotFound)
    }

    /// All bookings of a clinic, ordered by appointment start ascending.
    pub async fn list_for_clinic(&self, clinic_id: Uuid) -> Vec<Booking> {
        let calendar = {
            let calendars = self.calendars.read().await;
            calendars.get(&clinic_id).cloned()
        };

        let Some(calendar) = calendar else {
            return Vec::new();
        };

        let guard = calendar.lock().await;
        let mut bookings: Vec<Booking> = guard.bookings.values().cloned().collect();
        drop(guard);

        sort_schedule(&mut bookings);
        bookings
    }

    /// All bookings of a patient across clinics, ordered by appointment start.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> Vec<Booking> {
        let calendars: Vec<Arc<Mutex<ClinicCalendar>>> = {
            let map = self.calendars.read().await;
            map.values().cloned().collect()
        };

        let mut bookings = Vec::new();
        for calendar in calendars {
            let guard = calendar.lock().await;
            bookings.extend(
                guard
                    .bookings
                    .values()
                    .filter(|b| b.patient_id == patient_id)
                    .cloned(),
            );
        }

        sort_schedule(&mut bookings);
        bookings
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

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

    async fn calendar(&self, clinic_id: Uuid) -> Arc<Mutex<ClinicCalendar>> {
        {
            let calendars = self.calendars.read().await;
            if let Some(calendar) = calendars.get(&clinic_id) {
                return Arc::clone(calendar);
            }
        }

        let mut calendars = self.calendars.write().await;
        Arc::clone(
            calendars
                .entry(clinic_id)
                .or_insert_with(|| Arc::new(Mutex::new(ClinicCalendar::default()))),
        )
    }

    async fn calendar_of_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Arc<Mutex<ClinicCalendar>>, BookingError> {
        let clinic_id = {
            let clinic_of = self.clinic_of.read().await;
            clinic_of.get(&booking_id).copied()
        }
        .ok_or(BookingError::NotFound)?;

        let calendars = self.calendars.read().await;
        calendars
            .get(&clinic_id)
            .cloned()
            .ok_or(BookingError::NotFound)
    }
}

fn sort_schedule(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        a.appointment_start
            .cmp(&b.appointment_start)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}
