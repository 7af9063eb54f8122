// libs/booking-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::auth::{AuthUser, UserRole};

use crate::models::{Booking, BookingError, BookingStatus};

/// The booking state machine and the actor rules attached to it.
///
/// pending -> confirmed | cancelled
/// confirmed -> completed | cancelled
/// completed / cancelled -> (terminal)
pub struct BookingLifecycle;

impl BookingLifecycle {
    pub fn new() -> Self {
        Self
    }

    pub fn valid_transitions(&self, current: BookingStatus) -> &'static [BookingStatus] {
        match current {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => &[BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Completed => &[],
            BookingStatus::Cancelled => &[],
        }
    }

    pub fn validate_transition(
        &self,
        current: BookingStatus,
        target: BookingStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition from {} to {}", current, target);

        if !self.valid_transitions(current).contains(&target) {
            warn!("Invalid status transition attempted: {} -> {}", current, target);
            return Err(BookingError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        Ok(())
    }

    /// Who may drive which transition:
    /// - confirm and complete belong to the owning clinic;
    /// - cancel belongs to the owning patient or the owning clinic;
    /// - admins may perform any structurally valid transition.
    pub fn authorize(
        &self,
        actor: &AuthUser,
        booking: &Booking,
        target: BookingStatus,
    ) -> Result<(), BookingError> {
        if actor.is_admin() {
            return Ok(());
        }

        let permitted = match target {
            BookingStatus::Confirmed | BookingStatus::Completed => {
                actor.role == UserRole::Clinic && actor.id == booking.clinic_id
            }
            BookingStatus::Cancelled => {
                (actor.role == UserRole::Clinic && actor.id == booking.clinic_id)
                    || (actor.role == UserRole::Patient && actor.id == booking.patient_id)
            }
            // Nothing transitions back to pending.
            BookingStatus::Pending => false,
        };

        if !permitted {
            warn!(
                "Actor {} ({}) not permitted to move booking {} to {}",
                actor.id, actor.role, booking.id, target
            );
            return Err(BookingError::Unauthorized);
        }

        Ok(())
    }
}

impl Default for BookingLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
