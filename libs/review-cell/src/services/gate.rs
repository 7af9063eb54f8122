// libs/review-cell/src/services/gate.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use booking_cell::models::BookingStatus;
use booking_cell::services::ledger::BookingLedger;
use shared_models::auth::{AuthUser, UserRole};

use crate::models::{Review, ReviewError, SubmitReviewRequest};

/// Admission control for reviews: only the patient of a completed booking may
/// review it, and only once.
pub struct ReviewGate {
    ledger: Arc<BookingLedger>,
    store: RwLock<ReviewStore>,
}

#[derive(Default)]
struct ReviewStore {
    by_id: HashMap<Uuid, Review>,
    by_booking: HashMap<Uuid, Uuid>,
}

impl ReviewGate {
    pub fn new(ledger: Arc<BookingLedger>) -> Self {
        Self {
            ledger,
            store: RwLock::new(ReviewStore::default()),
        }
    }

    pub async fn submit(
        &self,
        actor: &AuthUser,
        request: SubmitReviewRequest,
    ) -> Result<Review, ReviewError> {
        debug!(
            "Review submission for booking {} by {}",
            request.booking_id, actor.id
        );

        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::InvalidRating(request.rating));
        }

        let booking = self.ledger.get(request.booking_id).await?;

        let is_patient = actor.role == UserRole::Patient && actor.id == booking.patient_id;
        if !is_patient {
            warn!(
                "Actor {} is not the patient of booking {}",
                actor.id, booking.id
            );
            return Err(ReviewError::NotEligible(
                "Only the patient of the appointment may review it".to_string(),
            ));
        }

        if booking.status != BookingStatus::Completed {
            return Err(ReviewError::NotEligible(format!(
                "Appointment is {}, only completed appointments can be reviewed",
                booking.status
            )));
        }

        // Duplicate check and insert under one write lock, so two submissions
        // for the same booking resolve to exactly one review.
        let mut store = self.store.write().await;
        if store.by_booking.contains_key(&booking.id) {
            return Err(ReviewError::NotEligible(
                "Appointment has already been reviewed".to_string(),
            ));
        }

        let review = Review {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            clinic_id: booking.clinic_id,
            patient_id: booking.patient_id,
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };

        store.by_booking.insert(booking.id, review.id);
        store.by_id.insert(review.id, review.clone());
        drop(store);

        info!(
            "Review {} recorded for clinic {} (rating {})",
            review.id, review.clinic_id, review.rating
        );
        Ok(review)
    }

    /// A clinic's reviews, newest first.
    pub async fn list_for_clinic(&self, clinic_id: Uuid) -> Vec<Review> {
        let store = self.store.read().await;
        let mut reviews: Vec<Review> = store
            .by_id
            .values()
            .filter(|r| r.clinic_id == clinic_id)
            .cloned()
            .collect();
        drop(store);

        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        reviews
    }
}
