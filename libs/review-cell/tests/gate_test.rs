use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{Duration as ChronoDuration, Utc};
use uuid::Uuid;

use booking_cell::models::{Booking, BookingStatus, CreateBookingRequest};
use booking_cell::services::ledger::BookingLedger;
use catalog_cell::memory::StaticCatalog;
use catalog_cell::models::{ClinicProfile, ClinicService, InsurancePlan};
use review_cell::models::{ReviewError, SubmitReviewRequest};
use review_cell::services::gate::ReviewGate;
use review_cell::services::queries::ClinicQueries;
use shared_utils::test_utils::TestUser;

struct ReviewFixture {
    catalog: Arc<StaticCatalog>,
    ledger: Arc<BookingLedger>,
    gate: Arc<ReviewGate>,
    queries: ClinicQueries,
    service: ClinicService,
    clinic: TestUser,
}

fn fixture() -> ReviewFixture {
    let catalog = Arc::new(StaticCatalog::new());
    let clinic_id = Uuid::new_v4();
    let service = ClinicService {
        id: Uuid::new_v4(),
        clinic_id,
        service_id: Uuid::new_v4(),
        name: "General consultation".to_string(),
        price: 80.0,
        duration_minutes: 30,
    };
    catalog.insert_service(service.clone()).unwrap();

    let timeout = Duration::from_millis(500);
    let ledger = Arc::new(BookingLedger::new(catalog.clone(), timeout));
    let gate = Arc::new(ReviewGate::new(ledger.clone()));
    let queries = ClinicQueries::new(catalog.clone(), gate.clone(), timeout);

    ReviewFixture {
        catalog,
        ledger,
        gate,
        queries,
        service,
        clinic: TestUser::clinic_with_id(clinic_id, "clinic@example.com"),
    }
}

impl ReviewFixture {
    async fn booking_at(&self, patient: &TestUser, hours_ahead: i64) -> Booking {
        self.ledger
            .create(
                &patient.to_auth_user(),
                CreateBookingRequest {
                    patient_id: patient.id,
                    clinic_service_id: self.service.id,
                    appointment_start: Utc::now() + ChronoDuration::hours(hours_ahead),
                    notes: None,
                },
            )
            .await
            .unwrap()
    }

    async fn completed_booking(&self, patient: &TestUser, hours_ahead: i64) -> Booking {
        let booking = self.booking_at(patient, hours_ahead).await;
        let clinic = self.clinic.to_auth_user();
        self.ledger
            .transition(&clinic, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        self.ledger
            .transition(&clinic, booking.id, BookingStatus::Completed)
            .await
            .unwrap()
    }
}

fn review_of(booking: &Booking, rating: i32) -> SubmitReviewRequest {
    SubmitReviewRequest {
        booking_id: booking.id,
        rating,
        comment: None,
    }
}

#[tokio::test]
async fn rejects_out_of_bounds_ratings() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");
    let booking = fx.completed_booking(&patient, 24).await;

    for rating in [0, 6, -1] {
        let result = fx
            .gate
            .submit(&patient.to_auth_user(), review_of(&booking, rating))
            .await;
        assert_matches!(result, Err(ReviewError::InvalidRating(_)));
    }
}

#[tokio::test]
async fn accepts_boundary_ratings() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");

    let lowest = fx.completed_booking(&patient, 24).await;
    let highest = fx.completed_booking(&patient, 48).await;

    let review = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&lowest, 1))
        .await
        .unwrap();
    assert_eq!(review.rating, 1);
    assert_eq!(review.clinic_id, fx.service.clinic_id);

    let review = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&highest, 5))
        .await
        .unwrap();
    assert_eq!(review.rating, 5);
}

#[tokio::test]
async fn only_completed_appointments_can_be_reviewed() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");

    let booking = fx.booking_at(&patient, 24).await;
    let result = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&booking, 4))
        .await;
    assert_matches!(result, Err(ReviewError::NotEligible(_)));

    fx.ledger
        .transition(&fx.clinic.to_auth_user(), booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    let result = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&booking, 4))
        .await;
    assert_matches!(result, Err(ReviewError::NotEligible(_)));

    fx.ledger
        .transition(&fx.clinic.to_auth_user(), booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    fx.gate
        .submit(&patient.to_auth_user(), review_of(&booking, 4))
        .await
        .unwrap();
}

#[tokio::test]
async fn each_appointment_is_reviewed_once() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");
    let booking = fx.completed_booking(&patient, 24).await;

    fx.gate
        .submit(&patient.to_auth_user(), review_of(&booking, 5))
        .await
        .unwrap();

    let result = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&booking, 3))
        .await;
    assert_matches!(result, Err(ReviewError::NotEligible(_)));
}

#[tokio::test]
async fn only_the_patient_of_the_appointment_may_review() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");
    let stranger = TestUser::patient("stranger@example.com");
    let booking = fx.completed_booking(&patient, 24).await;

    let result = fx
        .gate
        .submit(&stranger.to_auth_user(), review_of(&booking, 4))
        .await;
    assert_matches!(result, Err(ReviewError::NotEligible(_)));

    let result = fx
        .gate
        .submit(&fx.clinic.to_auth_user(), review_of(&booking, 4))
        .await;
    assert_matches!(result, Err(ReviewError::NotEligible(_)));
}

#[tokio::test]
async fn unknown_booking_is_reported_missing() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");

    let result = fx
        .gate
        .submit(
            &patient.to_auth_user(),
            SubmitReviewRequest {
                booking_id: Uuid::new_v4(),
                rating: 4,
                comment: None,
            },
        )
        .await;
    assert_matches!(result, Err(ReviewError::BookingNotFound));
}

#[tokio::test]
async fn rating_average_tracks_submissions() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");

    let summary = fx.queries.clinic_rating(fx.service.clinic_id).await;
    assert_eq!(summary.average, None);
    assert_eq!(summary.count, 0);

    let first = fx.completed_booking(&patient, 24).await;
    fx.gate
        .submit(&patient.to_auth_user(), review_of(&first, 4))
        .await
        .unwrap();

    let summary = fx.queries.clinic_rating(fx.service.clinic_id).await;
    assert_eq!(summary.average, Some(4.0));
    assert_eq!(summary.count, 1);

    let second = fx.completed_booking(&patient, 48).await;
    fx.gate
        .submit(&patient.to_auth_user(), review_of(&second, 5))
        .await
        .unwrap();

    let summary = fx.queries.clinic_rating(fx.service.clinic_id).await;
    assert_eq!(summary.average, Some(4.5));
    assert_eq!(summary.count, 2);
}

#[tokio::test]
async fn clinic_reviews_are_newest_first() {
    let fx = fixture();
    let patient = TestUser::patient("patient@example.com");

    let first = fx.completed_booking(&patient, 24).await;
    let second = fx.completed_booking(&patient, 48).await;

    let early = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&first, 3))
        .await
        .unwrap();
    let late = fx
        .gate
        .submit(&patient.to_auth_user(), review_of(&second, 5))
        .await
        .unwrap();

    let reviews = fx.gate.list_for_clinic(fx.service.clinic_id).await;
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].created_at >= reviews[1].created_at);
    assert!(reviews.iter().any(|r| r.id == early.id));
    assert!(reviews.iter().any(|r| r.id == late.id));
}

#[tokio::test]
async fn clinic_detail_composes_directory_and_ratings() {
    let fx = fixture();
    let clinic_id = fx.service.clinic_id;

    fx.catalog.insert_clinic(ClinicProfile {
        id: clinic_id,
        name: "Riverside Clinic".to_string(),
        specialty: "General practice".to_string(),
        description: None,
        contact: "+31 20 123 4567".to_string(),
        email: "info@riverside.example".to_string(),
        street: "Kade 12".to_string(),
        city: "Amsterdam".to_string(),
        image_url: None,
    });
    fx.catalog.insert_insurance(InsurancePlan {
        id: Uuid::new_v4(),
        name: "BasicCare".to_string(),
        clinic_id,
    });

    let patient = TestUser::patient("patient@example.com");
    let booking = fx.completed_booking(&patient, 24).await;
    fx.gate
        .submit(&patient.to_auth_user(), review_of(&booking, 5))
        .await
        .unwrap();

    let detail = fx.queries.clinic_detail(clinic_id).await.unwrap();
    assert_eq!(detail.clinic.name, "Riverside Clinic");
    assert_eq!(detail.services.len(), 1);
    assert_eq!(detail.accepted_insurance.len(), 1);
    assert_eq!(detail.rating.average, Some(5.0));
    assert_eq!(detail.rating.count, 1);
}

#[tokio::test]
async fn clinic_detail_for_unknown_clinic_is_missing() {
    let fx = fixture();

    let result = fx.queries.clinic_detail(Uuid::new_v4()).await;
    assert_matches!(result, Err(ReviewError::ClinicNotFound));
}
