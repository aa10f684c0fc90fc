use std::sync::{Arc, Mutex};

use anyhow::bail;
use tour_payments::broker::publisher::EventPublisher;
use tour_payments::domain::booking::{Booking, BookingStatus};
use tour_payments::domain::event::PaymentCompletedEvent;
use tour_payments::service::payment_intake::{IntakeError, PaymentIntakeService, PaymentRequest};
use tour_payments::store::memory::MemoryStore;

#[derive(Clone, Default)]
struct RecordingPublisher {
    events: Arc<Mutex<Vec<PaymentCompletedEvent>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingPublisher {
    fn published(&self) -> Vec<PaymentCompletedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait::async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_payment_completed(&self, event: &PaymentCompletedEvent) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() {
            bail!("broker unreachable");
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn service() -> (
    PaymentIntakeService<MemoryStore, RecordingPublisher>,
    MemoryStore,
    RecordingPublisher,
) {
    let store = MemoryStore::new();
    let publisher = RecordingPublisher::default();
    let intake = PaymentIntakeService {
        store: store.clone(),
        publisher: publisher.clone(),
    };
    (intake, store, publisher)
}

#[tokio::test]
async fn accepts_valid_payment_and_publishes_event() {
    let (intake, store, publisher) = service();
    store.insert_booking(Booking::pending(42, 500.0));

    let accepted = intake
        .process_payment(&PaymentRequest {
            booking_id: 42,
            payment_ref: "R1".to_string(),
            amount: 500.0,
        })
        .await
        .unwrap();

    assert_eq!(accepted.booking_id, 42);
    assert_eq!(accepted.status, BookingStatus::Pending);
    assert!(accepted.message.contains("pending"));

    let events = publisher.published();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].booking_id, 42);
    assert_eq!(events[0].payment_ref, "R1");
    assert!(events[0].paid_at.is_some());

    // Intake never mutates the stores; the consumer owns the transition.
    assert_eq!(store.booking(42).unwrap().status, BookingStatus::Pending);
    assert_eq!(store.revenue_count(), 0);
}

#[tokio::test]
async fn rejects_unknown_booking() {
    let (intake, _store, publisher) = service();

    let err = intake
        .process_payment(&PaymentRequest {
            booking_id: 99,
            payment_ref: "R1".to_string(),
            amount: 500.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::BookingNotFound(99)));
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn rejects_already_processed_booking() {
    let (intake, store, publisher) = service();
    let mut booking = Booking::pending(42, 500.0);
    booking.mark_paid("R0", chrono::Utc::now());
    store.insert_booking(booking);

    let err = intake
        .process_payment(&PaymentRequest {
            booking_id: 42,
            payment_ref: "R1".to_string(),
            amount: 500.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::AlreadyProcessed("PAID")));
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn one_cent_difference_is_accepted_two_cents_rejected() {
    let (intake, store, _publisher) = service();
    store.insert_booking(Booking::pending(1, 500.0));

    let ok = intake
        .process_payment(&PaymentRequest {
            booking_id: 1,
            payment_ref: "R1".to_string(),
            amount: 500.01,
        })
        .await;
    assert!(ok.is_ok());

    let err = intake
        .process_payment(&PaymentRequest {
            booking_id: 1,
            payment_ref: "R1".to_string(),
            amount: 500.02,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::AmountMismatch { .. }));
}

#[tokio::test]
async fn rejects_blank_payment_ref() {
    let (intake, store, publisher) = service();
    store.insert_booking(Booking::pending(5, 120.0));

    let err = intake
        .process_payment(&PaymentRequest {
            booking_id: 5,
            payment_ref: "   ".to_string(),
            amount: 120.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::MissingPaymentRef));
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn publish_failure_fails_the_payment_request() {
    let (intake, store, publisher) = service();
    store.insert_booking(Booking::pending(7, 80.0));
    publisher.set_failing(true);

    let err = intake
        .process_payment(&PaymentRequest {
            booking_id: 7,
            payment_ref: "R7".to_string(),
            amount: 80.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, IntakeError::Internal(_)));
    assert!(publisher.published().is_empty());
    assert_eq!(store.booking(7).unwrap().status, BookingStatus::Pending);
}
