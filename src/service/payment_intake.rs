use crate::broker::publisher::EventPublisher;
use crate::domain::booking::{amounts_match, BookingStatus};
use crate::domain::event::PaymentCompletedEvent;
use crate::store::PaymentStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub booking_id: i64,
    pub payment_ref: String,
    pub amount: f64,
}

/// Acknowledgement returned to the caller. The booking is still PENDING at
/// this point; completion happens asynchronously on the consumer side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAccepted {
    pub booking_id: i64,
    pub amount: f64,
    pub payment_ref: String,
    pub status: BookingStatus,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("booking {0} not found")]
    BookingNotFound(i64),
    #[error("booking already processed, status is {0}")]
    AlreadyProcessed(&'static str),
    #[error("amount mismatch: booking amount {expected:.2}, received {received:.2}")]
    AmountMismatch { expected: f64, received: f64 },
    #[error("payment reference is required")]
    MissingPaymentRef,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct PaymentIntakeService<S, P> {
    pub store: S,
    pub publisher: P,
}

impl<S: PaymentStore, P: EventPublisher> PaymentIntakeService<S, P> {
    /// Validate the payment against the booking and publish the completion
    /// event. No booking or ledger write happens here; the consumer applies
    /// the transition once the event comes back off the queue.
    pub async fn process_payment(&self, req: &PaymentRequest) -> Result<PaymentAccepted, IntakeError> {
        let booking = self
            .store
            .find_booking(req.booking_id)
            .await?
            .ok_or(IntakeError::BookingNotFound(req.booking_id))?;

        if booking.status != BookingStatus::Pending {
            return Err(IntakeError::AlreadyProcessed(booking.status.as_str()));
        }

        if !amounts_match(booking.amount, req.amount) {
            return Err(IntakeError::AmountMismatch {
                expected: booking.amount,
                received: req.amount,
            });
        }

        if req.payment_ref.trim().is_empty() {
            return Err(IntakeError::MissingPaymentRef);
        }

        let event = PaymentCompletedEvent {
            booking_id: booking.id,
            amount: req.amount,
            payment_ref: req.payment_ref.clone(),
            paid_at: Some(Utc::now()),
        };

        // Publish failure rejects the payment; acceptance means the broker
        // has the event.
        self.publisher.publish_payment_completed(&event).await?;

        tracing::info!(booking_id = booking.id, "payment accepted, completion queued");

        Ok(PaymentAccepted {
            booking_id: booking.id,
            amount: req.amount,
            payment_ref: req.payment_ref.clone(),
            status: booking.status,
            message: "payment accepted; booking completion is pending".to_string(),
        })
    }
}
