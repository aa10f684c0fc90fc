use crate::domain::booking::{amounts_match, BookingStatus};
use crate::domain::event::PaymentCompletedEvent;
use crate::repo::revenue_repo::RevenueEntry;
use crate::store::PaymentStore;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Applied { paid_at: DateTime<Utc> },
    /// Duplicate delivery of an already-applied event. Success, not an
    /// error, so harmless redeliveries never reach the dead-letter stream.
    AlreadyPaid,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("booking {0} not found for payment event")]
    BookingNotFound(i64),
    #[error("booking {booking_id} is {status} and cannot accept a payment")]
    NotPending { booking_id: i64, status: &'static str },
    #[error("amount mismatch with booking {booking_id}: expected {expected:.2}, received {received:.2}")]
    AmountMismatch {
        booking_id: i64,
        expected: f64,
        received: f64,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct PaymentCompletionConsumer<S> {
    pub store: S,
}

impl<S: PaymentStore> PaymentCompletionConsumer<S> {
    /// Apply one payment.completed delivery: validate the booking, move it
    /// PENDING -> PAID and append the revenue entry as one atomic unit.
    /// Errors propagate to the delivery loop, where the retry policy and the
    /// dead-letter stream take over.
    pub async fn handle_payment_completed(
        &self,
        event: &PaymentCompletedEvent,
    ) -> Result<CompletionOutcome, ConsumerError> {
        tracing::info!(
            booking_id = event.booking_id,
            amount = event.amount,
            "received payment.completed event"
        );

        let booking = self
            .store
            .find_booking(event.booking_id)
            .await?
            .ok_or(ConsumerError::BookingNotFound(event.booking_id))?;

        if booking.status == BookingStatus::Paid {
            tracing::info!(booking_id = booking.id, "booking already paid, skipping");
            return Ok(CompletionOutcome::AlreadyPaid);
        }

        if booking.status.is_terminal() {
            return Err(ConsumerError::NotPending {
                booking_id: booking.id,
                status: booking.status.as_str(),
            });
        }

        if !amounts_match(booking.amount, event.amount) {
            return Err(ConsumerError::AmountMismatch {
                booking_id: booking.id,
                expected: booking.amount,
                received: event.amount,
            });
        }

        let paid_at = event.paid_at.unwrap_or_else(Utc::now);
        let revenue = RevenueEntry::for_payment(paid_at.date_naive(), booking.amount, booking.id);

        self.store
            .complete_payment(booking.id, &event.payment_ref, paid_at, &revenue)
            .await?;

        tracing::info!(booking_id = booking.id, "payment event processed");
        Ok(CompletionOutcome::Applied { paid_at })
    }
}
