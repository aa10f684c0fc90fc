use crate::domain::booking::Booking;
use crate::repo::bookings_repo::BookingsRepo;
use crate::repo::revenue_repo::{RevenueEntry, RevenueRepo};
use crate::store::PaymentStore;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgPaymentStore {
    pub pool: PgPool,
    pub bookings_repo: BookingsRepo,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bookings_repo: BookingsRepo { pool: pool.clone() },
            pool,
        }
    }
}

#[async_trait::async_trait]
impl PaymentStore for PgPaymentStore {
    async fn find_booking(&self, booking_id: i64) -> Result<Option<Booking>> {
        self.bookings_repo.find_by_id(booking_id).await
    }

    async fn complete_payment(
        &self,
        booking_id: i64,
        payment_ref: &str,
        paid_at: DateTime<Utc>,
        revenue: &RevenueEntry,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let moved = BookingsRepo::mark_paid_tx(&mut tx, booking_id, payment_ref, paid_at).await?;
        if moved == 0 {
            // Another delivery or the cancellation path won the race. Abort;
            // the redelivery will hit the idempotency guard or park.
            bail!("booking {booking_id} is no longer PENDING");
        }

        RevenueRepo::insert_tx(&mut tx, revenue).await?;
        tx.commit().await?;
        Ok(())
    }
}
