use crate::domain::booking::Booking;
use crate::repo::revenue_repo::RevenueEntry;
use anyhow::Result;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod pg;

/// Storage seam of the pipeline: the booking aggregate and the revenue
/// ledger behind one interface so the intake service and the consumer stay
/// backend-agnostic. `complete_payment` is the single atomic unit spanning
/// the booking transition and the ledger append; implementations must commit
/// both or neither, and must reject the transition when the booking is no
/// longer PENDING.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn find_booking(&self, booking_id: i64) -> Result<Option<Booking>>;

    async fn complete_payment(
        &self,
        booking_id: i64,
        payment_ref: &str,
        paid_at: DateTime<Utc>,
        revenue: &RevenueEntry,
    ) -> Result<()>;
}
