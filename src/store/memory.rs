use crate::domain::booking::{Booking, BookingStatus};
use crate::repo::revenue_repo::RevenueEntry;
use crate::store::PaymentStore;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory store with the same guarded-transition semantics as the
/// Postgres backend. Used by the test suite and handy for local runs without
/// a database. `fail_revenue_writes` injects a ledger failure so the
/// all-or-nothing behavior of `complete_payment` can be exercised.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    bookings: HashMap<i64, Booking>,
    revenues: Vec<RevenueEntry>,
    fail_revenue_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.inner.lock().unwrap().bookings.insert(booking.id, booking);
    }

    pub fn booking(&self, booking_id: i64) -> Option<Booking> {
        self.inner.lock().unwrap().bookings.get(&booking_id).cloned()
    }

    pub fn revenue_for(&self, booking_id: i64) -> Option<RevenueEntry> {
        self.inner
            .lock()
            .unwrap()
            .revenues
            .iter()
            .find(|r| r.booking_id == booking_id)
            .cloned()
    }

    pub fn revenue_count(&self) -> usize {
        self.inner.lock().unwrap().revenues.len()
    }

    pub fn set_fail_revenue_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_revenue_writes = fail;
    }
}

#[async_trait::async_trait]
impl PaymentStore for MemoryStore {
    async fn find_booking(&self, booking_id: i64) -> Result<Option<Booking>> {
        Ok(self.booking(booking_id))
    }

    async fn complete_payment(
        &self,
        booking_id: i64,
        payment_ref: &str,
        paid_at: DateTime<Utc>,
        revenue: &RevenueEntry,
    ) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;

        if inner.revenues.iter().any(|r| r.booking_id == booking_id) {
            bail!("revenue entry already exists for booking {booking_id}");
        }
        if inner.fail_revenue_writes {
            // Nothing has been mutated yet, so the failed unit leaves the
            // booking untouched, matching a rolled-back transaction.
            bail!("injected revenue write failure for booking {booking_id}");
        }

        let Some(booking) = inner.bookings.get_mut(&booking_id) else {
            bail!("booking {booking_id} not found");
        };
        if booking.status != BookingStatus::Pending {
            bail!("booking {booking_id} is no longer PENDING");
        }

        booking.mark_paid(payment_ref, paid_at);
        inner.revenues.push(revenue.clone());
        Ok(())
    }
}
