use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Row, Transaction};

/// One ledger row per completed payment. Append-only; nothing in this
/// pipeline updates or deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub date: NaiveDate,
    pub tour_revenue: f64,
    pub total_revenue: f64,
    pub total_bookings: i32,
    pub booking_id: i64,
}

impl RevenueEntry {
    pub fn for_payment(date: NaiveDate, amount: f64, booking_id: i64) -> Self {
        Self {
            date,
            tour_revenue: amount,
            total_revenue: amount,
            total_bookings: 1,
            booking_id,
        }
    }
}

#[derive(Clone)]
pub struct RevenueRepo {
    pub pool: PgPool,
}

impl RevenueRepo {
    /// Insert inside the payment-completion transaction. The unique
    /// constraint on booking_id makes a second concurrent completion fail
    /// here and roll the whole unit back.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        entry: &RevenueEntry,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO revenues (date, tour_revenue, total_revenue, total_bookings, booking_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.date)
        .bind(entry.tour_revenue)
        .bind(entry.total_revenue)
        .bind(entry.total_bookings)
        .bind(entry.booking_id)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn find_by_booking(&self, booking_id: i64) -> Result<Option<RevenueEntry>> {
        let row = sqlx::query(
            r#"
            SELECT date, tour_revenue, total_revenue, total_bookings, booking_id
            FROM revenues
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(RevenueEntry {
                date: r.try_get("date")?,
                tour_revenue: r.try_get("tour_revenue")?,
                total_revenue: r.try_get("total_revenue")?,
                total_bookings: r.try_get("total_bookings")?,
                booking_id: r.try_get("booking_id")?,
            })
        })
        .transpose()
    }
}
