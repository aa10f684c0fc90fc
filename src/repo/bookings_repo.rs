use crate::domain::booking::{Booking, BookingStatus};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

#[derive(Clone)]
pub struct BookingsRepo {
    pub pool: PgPool,
}

impl BookingsRepo {
    pub async fn find_by_id(&self, booking_id: i64) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, amount, status, payment_ref, paid_at, cancelled_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(from_row).transpose()
    }

    pub async fn save(&self, booking: &Booking) -> Result<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (id, amount, status, payment_ref, paid_at, cancelled_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                amount = EXCLUDED.amount,
                status = EXCLUDED.status,
                payment_ref = EXCLUDED.payment_ref,
                paid_at = EXCLUDED.paid_at,
                cancelled_at = EXCLUDED.cancelled_at
            RETURNING id, amount, status, payment_ref, paid_at, cancelled_at
            "#,
        )
        .bind(booking.id)
        .bind(booking.amount)
        .bind(booking.status.as_str())
        .bind(booking.payment_ref.as_deref())
        .bind(booking.paid_at)
        .bind(booking.cancelled_at)
        .fetch_one(&self.pool)
        .await?;

        from_row(row)
    }

    /// Guarded transition PENDING -> PAID. Returns the number of rows moved;
    /// zero means another delivery or the cancellation path got there first.
    pub async fn mark_paid_tx(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i64,
        payment_ref: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<u64> {
        let done = sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'PAID', payment_ref = $2, paid_at = $3
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(booking_id)
        .bind(payment_ref)
        .bind(paid_at)
        .execute(tx.as_mut())
        .await?;

        Ok(done.rows_affected())
    }
}

fn from_row(row: sqlx::postgres::PgRow) -> Result<Booking> {
    let status_text: String = row.try_get("status")?;
    let status = BookingStatus::parse(&status_text)
        .ok_or_else(|| anyhow!("unknown booking status {status_text}"))?;

    Ok(Booking {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        status,
        payment_ref: row.try_get("payment_ref")?,
        paid_at: row.try_get("paid_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
    })
}
