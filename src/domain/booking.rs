use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cent, the smallest unit the ledger tracks. Amount comparisons are done
/// at this precision so a payload that differs by exactly 0.01 still matches.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Refunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Paid => "PAID",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "PAID" => Some(BookingStatus::Paid),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "REFUNDED" => Some(BookingStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub amount: f64,
    pub status: BookingStatus,
    pub payment_ref: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn pending(id: i64, amount: f64) -> Self {
        Self {
            id,
            amount,
            status: BookingStatus::Pending,
            payment_ref: None,
            paid_at: None,
            cancelled_at: None,
        }
    }

    pub fn mark_paid(&mut self, payment_ref: &str, paid_at: DateTime<Utc>) {
        self.status = BookingStatus::Paid;
        self.payment_ref = Some(payment_ref.to_string());
        self.paid_at = Some(paid_at);
    }
}

/// Cent-precision comparison. Rounding sidesteps the float representation of
/// 0.01 so the boundary case lands on the accepting side.
pub fn amounts_match(expected: f64, received: f64) -> bool {
    ((expected - received) / AMOUNT_TOLERANCE).round().abs() <= 1.0
}
