use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire message emitted by the intake service once a payment is accepted.
/// Immutable after publish; `paid_at` may be absent, in which case the
/// consumer substitutes the processing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompletedEvent {
    pub booking_id: i64,
    pub amount: f64,
    pub payment_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_contract_field_names() {
        let event = PaymentCompletedEvent {
            booking_id: 42,
            amount: 500.0,
            payment_ref: "R1".to_string(),
            paid_at: Some(chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["bookingId"], 42);
        assert_eq!(value["amount"], 500.0);
        assert_eq!(value["paymentRef"], "R1");
        assert!(value["paidAt"].is_string());
    }

    #[test]
    fn paid_at_is_omitted_when_absent() {
        let event = PaymentCompletedEvent {
            booking_id: 7,
            amount: 120.5,
            payment_ref: "R7".to_string(),
            paid_at: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("paidAt"));

        let parsed: PaymentCompletedEvent = serde_json::from_str(&json).unwrap();
        assert!(parsed.paid_at.is_none());
        assert_eq!(parsed.booking_id, 7);
    }

    #[test]
    fn parses_payload_without_paid_at() {
        let parsed: PaymentCompletedEvent =
            serde_json::from_str(r#"{"bookingId":3,"amount":99.99,"paymentRef":"ABC"}"#).unwrap();
        assert_eq!(parsed.booking_id, 3);
        assert_eq!(parsed.payment_ref, "ABC");
        assert!(parsed.paid_at.is_none());
    }
}
