use anyhow::Result;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use serde::{Deserialize, Serialize};

/// A delivery that exhausted its retry budget, parked for inspection and
/// manual replay instead of being dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub source_stream: String,
    pub source_id: String,
    pub attempts: u32,
    pub error: String,
    pub payload: String,
    pub parked_at: DateTime<Utc>,
}

impl DeadLetter {
    pub fn new(
        source_stream: &str,
        source_id: &str,
        attempts: u32,
        error: &str,
        payload: &str,
    ) -> Self {
        Self {
            source_stream: source_stream.to_string(),
            source_id: source_id.to_string(),
            attempts,
            error: error.to_string(),
            payload: payload.to_string(),
            parked_at: Utc::now(),
        }
    }
}

pub async fn park(
    conn: &mut MultiplexedConnection,
    dlq_stream: &str,
    letter: &DeadLetter,
) -> Result<String> {
    let id: String = redis::cmd("XADD")
        .arg(dlq_stream)
        .arg("*")
        .arg("source_stream")
        .arg(&letter.source_stream)
        .arg("source_id")
        .arg(&letter.source_id)
        .arg("attempts")
        .arg(letter.attempts)
        .arg("error")
        .arg(&letter.error)
        .arg("payload")
        .arg(&letter.payload)
        .arg("parked_at")
        .arg(letter.parked_at.to_rfc3339())
        .query_async(conn)
        .await?;

    tracing::error!(
        source_id = %letter.source_id,
        attempts = letter.attempts,
        dlq_id = %id,
        "parked payment event in dead-letter stream"
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_letter_keeps_the_original_payload_and_error() {
        let letter = DeadLetter::new(
            "payment.completed",
            "1700000000-0",
            3,
            "booking 99 not found for payment event",
            r#"{"bookingId":99,"amount":10.0,"paymentRef":"RX"}"#,
        );

        assert_eq!(letter.source_stream, "payment.completed");
        assert_eq!(letter.source_id, "1700000000-0");
        assert_eq!(letter.attempts, 3);
        assert!(letter.error.contains("booking 99"));
        assert!(letter.payload.contains("\"bookingId\":99"));
    }
}
