use crate::domain::event::PaymentCompletedEvent;
use anyhow::Result;

/// Send side of the payment pipeline. Publish failure must surface to the
/// caller; a payment is only accepted once the broker has the event.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_payment_completed(&self, event: &PaymentCompletedEvent) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisEventPublisher {
    pub client: redis::Client,
    pub stream_key: String,
}

#[async_trait::async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish_payment_completed(&self, event: &PaymentCompletedEvent) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(event)?;

        let id: String = redis::cmd("XADD")
            .arg(&self.stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(1_000_000)
            .arg("*")
            .arg("event")
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        tracing::info!(
            booking_id = event.booking_id,
            stream_id = %id,
            "published payment.completed event"
        );
        Ok(())
    }
}
