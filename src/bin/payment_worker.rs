use anyhow::Result;
use redis::streams::StreamReadReply;
use sqlx::postgres::PgPoolOptions;
use tour_payments::broker::dead_letter::{self, DeadLetter};
use tour_payments::broker::retry::with_retry;
use tour_payments::broker::topology;
use tour_payments::config::AppConfig;
use tour_payments::domain::event::PaymentCompletedEvent;
use tour_payments::service::payment_consumer::PaymentCompletionConsumer;
use tour_payments::store::pg::PgPaymentStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let consumer_name =
        std::env::var("PAYMENT_CONSUMER_NAME").unwrap_or_else(|_| "payment-worker-1".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let consumer = PaymentCompletionConsumer {
        store: PgPaymentStore::new(pool),
    };

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;
    let mut conn = redis_client.get_multiplexed_async_connection().await?;

    topology::declare(&mut conn, &cfg.payment_stream, &cfg.payment_group, &cfg.payment_dlq).await?;

    let policy = cfg.retry_policy();
    tracing::info!(
        stream = %cfg.payment_stream,
        group = %cfg.payment_group,
        consumer = %consumer_name,
        "payment completion worker started"
    );

    loop {
        let reply: StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&cfg.payment_group)
            .arg(&consumer_name)
            .arg("COUNT")
            .arg(16)
            .arg("BLOCK")
            .arg(2000)
            .arg("STREAMS")
            .arg(&cfg.payment_stream)
            .arg(">")
            .query_async(&mut conn)
            .await
            .unwrap_or(StreamReadReply { keys: vec![] });

        if reply.keys.is_empty() {
            continue;
        }

        for stream_key in reply.keys {
            for delivery in stream_key.ids {
                let raw = delivery
                    .map
                    .get("event")
                    .and_then(|v| redis::from_redis_value::<String>(v).ok())
                    .unwrap_or_default();

                let parked = match serde_json::from_str::<PaymentCompletedEvent>(&raw) {
                    Ok(event) => {
                        let result = with_retry(&policy, |_attempt| {
                            consumer.handle_payment_completed(&event)
                        })
                        .await;

                        match result {
                            Ok(_) => None,
                            Err(e) => Some(DeadLetter::new(
                                &cfg.payment_stream,
                                &delivery.id,
                                policy.max_attempts,
                                &e.to_string(),
                                &raw,
                            )),
                        }
                    }
                    // Unparseable payloads are unprocessable; park them
                    // straight away rather than burning retries.
                    Err(e) => Some(DeadLetter::new(
                        &cfg.payment_stream,
                        &delivery.id,
                        0,
                        &format!("malformed payment event: {e}"),
                        &raw,
                    )),
                };

                if let Some(letter) = parked {
                    if let Err(e) = dead_letter::park(&mut conn, &cfg.payment_dlq, &letter).await {
                        // Leave the delivery pending so it is redelivered
                        // rather than lost.
                        tracing::error!(delivery_id = %delivery.id, error = %e, "failed to park dead letter");
                        continue;
                    }
                }

                let _: i64 = redis::cmd("XACK")
                    .arg(&cfg.payment_stream)
                    .arg(&cfg.payment_group)
                    .arg(&delivery.id)
                    .query_async(&mut conn)
                    .await
                    .unwrap_or(0);
            }
        }
    }
}
