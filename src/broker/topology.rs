use anyhow::Result;
use redis::aio::MultiplexedConnection;

/// Stream carrying `payment.completed` events. Plays the role of the topic
/// exchange plus routing key in the broker contract.
pub const PAYMENT_STREAM: &str = "payment.completed";
/// Consumer group on the payment stream, the durable work queue.
pub const PAYMENT_GROUP: &str = "payment.completed.queue";
/// Parked stream for deliveries that exhausted their retry budget.
pub const PAYMENT_DLQ: &str = "payment.completed.dlq";

/// Create the work-queue consumer group and make sure both streams exist.
/// Safe to call from every worker at startup; BUSYGROUP replies are expected
/// once the group is in place.
pub async fn declare(
    conn: &mut MultiplexedConnection,
    stream: &str,
    group: &str,
    dlq_stream: &str,
) -> Result<()> {
    let created: redis::RedisResult<String> = redis::cmd("XGROUP")
        .arg("CREATE")
        .arg(stream)
        .arg(group)
        .arg("0")
        .arg("MKSTREAM")
        .query_async(conn)
        .await;

    match created {
        Ok(_) => tracing::info!(stream, group, "created payment consumer group"),
        Err(e) if e.code() == Some("BUSYGROUP") => {
            tracing::debug!(stream, group, "payment consumer group already exists");
        }
        Err(e) => return Err(e.into()),
    }

    // The DLQ is write-only from the worker's perspective; an empty stream is
    // enough for operators to XRANGE it.
    let dlq_created: redis::RedisResult<String> = redis::cmd("XGROUP")
        .arg("CREATE")
        .arg(dlq_stream)
        .arg(format!("{dlq_stream}.inspect"))
        .arg("0")
        .arg("MKSTREAM")
        .query_async(conn)
        .await;

    match dlq_created {
        Ok(_) => tracing::info!(stream = dlq_stream, "created dead-letter stream"),
        Err(e) if e.code() == Some("BUSYGROUP") => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
