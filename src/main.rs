use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tour_payments::broker::publisher::RedisEventPublisher;
use tour_payments::config::AppConfig;
use tour_payments::service::payment_intake::PaymentIntakeService;
use tour_payments::store::pg::PgPaymentStore;
use tour_payments::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;
    let publisher = RedisEventPublisher {
        client: redis::Client::open(cfg.redis_url.clone())?,
        stream_key: cfg.payment_stream.clone(),
    };

    let state = AppState {
        intake: PaymentIntakeService {
            store: PgPaymentStore::new(pool.clone()),
            publisher,
        },
        pool,
        redis_client,
    };

    let app = Router::new()
        .route(
            "/api/v1/payments",
            post(tour_payments::http::handlers::payments::process_payment),
        )
        .route("/ops/readiness", get(tour_payments::http::handlers::ops::readiness))
        .route("/ops/liveness", get(tour_payments::http::handlers::ops::liveness))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "payment intake listening");
    axum::serve(listener, app).await?;

    Ok(())
}
