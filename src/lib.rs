pub mod config;
pub mod domain {
    pub mod booking;
    pub mod event;
}
pub mod broker {
    pub mod dead_letter;
    pub mod publisher;
    pub mod retry;
    pub mod topology;
}
pub mod repo {
    pub mod bookings_repo;
    pub mod revenue_repo;
}
pub mod store;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
    }
}
pub mod service {
    pub mod payment_consumer;
    pub mod payment_intake;
}

use broker::publisher::RedisEventPublisher;
use service::payment_intake::PaymentIntakeService;
use store::pg::PgPaymentStore;

#[derive(Clone)]
pub struct AppState {
    pub intake: PaymentIntakeService<PgPaymentStore, RedisEventPublisher>,
    pub pool: sqlx::PgPool,
    pub redis_client: redis::Client,
}
