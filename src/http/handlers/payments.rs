use crate::service::payment_intake::{IntakeError, PaymentRequest};
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub async fn process_payment(
    State(state): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> impl IntoResponse {
    match state.intake.process_payment(&req).await {
        Ok(accepted) => (axum::http::StatusCode::ACCEPTED, Json(accepted)).into_response(),
        Err(e) => {
            let (status, code) = match &e {
                IntakeError::BookingNotFound(_) => {
                    (axum::http::StatusCode::NOT_FOUND, "BOOKING_NOT_FOUND")
                }
                IntakeError::AlreadyProcessed(_) => {
                    (axum::http::StatusCode::BAD_REQUEST, "ALREADY_PROCESSED")
                }
                IntakeError::AmountMismatch { .. } => {
                    (axum::http::StatusCode::BAD_REQUEST, "AMOUNT_MISMATCH")
                }
                IntakeError::MissingPaymentRef => {
                    (axum::http::StatusCode::BAD_REQUEST, "PAYMENT_REF_REQUIRED")
                }
                IntakeError::Internal(_) => {
                    (axum::http::StatusCode::BAD_GATEWAY, "PUBLISH_FAILED")
                }
            };

            tracing::warn!(code, error = %e, "payment request rejected");
            let body = ErrorEnvelope {
                error: ErrorPayload {
                    code: code.to_string(),
                    message: e.to_string(),
                    details: None,
                },
            };
            (status, Json(body)).into_response()
        }
    }
}
