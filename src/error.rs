//! Error types for Trimline server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
///
/// Every business-rule violation the core can produce has its own variant so
/// callers can match on the kind instead of parsing messages. Only store
/// failures and bugs end up in `Database`/`Internal`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Appointment start time is in the past")]
    BookingInPast,

    #[error("Customer is blocked due to repeated no-shows")]
    CustomerBlocked,

    #[error("Barber not found")]
    BarberNotFound,

    #[error("Barber is not active")]
    BarberNotActive,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Barber is not available at the requested time")]
    BarberUnavailable,

    #[error("Requested time overlaps an existing appointment")]
    OverlappingAppointment,

    #[error("Concurrent booking conflict, please retry")]
    ConcurrentModification,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Invalid appointment state: {0}")]
    InvalidAppointmentState(String),

    #[error("Cancellation window has passed")]
    CancellationWindowPassed,

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("A payment already exists for this appointment")]
    PaymentAlreadyExists,

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the error taxonomy
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "NOT_AUTHENTICATED",
            AppError::Authorization(_) => "NOT_AUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BookingInPast => "BOOKING_IN_PAST",
            AppError::CustomerBlocked => "CUSTOMER_BLOCKED",
            AppError::BarberNotFound => "BARBER_NOT_FOUND",
            AppError::BarberNotActive => "BARBER_NOT_ACTIVE",
            AppError::ServiceNotFound => "SERVICE_NOT_FOUND",
            AppError::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            AppError::BarberUnavailable => "BARBER_UNAVAILABLE",
            AppError::OverlappingAppointment => "OVERLAPPING_APPOINTMENT",
            AppError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            AppError::AppointmentNotFound => "APPOINTMENT_NOT_FOUND",
            AppError::InvalidAppointmentState(_) => "INVALID_APPOINTMENT_STATE",
            AppError::CancellationWindowPassed => "CANCELLATION_WINDOW_PASSED",
            AppError::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            AppError::PaymentAlreadyExists => "PAYMENT_ALREADY_EXISTS",
            AppError::Gateway(_) => "GATEWAY_ERROR",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) | AppError::CustomerBlocked => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::InvalidDateRange(_) => StatusCode::BAD_REQUEST,
            AppError::BarberNotFound
            | AppError::ServiceNotFound
            | AppError::CustomerNotFound
            | AppError::AppointmentNotFound => StatusCode::NOT_FOUND,
            AppError::OverlappingAppointment
            | AppError::ConcurrentModification
            | AppError::InvalidAppointmentState(_)
            | AppError::PaymentAlreadyExists => StatusCode::CONFLICT,
            AppError::BookingInPast
            | AppError::BarberNotActive
            | AppError::BarberUnavailable
            | AppError::CancellationWindowPassed => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: self.code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Postgres SQLSTATE codes the booking engine reacts to
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

/// True when the error is a serialization/deadlock conflict the caller may retry
pub fn is_serialization_conflict(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SERIALIZATION_FAILURE)
            || db.code().as_deref() == Some(DEADLOCK_DETECTED)
    )
}

/// True when the error is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}
