//! Payment gateway boundary and deposit service

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::PaymentConfig,
    error::{AppError, AppResult},
    models::{
        payment::PaymentIntentResponse,
        user::{Role, UserClaims},
    },
    repository::Repository,
};

/// A payment intent created at the gateway
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// The payment gateway the platform collects deposits and issues refunds
/// through
///
/// Calls are assumed idempotent per reference id on the gateway side; errors
/// are opaque and surfaced as `AppError::Gateway`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        appointment_id: Uuid,
    ) -> AppResult<PaymentIntent>;

    async fn refund(&self, provider_ref: &str) -> AppResult<()>;
}

/// Stripe-shaped HTTP gateway client
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl HttpPaymentGateway {
    pub fn new(config: PaymentConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }
}

#[derive(Deserialize)]
struct IntentBody {
    id: String,
    client_secret: String,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        appointment_id: Uuid,
    ) -> AppResult<PaymentIntent> {
        let response = self
            .http
            .post(format!("{}/payment_intents", self.config.gateway_url))
            .bearer_auth(&self.config.secret_key)
            .form(&[
                ("amount", amount_cents.to_string()),
                ("currency", currency.to_string()),
                ("metadata[appointment_id]", appointment_id.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Gateway(format!(
                "payment intent creation failed with status {}",
                response.status()
            )));
        }

        let body: IntentBody = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        Ok(PaymentIntent {
            id: body.id,
            client_secret: body.client_secret,
        })
    }

    async fn refund(&self, provider_ref: &str) -> AppResult<()> {
        let response = self
            .http
            .post(format!("{}/refunds", self.config.gateway_url))
            .bearer_auth(&self.config.secret_key)
            .form(&[("payment_intent", provider_ref)])
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Gateway(format!(
                "refund failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PaymentsService {
    repository: Repository,
    gateway: Arc<dyn PaymentGateway>,
    config: PaymentConfig,
}

impl PaymentsService {
    pub fn new(
        repository: Repository,
        gateway: Arc<dyn PaymentGateway>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            repository,
            gateway,
            config,
        }
    }

    /// Create the deposit payment intent for an appointment
    ///
    /// The intent is created at the gateway first, then recorded; the unique
    /// index on `appointment_id` rejects a second payment for the same
    /// appointment.
    pub async fn create_intent(
        &self,
        appointment_id: Uuid,
        actor: &UserClaims,
    ) -> AppResult<PaymentIntentResponse> {
        let appointment = self.repository.appointments.get_by_id(appointment_id).await?;

        if actor.role == Role::Customer && appointment.customer_id != actor.user_id {
            return Err(AppError::Authorization(
                "Not your appointment".to_string(),
            ));
        }
        if appointment.status.is_terminal() {
            return Err(AppError::InvalidAppointmentState(format!(
                "appointment is {}",
                appointment.status
            )));
        }

        if self
            .repository
            .payments
            .get_by_appointment(appointment_id)
            .await?
            .is_some()
        {
            return Err(AppError::PaymentAlreadyExists);
        }

        let service = self.repository.services.get_by_id(appointment.service_id).await?;
        let amount_cents = service.price_cents * self.config.deposit_percent as i64 / 100;

        let intent = self
            .gateway
            .create_payment_intent(amount_cents, &self.config.currency, appointment_id)
            .await?;

        let payment = self
            .repository
            .payments
            .create(appointment_id, amount_cents, &intent.id)
            .await?;

        tracing::info!(
            appointment_id = %appointment_id,
            payment_id = %payment.id,
            amount_cents,
            "deposit payment intent created"
        );

        Ok(PaymentIntentResponse {
            payment_id: payment.id,
            amount_cents,
            client_secret: intent.client_secret,
        })
    }
}
