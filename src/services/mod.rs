//! Business logic services

pub mod auth;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod lifecycle;
pub mod payments;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, BookingConfig, PaymentConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub availability: availability::AvailabilityService,
    pub booking: booking::BookingService,
    pub lifecycle: lifecycle::LifecycleService,
    pub payments: payments::PaymentsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        booking_config: BookingConfig,
        payment_config: PaymentConfig,
    ) -> AppResult<Self> {
        let gateway: Arc<dyn payments::PaymentGateway> =
            Arc::new(payments::HttpPaymentGateway::new(payment_config.clone())?);

        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            availability: availability::AvailabilityService::new(
                repository.clone(),
                booking_config.clone(),
            ),
            booking: booking::BookingService::new(repository.clone(), booking_config.clone()),
            lifecycle: lifecycle::LifecycleService::new(
                repository.clone(),
                gateway.clone(),
                booking_config,
            ),
            payments: payments::PaymentsService::new(repository, gateway, payment_config),
        })
    }
}
