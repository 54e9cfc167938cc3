//! Booking service

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::BookingConfig,
    error::AppResult,
    models::appointment::{Appointment, CreateAppointment},
    repository::{appointments::BookingRequest, Repository},
};

#[derive(Clone)]
pub struct BookingService {
    repository: Repository,
    config: BookingConfig,
}

impl BookingService {
    pub fn new(repository: Repository, config: BookingConfig) -> Self {
        Self { repository, config }
    }

    /// Book an appointment for a customer
    ///
    /// All validation and the insert run inside the engine's serializable
    /// transaction; a `ConcurrentModification` result means the caller lost a
    /// race and may simply retry.
    pub async fn create_appointment(
        &self,
        customer_id: Uuid,
        data: &CreateAppointment,
        now: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        let request = BookingRequest {
            barber_id: data.barber_id,
            customer_id,
            service_id: data.service_id,
            start_time: data.start_time,
        };
        self.repository
            .appointments
            .create_booked(&request, now, &self.config)
            .await
    }

    /// Get an appointment by ID
    pub async fn get_appointment(&self, id: Uuid) -> AppResult<Appointment> {
        self.repository.appointments.get_by_id(id).await
    }

    /// List a customer's appointments
    pub async fn list_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Appointment>> {
        self.repository.appointments.list_for_customer(customer_id).await
    }

    /// List a barber's appointments within a time range
    pub async fn list_for_barber(
        &self,
        barber_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        self.repository.appointments.list_for_barber(barber_id, from, to).await
    }
}
