//! Repository layer for database operations

pub mod appointments;
pub mod availability;
pub mod barbers;
pub mod no_show;
pub mod payments;
pub mod services;
pub mod shops;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub shops: shops::ShopsRepository,
    pub barbers: barbers::BarbersRepository,
    pub services: services::ServicesRepository,
    pub availability: availability::AvailabilityRepository,
    pub appointments: appointments::AppointmentsRepository,
    pub payments: payments::PaymentsRepository,
    pub no_show: no_show::NoShowRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            shops: shops::ShopsRepository::new(pool.clone()),
            barbers: barbers::BarbersRepository::new(pool.clone()),
            services: services::ServicesRepository::new(pool.clone()),
            availability: availability::AvailabilityRepository::new(pool.clone()),
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            payments: payments::PaymentsRepository::new(pool.clone()),
            no_show: no_show::NoShowRepository::new(pool.clone()),
            pool,
        }
    }
}
