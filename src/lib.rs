//! Trimline Barber Shop Booking Platform
//!
//! REST JSON API for barber-shop scheduling: availability resolution,
//! concurrency-safe booking, and the appointment lifecycle with deposits,
//! refunds and no-show tracking.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
