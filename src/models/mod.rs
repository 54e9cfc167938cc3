//! Data models for Trimline

pub mod appointment;
pub mod availability;
pub mod barber;
pub mod no_show;
pub mod payment;
pub mod service;
pub mod shop;
pub mod user;

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentStatus};
pub use availability::{AvailabilityRule, RuleKind, WindowRule};
pub use barber::Barber;
pub use no_show::NoShowFlag;
pub use payment::{Payment, PaymentStatus};
pub use service::Service;
pub use shop::Shop;
pub use user::{Role, User, UserClaims};
