//! Appointment model and status machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Appointment lifecycle status
///
/// `Cancelled`, `Completed` and `NoShow` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed | AppointmentStatus::NoShow
        )
    }

    /// Legal transitions of the lifecycle state machine
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match (self, next) {
            (Booked, Confirmed | Cancelled | Completed | NoShow) => true,
            (Confirmed, Cancelled | Completed | NoShow) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
        };
        write!(f, "{}", label)
    }
}

/// An appointment between a customer and a barber
///
/// `end_time` is fixed at creation from the service duration and never
/// recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create appointment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAppointment {
    pub barber_id: Uuid,
    pub service_id: Uuid,
    /// Requested start time (RFC 3339)
    pub start_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus::*;

    #[test]
    fn terminal_states_have_no_successors() {
        for terminal in [Cancelled, Completed, NoShow] {
            for next in [Booked, Confirmed, Cancelled, Completed, NoShow] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn booked_may_skip_confirmation() {
        // Direct completion without payment confirmation is rare but allowed.
        assert!(Booked.can_transition_to(Completed));
        assert!(Booked.can_transition_to(NoShow));
        assert!(Booked.can_transition_to(Cancelled));
        assert!(Booked.can_transition_to(Confirmed));
    }

    #[test]
    fn confirmed_cannot_return_to_booked() {
        assert!(!Confirmed.can_transition_to(Booked));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }
}
