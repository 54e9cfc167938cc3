//! Appointment lifecycle service
//!
//! Owns every transition out of the booked/confirmed states: payment
//! confirmation, cancellation with its refund, completion, explicit no-show
//! marking and the idempotent no-show sweep.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::BookingConfig,
    error::{AppError, AppResult},
    models::{
        appointment::Appointment,
        payment::{Payment, PaymentStatus},
        user::{Role, UserClaims},
    },
    repository::{
        appointments::RefundDecision,
        payments::ConfirmOutcome,
        Repository,
    },
    services::payments::PaymentGateway,
};

/// Result of one no-show sweep run
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepReport {
    /// Appointments matching the sweep selection
    pub scanned: usize,
    /// Appointments actually transitioned to no-show
    pub marked: usize,
    pub details: Vec<SweepDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepDetail {
    pub appointment_id: Uuid,
    pub customer_id: Uuid,
    pub start_time: DateTime<Utc>,
}

/// The payment to refund when a cancellation qualifies for one
///
/// A refund is due only when a paid deposit exists and the cancellation
/// happens at least `refund_cutoff_hours` before the start time; inside the
/// cutoff the deposit is forfeited.
fn refund_due(
    payment: Option<&Payment>,
    start_time: DateTime<Utc>,
    now: DateTime<Utc>,
    refund_cutoff_hours: i64,
) -> Option<&Payment> {
    match payment {
        Some(p)
            if p.status == PaymentStatus::Paid
                && start_time - now >= Duration::hours(refund_cutoff_hours) =>
        {
            Some(p)
        }
        _ => None,
    }
}

/// Pre-commit refund step of a cancellation
///
/// The gateway call is not transactional with the store, so it runs strictly
/// before the database commit: on gateway failure the error propagates and no
/// state changes. The returned decision records what the step observed, so the
/// cancelling transaction can detect a payment that changed underneath it.
async fn execute_refund_step(
    gateway: &dyn PaymentGateway,
    payment: Option<&Payment>,
    start_time: DateTime<Utc>,
    now: DateTime<Utc>,
    refund_cutoff_hours: i64,
) -> AppResult<RefundDecision> {
    match refund_due(payment, start_time, now, refund_cutoff_hours) {
        Some(p) => {
            gateway.refund(&p.provider_ref).await?;
            Ok(RefundDecision::Refunded(p.id))
        }
        None => match payment {
            Some(p) if p.status == PaymentStatus::Paid => Ok(RefundDecision::Forfeited),
            _ => Ok(RefundDecision::NonePaid),
        },
    }
}

#[derive(Clone)]
pub struct LifecycleService {
    repository: Repository,
    gateway: Arc<dyn PaymentGateway>,
    config: BookingConfig,
}

impl LifecycleService {
    pub fn new(
        repository: Repository,
        gateway: Arc<dyn PaymentGateway>,
        config: BookingConfig,
    ) -> Self {
        Self {
            repository,
            gateway,
            config,
        }
    }

    /// Cancel an appointment, refunding the deposit when the cutoff allows
    pub async fn cancel_appointment(
        &self,
        id: Uuid,
        actor: &UserClaims,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        let appointment = self.repository.appointments.get_by_id(id).await?;
        self.authorize_party(&appointment, actor).await?;

        if appointment.status.is_terminal() {
            return Err(AppError::InvalidAppointmentState(format!(
                "appointment is {}",
                appointment.status
            )));
        }
        if now >= appointment.start_time {
            return Err(AppError::CancellationWindowPassed);
        }

        let payment = self.repository.payments.get_by_appointment(id).await?;

        // Refund before commit: if the gateway call fails, the appointment
        // stays exactly as it was.
        let decision = execute_refund_step(
            self.gateway.as_ref(),
            payment.as_ref(),
            appointment.start_time,
            now,
            self.config.refund_cutoff_hours,
        )
        .await?;
        let refunded = matches!(decision, RefundDecision::Refunded(_));

        let cancelled = self
            .repository
            .appointments
            .finalize_cancellation(id, reason.as_deref(), decision)
            .await?;

        tracing::info!(
            appointment_id = %id,
            refunded,
            "appointment cancelled"
        );
        Ok(cancelled)
    }

    /// Mark an appointment completed (staff action)
    pub async fn complete_appointment(
        &self,
        id: Uuid,
        actor: &UserClaims,
    ) -> AppResult<Appointment> {
        actor.require_staff()?;
        let appointment = self.repository.appointments.get_by_id(id).await?;
        self.authorize_staff(&appointment, actor).await?;
        self.repository.appointments.complete(id).await
    }

    /// Mark an appointment as a no-show (staff action)
    ///
    /// Requires the start time to have passed; always bumps the customer's
    /// no-show counter.
    pub async fn mark_no_show(
        &self,
        id: Uuid,
        actor: &UserClaims,
        now: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        actor.require_staff()?;
        let appointment = self.repository.appointments.get_by_id(id).await?;
        self.authorize_staff(&appointment, actor).await?;

        if appointment.status.is_terminal() {
            return Err(AppError::InvalidAppointmentState(format!(
                "appointment is {}",
                appointment.status
            )));
        }
        if now < appointment.start_time {
            return Err(AppError::BookingInPast);
        }

        self.repository
            .appointments
            .try_mark_no_show(id, now)
            .await?
            .ok_or_else(|| {
                AppError::InvalidAppointmentState("appointment was transitioned concurrently".to_string())
            })
    }

    /// Promote every elapsed confirmed appointment to no-show
    ///
    /// One transaction per appointment, so a failure on one row never blocks
    /// the rest of the batch. Idempotent: marked appointments leave the
    /// selection set, and re-running yields `marked == 0`.
    pub async fn run_no_show_sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let candidates = self
            .repository
            .appointments
            .sweep_candidates(now, self.config.grace_period_minutes)
            .await?;
        let scanned = candidates.len();

        let mut details = Vec::new();
        for candidate in candidates {
            match self
                .repository
                .appointments
                .try_mark_no_show(candidate.id, now)
                .await
            {
                Ok(Some(appointment)) => details.push(SweepDetail {
                    appointment_id: appointment.id,
                    customer_id: appointment.customer_id,
                    start_time: appointment.start_time,
                }),
                // Transitioned between selection and marking; already handled.
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        appointment_id = %candidate.id,
                        error = %e,
                        "no-show sweep failed for appointment, continuing"
                    );
                }
            }
        }

        tracing::info!(scanned, marked = details.len(), "no-show sweep finished");
        Ok(SweepReport {
            scanned,
            marked: details.len(),
            details,
        })
    }

    /// Current no-show flag of a customer, if any (admin action)
    pub async fn get_no_show_flag(
        &self,
        customer_id: Uuid,
    ) -> AppResult<Option<crate::models::no_show::NoShowFlag>> {
        self.repository.users.get_by_id(customer_id).await?;
        self.repository.no_show.get_for_customer(customer_id).await
    }

    /// Zero a customer's no-show counter (admin action)
    pub async fn reset_no_show_flag(&self, customer_id: Uuid) -> AppResult<()> {
        self.repository.users.get_by_id(customer_id).await?;
        self.repository.no_show.reset(customer_id).await?;
        tracing::info!(customer_id = %customer_id, "no-show counter reset");
        Ok(())
    }

    /// Apply a payment-success notification from the gateway
    pub async fn confirm_payment(&self, provider_ref: &str) -> AppResult<()> {
        match self
            .repository
            .payments
            .confirm_by_provider_ref(provider_ref)
            .await?
        {
            ConfirmOutcome::Confirmed => {
                tracing::info!(provider_ref, "payment confirmed");
            }
            ConfirmOutcome::AlreadyPaid => {
                tracing::debug!(provider_ref, "duplicate payment notification ignored");
            }
            ConfirmOutcome::Settled => {
                tracing::warn!(
                    provider_ref,
                    "payment notification for a refunded or failed payment dropped"
                );
            }
            ConfirmOutcome::UnknownReference => {
                tracing::warn!(provider_ref, "payment notification for unknown reference dropped");
            }
        }
        Ok(())
    }

    /// The appointment's customer, its shop's staff, or an admin
    async fn authorize_party(&self, appointment: &Appointment, actor: &UserClaims) -> AppResult<()> {
        if actor.role == Role::Customer {
            if appointment.customer_id == actor.user_id {
                return Ok(());
            }
            return Err(AppError::Authorization("Not your appointment".to_string()));
        }
        self.authorize_staff(appointment, actor).await
    }

    /// The appointment's barber, the owner of that barber's shop, or an admin
    async fn authorize_staff(&self, appointment: &Appointment, actor: &UserClaims) -> AppResult<()> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Barber if actor.barber_id == Some(appointment.barber_id) => Ok(()),
            Role::Owner => {
                let barber = self.repository.barbers.get_by_id(appointment.barber_id).await?;
                if actor.shop_id == Some(barber.shop_id) {
                    Ok(())
                } else {
                    Err(AppError::Authorization(
                        "Appointment belongs to another shop".to_string(),
                    ))
                }
            }
            _ => Err(AppError::Authorization(
                "Not allowed to manage this appointment".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payments::MockPaymentGateway;
    use chrono::TimeZone;

    fn paid_payment() -> Payment {
        Payment {
            id: Uuid::new_v4(),
            appointment_id: Uuid::new_v4(),
            status: PaymentStatus::Paid,
            amount_cents: 2500,
            provider_ref: "pi_test_123".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).unwrap()
    }

    #[test]
    fn refund_due_only_outside_cutoff() {
        let payment = paid_payment();
        let start = Utc.with_ymd_and_hms(2025, 6, 4, 10, 0, 0).unwrap();

        // 48 hours ahead: refundable.
        assert!(refund_due(Some(&payment), start, at(10), 24).is_some());
        // Exactly at the cutoff boundary: still refundable.
        let now = start - Duration::hours(24);
        assert!(refund_due(Some(&payment), start, now, 24).is_some());
        // One minute inside the cutoff: forfeited.
        let now = start - Duration::hours(24) + Duration::minutes(1);
        assert!(refund_due(Some(&payment), start, now, 24).is_none());
    }

    #[test]
    fn refund_not_due_without_paid_deposit() {
        let start = Utc.with_ymd_and_hms(2025, 6, 4, 10, 0, 0).unwrap();
        assert!(refund_due(None, start, at(10), 24).is_none());

        let mut payment = paid_payment();
        payment.status = PaymentStatus::RequiresPayment;
        assert!(refund_due(Some(&payment), start, at(10), 24).is_none());
    }

    #[tokio::test]
    async fn refund_step_calls_gateway_and_returns_payment_id() {
        let payment = paid_payment();
        let start = Utc.with_ymd_and_hms(2025, 6, 4, 10, 0, 0).unwrap();

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_refund()
            .withf(|provider_ref| provider_ref == "pi_test_123")
            .times(1)
            .returning(|_| Ok(()));

        let decision = execute_refund_step(&gateway, Some(&payment), start, at(10), 24)
            .await
            .unwrap();
        assert_eq!(decision, RefundDecision::Refunded(payment.id));
    }

    #[tokio::test]
    async fn gateway_failure_aborts_before_any_commit() {
        let payment = paid_payment();
        let start = Utc.with_ymd_and_hms(2025, 6, 4, 10, 0, 0).unwrap();

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_refund()
            .times(1)
            .returning(|_| Err(AppError::Gateway("card network timeout".to_string())));

        let result = execute_refund_step(&gateway, Some(&payment), start, at(10), 24).await;
        assert!(matches!(result, Err(AppError::Gateway(_))));
    }

    #[tokio::test]
    async fn forfeited_deposit_never_touches_the_gateway() {
        let payment = paid_payment();
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();

        // Mock with no expectations: any refund call would panic.
        let gateway = MockPaymentGateway::new();

        let decision = execute_refund_step(&gateway, Some(&payment), start, at(10), 24)
            .await
            .unwrap();
        assert_eq!(decision, RefundDecision::Forfeited);
    }

    #[tokio::test]
    async fn decision_records_the_absence_of_a_paid_deposit() {
        let start = Utc.with_ymd_and_hms(2025, 6, 4, 10, 0, 0).unwrap();
        let gateway = MockPaymentGateway::new();

        let decision = execute_refund_step(&gateway, None, start, at(10), 24)
            .await
            .unwrap();
        assert_eq!(decision, RefundDecision::NonePaid);

        // An unpaid deposit is not a paid one: still NonePaid, even though a
        // payment row exists.
        let mut payment = paid_payment();
        payment.status = PaymentStatus::RequiresPayment;
        let decision = execute_refund_step(&gateway, Some(&payment), start, at(10), 24)
            .await
            .unwrap();
        assert_eq!(decision, RefundDecision::NonePaid);
    }
}
