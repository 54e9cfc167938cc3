//! Payments repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::payment::{Payment, PaymentStatus},
};

/// Outcome of a payment-success notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Payment marked paid and the appointment confirmed
    Confirmed,
    /// Already paid; nothing to do
    AlreadyPaid,
    /// The payment was already refunded or failed; the notification is dropped
    Settled,
    /// No payment with this reference; the notification is dropped
    UnknownReference,
}

#[derive(Clone)]
pub struct PaymentsRepository {
    pool: Pool<Postgres>,
}

impl PaymentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the payment attached to an appointment, if any
    pub async fn get_by_appointment(&self, appointment_id: Uuid) -> AppResult<Option<Payment>> {
        let payment =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE appointment_id = $1")
                .bind(appointment_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(payment)
    }

    /// Insert a deposit payment for an appointment
    ///
    /// The unique index on `appointment_id` enforces at most one payment per
    /// appointment.
    pub async fn create(
        &self,
        appointment_id: Uuid,
        amount_cents: i64,
        provider_ref: &str,
    ) -> AppResult<Payment> {
        let result = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, appointment_id, status, amount_cents, provider_ref)
            VALUES ($1, $2, 'requires_payment', $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(appointment_id)
        .bind(amount_cents)
        .bind(provider_ref)
        .fetch_one(&self.pool)
        .await;

        result.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::PaymentAlreadyExists
            } else {
                AppError::Database(e)
            }
        })
    }

    /// Apply a payment-success notification from the gateway
    ///
    /// Marks the payment paid and promotes its appointment from booked to
    /// confirmed, in one transaction. Idempotent: a notification for an
    /// already-paid payment is a no-op, and unknown references are dropped.
    pub async fn confirm_by_provider_ref(&self, provider_ref: &str) -> AppResult<ConfirmOutcome> {
        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE provider_ref = $1 FOR UPDATE",
        )
        .bind(provider_ref)
        .fetch_optional(&mut *tx)
        .await?;

        let payment = match payment {
            Some(p) => p,
            None => {
                tx.rollback().await?;
                return Ok(ConfirmOutcome::UnknownReference);
            }
        };

        match payment.status {
            PaymentStatus::Paid => {
                tx.rollback().await?;
                return Ok(ConfirmOutcome::AlreadyPaid);
            }
            PaymentStatus::Refunded | PaymentStatus::Failed => {
                tx.rollback().await?;
                return Ok(ConfirmOutcome::Settled);
            }
            PaymentStatus::RequiresPayment => {}
        }

        sqlx::query(
            "UPDATE payments SET status = 'paid', updated_at = now() WHERE id = $1 AND status = 'requires_payment'",
        )
        .bind(payment.id)
        .execute(&mut *tx)
        .await?;

        // The appointment may have been cancelled or completed in the
        // meantime; the conditional update leaves it alone in that case.
        sqlx::query(
            "UPDATE appointments SET status = 'confirmed', updated_at = now() WHERE id = $1 AND status = 'booked'",
        )
        .bind(payment.appointment_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ConfirmOutcome::Confirmed)
    }
}
