//! Appointments repository: booking transaction engine and guarded transitions

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    config::BookingConfig,
    error::{is_serialization_conflict, AppError, AppResult},
    models::{
        appointment::{Appointment, AppointmentStatus},
        availability::{AvailabilityRule, WindowRule},
        barber::Barber,
        service::Service,
    },
    scheduling::{policy, time::Interval, windows},
};

/// A validated booking request the engine commits
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub barber_id: Uuid,
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
}

/// What the refund step decided, and on what basis
///
/// `finalize_cancellation` re-checks the basis against the locked payment row:
/// a `NonePaid` decision made while a webhook was flipping the payment to paid
/// must not commit, or the deposit would be silently stranded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundDecision {
    /// No paid deposit existed when the cancellation was evaluated
    NonePaid,
    /// A paid deposit is forfeited inside the refund cutoff
    Forfeited,
    /// The deposit was refunded at the gateway; mark this payment refunded
    Refunded(Uuid),
}

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get appointment by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::AppointmentNotFound)
    }

    /// List appointments for a customer, most recent first
    pub async fn list_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE customer_id = $1 ORDER BY start_time DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// List a barber's appointments intersecting a time range
    pub async fn list_for_barber(
        &self,
        barber_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE barber_id = $1 AND start_time < $3 AND end_time > $2
            ORDER BY start_time
            "#,
        )
        .bind(barber_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Busy intervals (booked or confirmed) for a barber within a range
    ///
    /// Used by the availability resolver; the buffer is applied by the caller.
    pub async fn busy_intervals(
        &self,
        barber_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Interval>> {
        let rows: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT start_time, end_time FROM appointments
            WHERE barber_id = $1
              AND status IN ('booked', 'confirmed')
              AND start_time < $3 AND end_time > $2
            ORDER BY start_time
            "#,
        )
        .bind(barber_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(s, e)| Interval::new(s, e)).collect())
    }

    /// Validate and commit a new appointment
    ///
    /// The whole validate-then-insert sequence runs in one SERIALIZABLE
    /// transaction so two concurrent bookings of overlapping times cannot
    /// both observe "no overlap" and both commit. The loser of such a race
    /// gets `ConcurrentModification` and is expected to retry.
    pub async fn create_booked(
        &self,
        req: &BookingRequest,
        now: DateTime<Utc>,
        cfg: &BookingConfig,
    ) -> AppResult<Appointment> {
        match self.try_create_booked(req, now, cfg).await {
            Err(AppError::Database(e)) if is_serialization_conflict(&e) => {
                tracing::debug!(
                    barber_id = %req.barber_id,
                    "serialization conflict on booking, surfacing as retryable"
                );
                Err(AppError::ConcurrentModification)
            }
            other => other,
        }
    }

    async fn try_create_booked(
        &self,
        req: &BookingRequest,
        now: DateTime<Utc>,
        cfg: &BookingConfig,
    ) -> AppResult<Appointment> {
        // 1. No bookings in the past, relative to transaction start time.
        if req.start_time <= now {
            return Err(AppError::BookingInPast);
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        // Bounded transaction: abort rather than hold locks open.
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}s'",
            cfg.transaction_timeout_secs
        ))
        .execute(&mut *tx)
        .await?;

        // 2. No-show blocking policy.
        let no_show_count: Option<i32> =
            sqlx::query_scalar("SELECT count FROM no_show_flags WHERE customer_id = $1")
                .bind(req.customer_id)
                .fetch_optional(&mut *tx)
                .await?;
        if policy::is_blocked(no_show_count.unwrap_or(0), cfg.max_no_show_count) {
            return Err(AppError::CustomerBlocked);
        }

        // 3. Barber exists and is active.
        let barber = sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE id = $1")
            .bind(req.barber_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::BarberNotFound)?;
        if !barber.active {
            return Err(AppError::BarberNotActive);
        }

        // 4. Service exists and is offered by this barber or their shop.
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(req.service_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        if !service.active {
            return Err(AppError::ServiceNotFound);
        }
        match service.barber_id {
            Some(owner) if owner != barber.id => return Err(AppError::ServiceNotFound),
            None if service.shop_id != barber.shop_id => return Err(AppError::ServiceNotFound),
            _ => {}
        }

        // 5. Customer exists.
        let customer_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(req.customer_id)
                .fetch_one(&mut *tx)
                .await?;
        if !customer_exists {
            return Err(AppError::CustomerNotFound);
        }

        // 6. Availability containment: the requested range must fit inside one
        // applicable open window, evaluated without buffer.
        let end_time = req.start_time + Duration::minutes(service.duration_minutes as i64);
        let requested = Interval::new(req.start_time, end_time);

        let rules = sqlx::query_as::<_, AvailabilityRule>(
            "SELECT * FROM availability_rules WHERE barber_id = $1",
        )
        .bind(req.barber_id)
        .fetch_all(&mut *tx)
        .await?;
        let rules: Vec<WindowRule> = rules
            .iter()
            .map(AvailabilityRule::to_window_rule)
            .collect::<AppResult<_>>()?;

        if !windows::window_contains(req.start_time.date_naive(), &rules, &requested) {
            return Err(AppError::BarberUnavailable);
        }

        // 7. Overlap against existing bookings, each expanded by the buffer.
        let conflicts: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM appointments
            WHERE barber_id = $1
              AND status IN ('booked', 'confirmed')
              AND start_time - make_interval(mins => $4) < $3
              AND end_time + make_interval(mins => $4) > $2
            "#,
        )
        .bind(req.barber_id)
        .bind(req.start_time)
        .bind(end_time)
        .bind(cfg.buffer_minutes as i32)
        .fetch_one(&mut *tx)
        .await?;
        if conflicts > 0 {
            return Err(AppError::OverlappingAppointment);
        }

        // 8. Insert and commit.
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (id, barber_id, customer_id, service_id, start_time, end_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'booked')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.barber_id)
        .bind(req.customer_id)
        .bind(req.service_id)
        .bind(req.start_time)
        .bind(end_time)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = %appointment.id,
            barber_id = %appointment.barber_id,
            start_time = %appointment.start_time,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Commit a cancellation, applying the refund decision, in one transaction
    ///
    /// The refund gateway call has already happened by the time this runs; see
    /// the lifecycle service for the ordering invariant. The payment row is
    /// locked and re-checked here: a webhook racing the cancellation can flip
    /// it to paid after the decision was made, in which case the cancellation
    /// aborts with `ConcurrentModification` and the caller retries against the
    /// paid state.
    pub async fn finalize_cancellation(
        &self,
        id: Uuid,
        reason: Option<&str>,
        decision: RefundDecision,
    ) -> AppResult<Appointment> {
        match self.try_finalize_cancellation(id, reason, decision).await {
            Err(AppError::Database(e)) if is_serialization_conflict(&e) => {
                Err(AppError::ConcurrentModification)
            }
            other => other,
        }
    }

    async fn try_finalize_cancellation(
        &self,
        id: Uuid,
        reason: Option<&str>,
        decision: RefundDecision,
    ) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = 'cancelled', cancellation_reason = $2, updated_at = now()
            WHERE id = $1 AND status IN ('booked', 'confirmed')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(&mut *tx)
        .await?;

        let appointment = match updated {
            Some(a) => a,
            // Someone else transitioned it first; report the current state.
            None => {
                tx.rollback().await?;
                let current = self.get_by_id(id).await?;
                return Err(AppError::InvalidAppointmentState(format!(
                    "appointment is {}",
                    current.status
                )));
            }
        };

        let payment_status: Option<String> = sqlx::query_scalar(
            "SELECT status::text FROM payments WHERE appointment_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match decision {
            RefundDecision::Refunded(payment_id) => {
                sqlx::query(
                    "UPDATE payments SET status = 'refunded', updated_at = now() WHERE id = $1 AND status = 'paid'",
                )
                .bind(payment_id)
                .execute(&mut *tx)
                .await?;
            }
            RefundDecision::Forfeited => {}
            RefundDecision::NonePaid => {
                if payment_status.as_deref() == Some("paid") {
                    tx.rollback().await?;
                    return Err(AppError::ConcurrentModification);
                }
            }
        }

        tx.commit().await?;
        Ok(appointment)
    }

    /// Transition an appointment to completed
    pub async fn complete(&self, id: Uuid) -> AppResult<Appointment> {
        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = 'completed', updated_at = now()
            WHERE id = $1 AND status IN ('booked', 'confirmed')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(a) => Ok(a),
            None => {
                let current = self.get_by_id(id).await?;
                Err(AppError::InvalidAppointmentState(format!(
                    "appointment is {}",
                    current.status
                )))
            }
        }
    }

    /// Transition to no-show and bump the customer's flag, atomically
    ///
    /// Returns `None` when the appointment was not in a markable state, which
    /// the sweep treats as already handled.
    pub async fn try_mark_no_show(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Appointment>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = 'no_show', updated_at = now()
            WHERE id = $1 AND status IN ('booked', 'confirmed')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let appointment = match updated {
            Some(a) => a,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        sqlx::query(
            r#"
            INSERT INTO no_show_flags (id, customer_id, count, last_flagged_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (customer_id)
            DO UPDATE SET count = no_show_flags.count + 1, last_flagged_at = EXCLUDED.last_flagged_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(appointment.customer_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(appointment))
    }

    /// Confirmed appointments whose grace period has elapsed
    ///
    /// Once an appointment leaves `Confirmed` it drops out of this selection,
    /// which is what makes the sweep idempotent.
    pub async fn sweep_candidates(
        &self,
        now: DateTime<Utc>,
        grace_period_minutes: i64,
    ) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE status = 'confirmed'
              AND start_time + make_interval(mins => $2) < $1
            ORDER BY start_time
            "#,
        )
        .bind(now)
        .bind(grace_period_minutes as i32)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Current status of an appointment, for ownership/terminal checks
    pub async fn status_of(&self, id: Uuid) -> AppResult<AppointmentStatus> {
        let status: Option<AppointmentStatus> =
            sqlx::query_scalar("SELECT status FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        status.ok_or(AppError::AppointmentNotFound)
    }
}
