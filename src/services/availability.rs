//! Availability resolution service

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::BookingConfig,
    error::{AppError, AppResult},
    models::availability::{AvailabilityRule, WindowRule},
    repository::Repository,
    scheduling::{time, windows},
};

/// Bookable slots of one calendar date
#[derive(Debug, Serialize, ToSchema)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// A discrete bookable start time
#[derive(Debug, Serialize, ToSchema)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
    config: BookingConfig,
}

impl AvailabilityService {
    pub fn new(repository: Repository, config: BookingConfig) -> Self {
        Self { repository, config }
    }

    /// Compute the bookable start times for a barber over a date range
    ///
    /// Pure read-and-compute; the transactional double-booking defence lives
    /// in the booking engine, not here.
    pub async fn compute_bookable_slots(
        &self,
        barber_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        service_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<DaySlots>> {
        if start_date >= end_date {
            return Err(AppError::InvalidDateRange(
                "start_date must be before end_date".to_string(),
            ));
        }

        let barber = self.repository.barbers.get_by_id(barber_id).await?;
        if !barber.active {
            return Err(AppError::BarberNotActive);
        }

        let service = self.repository.services.get_by_id(service_id).await?;
        if !service.active {
            return Err(AppError::ServiceNotFound);
        }
        match service.barber_id {
            Some(owner) if owner != barber.id => return Err(AppError::ServiceNotFound),
            None if service.shop_id != barber.shop_id => return Err(AppError::ServiceNotFound),
            _ => {}
        }
        let duration = service.duration_minutes as i64;

        let rules = self.repository.availability.list_for_barber(barber_id).await?;
        let rules: Vec<WindowRule> = rules
            .iter()
            .map(AvailabilityRule::to_window_rule)
            .collect::<AppResult<_>>()?;

        // Past dates are clamped to today rather than rejected.
        let start_date = start_date.max(now.date_naive());

        let (range_start, _) = time::day_bounds(start_date);
        let (_, range_end) = time::day_bounds(end_date);
        let busy = self
            .repository
            .appointments
            .busy_intervals(barber_id, range_start, range_end)
            .await?;

        let mut days = Vec::new();
        let mut date = start_date;
        while date <= end_date {
            let open = windows::clip_to_now(windows::open_windows(date, &rules), now);
            let free =
                windows::free_windows(&open, &busy, self.config.buffer_minutes, duration);
            let slots = free
                .iter()
                .flat_map(|w| windows::quantize(w, duration, self.config.slot_interval_minutes))
                .map(|s| Slot {
                    start_time: s.start,
                    end_time: s.end,
                })
                .collect();
            days.push(DaySlots { date, slots });
            date = date.succ_opt().ok_or_else(|| {
                AppError::InvalidDateRange("end_date out of calendar range".to_string())
            })?;
        }

        Ok(days)
    }
}
