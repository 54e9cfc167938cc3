//! Availability rule models

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Kind of availability rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "availability_rule_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Repeats every week on `day_of_week`
    Recurring,
    /// Applies to a single calendar date; replaces all recurring rules for that date
    Exception,
}

/// An availability rule row for a barber
///
/// Recurring rows carry `day_of_week` plus a time range. Exception rows carry
/// `on_date`; when their time range is absent the date is a day off.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub kind: RuleKind,
    /// Day of week (0=Sunday, 6=Saturday); recurring rules only
    pub day_of_week: Option<i16>,
    /// Calendar date; exception rules only
    pub on_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

/// Create availability rule request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAvailabilityRule {
    pub kind: RuleKind,
    /// Day of week (0=Sunday, 6=Saturday); required for recurring rules
    pub day_of_week: Option<i16>,
    /// Date (YYYY-MM-DD); required for exception rules
    pub on_date: Option<String>,
    /// Start time (HH:MM); omit together with end_time on an exception to mark a day off
    pub start_time: Option<String>,
    /// End time (HH:MM)
    pub end_time: Option<String>,
}

/// A rule projected into the form the scheduling core works with
///
/// Resolution is precedence, never merge: for a given date, any `Exception`
/// or `DayOff` replaces every `Recurring` rule for that weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRule {
    Recurring {
        day_of_week: i16,
        start: NaiveTime,
        end: NaiveTime,
    },
    Exception {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    DayOff {
        date: NaiveDate,
    },
}

impl AvailabilityRule {
    /// Project the row into a [`WindowRule`], rejecting malformed rows
    pub fn to_window_rule(&self) -> AppResult<WindowRule> {
        match self.kind {
            RuleKind::Recurring => {
                let day_of_week = self.day_of_week.ok_or_else(|| {
                    AppError::Internal(format!("recurring rule {} has no day_of_week", self.id))
                })?;
                let (start, end) = self.time_range()?;
                Ok(WindowRule::Recurring { day_of_week, start, end })
            }
            RuleKind::Exception => {
                let date = self.on_date.ok_or_else(|| {
                    AppError::Internal(format!("exception rule {} has no date", self.id))
                })?;
                match (self.start_time, self.end_time) {
                    (None, None) => Ok(WindowRule::DayOff { date }),
                    _ => {
                        let (start, end) = self.time_range()?;
                        Ok(WindowRule::Exception { date, start, end })
                    }
                }
            }
        }
    }

    fn time_range(&self) -> AppResult<(NaiveTime, NaiveTime)> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if start < end => Ok((start, end)),
            _ => Err(AppError::Internal(format!(
                "availability rule {} has an invalid time range",
                self.id
            ))),
        }
    }
}
