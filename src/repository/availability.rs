//! Availability rules repository for database operations

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::availability::{AvailabilityRule, CreateAvailabilityRule, RuleKind},
};

#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: Pool<Postgres>,
}

impl AvailabilityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all availability rules for a barber
    pub async fn list_for_barber(&self, barber_id: Uuid) -> AppResult<Vec<AvailabilityRule>> {
        let rules = sqlx::query_as::<_, AvailabilityRule>(
            "SELECT * FROM availability_rules WHERE barber_id = $1 ORDER BY kind, day_of_week, on_date, start_time",
        )
        .bind(barber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }

    /// Create an availability rule for a barber
    pub async fn create(
        &self,
        barber_id: Uuid,
        data: &CreateAvailabilityRule,
    ) -> AppResult<AvailabilityRule> {
        let (day_of_week, on_date) = match data.kind {
            RuleKind::Recurring => {
                let dow = data
                    .day_of_week
                    .ok_or_else(|| AppError::Validation("day_of_week is required for recurring rules".to_string()))?;
                if !(0..=6).contains(&dow) {
                    return Err(AppError::Validation("day_of_week must be between 0 and 6".to_string()));
                }
                (Some(dow), None)
            }
            RuleKind::Exception => {
                let date = data
                    .on_date
                    .as_deref()
                    .ok_or_else(|| AppError::Validation("on_date is required for exception rules".to_string()))?;
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| AppError::Validation("Invalid on_date (use YYYY-MM-DD)".to_string()))?;
                (None, Some(date))
            }
        };

        let start_time = parse_time(data.start_time.as_deref(), "start_time")?;
        let end_time = parse_time(data.end_time.as_deref(), "end_time")?;

        match (start_time, end_time) {
            (Some(start), Some(end)) if start >= end => {
                return Err(AppError::Validation("start_time must be before end_time".to_string()));
            }
            // Recurring rules always carry a time range; only an exception may
            // omit both to mark a day off.
            (None, None) if data.kind == RuleKind::Recurring => {
                return Err(AppError::Validation("recurring rules require start_time and end_time".to_string()));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AppError::Validation("start_time and end_time must be given together".to_string()));
            }
            _ => {}
        }

        let rule = sqlx::query_as::<_, AvailabilityRule>(
            r#"
            INSERT INTO availability_rules (id, barber_id, kind, day_of_week, on_date, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(barber_id)
        .bind(data.kind)
        .bind(day_of_week)
        .bind(on_date)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(rule)
    }

    /// Delete an availability rule
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM availability_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Validation(format!("Availability rule {} not found", id)));
        }
        Ok(())
    }
}

fn parse_time(value: Option<&str>, field: &str) -> AppResult<Option<NaiveTime>> {
    value
        .map(|v| {
            NaiveTime::parse_from_str(v, "%H:%M")
                .map_err(|_| AppError::Validation(format!("Invalid {} (use HH:MM)", field)))
        })
        .transpose()
}
