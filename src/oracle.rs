// src/oracle.rs

use crate::calendar::{add_business_days, business_days_between, BusinessCalendar};
use crate::error::{Result, StatsError};
use crate::model::{ConclusionEstimate, RemainingByDate};
use chrono::NaiveDate;

/// Straight-line extrapolation of the remaining-files series.
///
/// Velocity is the drop between the first and last observation divided by the
/// business days in between; there is no smoothing or outlier handling.
pub struct BasicOracle<'a> {
    calendar: &'a dyn BusinessCalendar,
}

impl<'a> BasicOracle<'a> {
    pub fn new(calendar: &'a dyn BusinessCalendar) -> Self {
        Self { calendar }
    }

    pub fn predict(&self, remaining: &RemainingByDate, today: NaiveDate) -> Result<ConclusionEstimate> {
        let (Some((&start_date, &first)), Some((&end_date, &last))) =
            (remaining.first_key_value(), remaining.last_key_value())
        else {
            return Err(StatsError::EmptyDateRange);
        };

        let business_days_elapsed = business_days_between(self.calendar, start_date, end_date);
        if business_days_elapsed == 0 {
            return Err(StatsError::EmptyDateRange);
        }

        let files_refactored = first as i64 - last as i64;
        let velocity = files_refactored as f64 / business_days_elapsed as f64;

        let days_left = (velocity > 0.0).then(|| (last as f64 / velocity).round() as i64);
        let projected_completion = days_left.map(|days| add_business_days(self.calendar, today, days));

        tracing::debug!(velocity, ?days_left, ?projected_completion, "completion estimate");

        Ok(ConclusionEstimate {
            start_date,
            end_date,
            files_remaining: last,
            files_refactored,
            business_days_elapsed,
            velocity,
            days_left,
            projected_completion,
        })
    }
}
