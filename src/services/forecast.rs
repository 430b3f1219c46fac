//! Deterministic completion forecast.
//!
//! Remaining effort divided by the mean velocity of the last two periods gives
//! the number of weeks left. Risk is an additive score over a few warning
//! signs. The confidence score only says whether there was any velocity to
//! extrapolate from; it is not a statistical confidence.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::metric::{ForecastResult, RiskLevel, round1};
use crate::domain::task::{StatusTaxonomy, Task};
use crate::services::metrics;

pub const DAYS_PER_WEEK: f64 = 7.0;
pub const ZERO_VELOCITY_RISK: u32 = 5;
pub const BLOCKED_RISK: u32 = 3;
pub const GROWING_BACKLOG_RISK: u32 = 2;
pub const BLOCKED_RATIO_THRESHOLD: f64 = 0.10;
pub const HIGH_RISK_SCORE: u32 = 6;
pub const MEDIUM_RISK_SCORE: u32 = 3;
pub const VELOCITY_CONFIDENCE: u8 = 80;

pub struct ForecastInput<'a> {
    /// Tasks that are not final at report time.
    pub active_tasks: &'a [&'a Task],
    /// Hours completed in the analysed period.
    pub velocity_current: f64,
    /// Hours completed in the preceding period.
    pub velocity_previous: f64,
    pub overdue_current: usize,
    pub overdue_previous: usize,
    pub now: DateTime<Utc>,
}

pub fn risk_level(risk_score: u32) -> RiskLevel {
    if risk_score >= HIGH_RISK_SCORE {
        RiskLevel::High
    } else if risk_score >= MEDIUM_RISK_SCORE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// `now` plus the weeks rounded up to whole days, or `None` when the date
/// cannot be represented.
fn completion_date(now: DateTime<Utc>, weeks: f64) -> Option<DateTime<Utc>> {
    let days = (weeks * DAYS_PER_WEEK).ceil();
    if !days.is_finite() || days >= i64::MAX as f64 {
        return None;
    }
    Duration::try_days(days as i64).and_then(|offset| now.checked_add_signed(offset))
}

pub fn forecast(input: &ForecastInput<'_>, taxonomy: &StatusTaxonomy) -> ForecastResult {
    let remaining_hours: f64 = input.active_tasks.iter().map(|task| task.effort_hours()).sum();
    let avg_velocity = (input.velocity_current + input.velocity_previous) / 2.0;

    let mut risk_score = 0;
    let mut risk_factors = Vec::new();
    let mut weeks_remaining = None;
    let mut predicted_completion_date = None;

    if remaining_hours > 0.0 {
        if avg_velocity > 0.0 {
            let weeks = remaining_hours / avg_velocity;
            if weeks.is_finite() {
                weeks_remaining = Some(round1(weeks));
            }
            predicted_completion_date = completion_date(input.now, weeks);
            if predicted_completion_date.is_none() {
                risk_factors.push(format!(
                    "completion date out of range: {} hour(s) remaining at {} hour(s) per week",
                    round1(remaining_hours),
                    round1(avg_velocity)
                ));
            }
        } else {
            risk_score += ZERO_VELOCITY_RISK;
            risk_factors.push(format!(
                "zero velocity: {} hour(s) remaining with no work completed in two periods",
                round1(remaining_hours)
            ));
        }
    }

    let blocked = metrics::blocked_ratio(input.active_tasks, taxonomy);
    if blocked > BLOCKED_RATIO_THRESHOLD {
        risk_score += BLOCKED_RISK;
        risk_factors.push(format!(
            "high blocked ratio: {}% of active tasks wait on unfinished dependencies",
            round1(blocked * 100.0)
        ));
    }

    if input.overdue_current > input.overdue_previous {
        risk_score += GROWING_BACKLOG_RISK;
        risk_factors.push(format!(
            "growing overdue backlog: {} overdue task(s), up from {}",
            input.overdue_current, input.overdue_previous
        ));
    }

    debug!(
        remaining_hours,
        avg_velocity, risk_score, "computed completion forecast"
    );

    ForecastResult {
        predicted_completion_date,
        weeks_remaining,
        risk_level: risk_level(risk_score),
        confidence_score: if avg_velocity > 0.0 {
            VELOCITY_CONFIDENCE
        } else {
            0
        },
        risk_factors,
    }
}
