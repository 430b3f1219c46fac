use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    /// Deltas within +/-0.1 are rounding noise and count as neutral.
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.1 {
            Trend::Up
        } else if delta < -0.1 {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        }
    }
}

/// One report figure compared against the preceding period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub value: f64,
    pub unit: String,
    pub trend: Trend,
    pub delta: f64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseIndicator {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub impacted_metrics: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub predicted_completion_date: Option<DateTime<Utc>>,
    pub weeks_remaining: Option<f64>,
    pub risk_level: RiskLevel,
    /// 80 when there is any velocity to extrapolate from, 0 otherwise.
    /// A coarse signal, not a probability.
    pub confidence_score: u8,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityMetrics {
    pub completion_rate: f64,
    pub on_time_rate: f64,
    pub focus_rate: f64,
    pub urgent_rate: f64,
    pub dependency_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityResult {
    pub score: i64,
    pub metrics: ProductivityMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub velocity: MetricResult,
    pub completion_rate: MetricResult,
    pub blocked_ratio: MetricResult,
    pub overdue_tasks: MetricResult,
    pub overall_risk: RiskLevel,
}

/// Suggested follow-up for a report. Nothing produces these yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub summary: ReportSummary,
    pub productivity: ProductivityResult,
    pub causes: Vec<CauseIndicator>,
    pub forecast: ForecastResult,
    pub actions: Vec<Recommendation>,
}

/// Rounds to one decimal place, the precision of every reported number.
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}
