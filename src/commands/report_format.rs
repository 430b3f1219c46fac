use crate::domain::metric::{MetricResult, ReportResult, RiskLevel, Severity};
use crate::domain::period::Period;
use crate::domain::scope::ReportScope;

pub fn format_report(report: &ReportResult, scope: &ReportScope, period: &Period) -> String {
    let entity = match &scope.entity_id {
        Some(id) => format!("{} {}", scope.entity_type, id),
        None => scope.entity_type.to_string(),
    };
    let completion = match report.forecast.predicted_completion_date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "n/a".to_string(),
    };
    let weeks = match report.forecast.weeks_remaining {
        Some(value) => format!("{value:.1}"),
        None => "n/a".to_string(),
    };

    let mut lines = Vec::new();
    lines.push("Analytics Report".to_string());
    lines.push(format!("Scope: {entity}"));
    lines.push(format!(
        "Period: {} .. {}",
        period.start.format("%Y-%m-%d"),
        period.end.format("%Y-%m-%d")
    ));
    lines.push(format!("Productivity score: {}", report.productivity.score));
    lines.push(format!("Overall risk: {}", risk_label(report.summary.overall_risk)));
    lines.push(String::new());
    lines.push("Metric | Value | Change | Trend".to_string());
    lines.push("-------|-------|--------|------".to_string());
    lines.push(format_metric_row("Velocity", &report.summary.velocity));
    lines.push(format_metric_row("Completion rate", &report.summary.completion_rate));
    lines.push(format_metric_row("Blocked ratio", &report.summary.blocked_ratio));
    lines.push(format_metric_row("Overdue tasks", &report.summary.overdue_tasks));
    lines.push(String::new());
    lines.push("Causes:".to_string());
    if report.causes.is_empty() {
        lines.push("none".to_string());
    }
    for cause in &report.causes {
        lines.push(format!(
            "[{}] {}: {}",
            severity_label(cause.severity),
            cause.name,
            cause.description
        ));
    }
    lines.push(String::new());
    lines.push("Forecast:".to_string());
    lines.push(format!("Predicted completion: {completion}"));
    lines.push(format!("Weeks remaining: {weeks}"));
    lines.push(format!("Confidence: {}", report.forecast.confidence_score));
    for factor in &report.forecast.risk_factors {
        lines.push(format!("Risk: {factor}"));
    }

    lines.join("\n")
}

fn format_metric_row(label: &str, metric: &MetricResult) -> String {
    format!(
        "{label} | {value} {unit} | {delta:+} ({percent}%) | {arrow}",
        value = metric.value,
        unit = metric.unit,
        delta = metric.delta,
        percent = metric.percent_change,
        arrow = metric.trend.as_str(),
    )
}

fn risk_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
    }
}
