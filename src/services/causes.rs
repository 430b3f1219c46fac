use crate::domain::metric::{CauseIndicator, Severity};
use crate::domain::period::Period;
use crate::domain::task::Task;
use crate::services::config::AnalyticsConfig;

/// Input shared by every cause rule.
pub struct CauseContext<'a> {
    pub tasks: &'a [&'a Task],
    pub period: &'a Period,
    pub config: &'a AnalyticsConfig,
}

/// One disruption pattern. A rule returns `None` when the pattern is absent.
pub trait CauseRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, context: &CauseContext<'_>) -> Option<CauseIndicator>;
}

/// Tasks planned inside the period with an upstream task that completed after
/// the planned date. Upstream tasks that never completed are not counted.
pub struct DependencyDelayRule;

impl DependencyDelayRule {
    pub const HIGH_SEVERITY_ABOVE: usize = 3;
}

impl CauseRule for DependencyDelayRule {
    fn name(&self) -> &'static str {
        "dependency_delay"
    }

    fn evaluate(&self, context: &CauseContext<'_>) -> Option<CauseIndicator> {
        let count = context
            .tasks
            .iter()
            .filter(|task| match task.planned_date {
                Some(planned) if context.period.contains(planned) => task
                    .dependencies
                    .iter()
                    .any(|edge| edge.completed_at.is_some_and(|done| done > planned)),
                _ => false,
            })
            .count();
        if count == 0 {
            return None;
        }

        let severity = if count > Self::HIGH_SEVERITY_ABOVE {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(CauseIndicator {
            name: self.name().to_string(),
            description: format!(
                "{count} task(s) missed their planned date because a dependency finished late"
            ),
            severity,
            impacted_metrics: vec!["velocity".to_string(), "blockedRatio".to_string()],
            count,
        })
    }
}

/// Urgent work created during the period, pulling focus from planned tasks.
pub struct UrgentLoadRule;

impl UrgentLoadRule {
    pub const HIGH_SEVERITY_ABOVE: usize = 2;
}

impl CauseRule for UrgentLoadRule {
    fn name(&self) -> &'static str {
        "urgent_task_load"
    }

    fn evaluate(&self, context: &CauseContext<'_>) -> Option<CauseIndicator> {
        let count = context
            .tasks
            .iter()
            .filter(|task| task.has_priority(&context.config.urgent_priority))
            .filter(|task| context.period.contains_opt(task.created_at))
            .count();
        if count == 0 {
            return None;
        }

        let severity = if count > Self::HIGH_SEVERITY_ABOVE {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(CauseIndicator {
            name: self.name().to_string(),
            description: format!("{count} urgent task(s) were raised during the period"),
            severity,
            impacted_metrics: vec![
                "completionRate".to_string(),
                "velocity".to_string(),
                "focusRate".to_string(),
            ],
            count,
        })
    }
}

pub fn default_rules() -> Vec<Box<dyn CauseRule>> {
    vec![Box::new(DependencyDelayRule), Box::new(UrgentLoadRule)]
}

/// Runs every rule and ranks the findings, most severe first. Ties keep rule order.
pub fn analyze_causes(
    rules: &[Box<dyn CauseRule>],
    context: &CauseContext<'_>,
) -> Vec<CauseIndicator> {
    let mut indicators: Vec<CauseIndicator> = rules
        .iter()
        .filter_map(|rule| rule.evaluate(context))
        .collect();
    indicators.sort_by(|a, b| b.severity.cmp(&a.severity));
    indicators
}
