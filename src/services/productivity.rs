use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use crate::domain::metric::{ProductivityMetrics, ProductivityResult};
use crate::domain::period::Period;
use crate::domain::scope::TaskFilter;
use crate::domain::task::Task;
use crate::services::config::AnalyticsConfig;
use crate::services::metrics;

/// Weights in percentage points; they add up to exactly 100.
pub const COMPLETION_WEIGHT: u32 = 30;
pub const ON_TIME_WEIGHT: u32 = 25;
pub const FOCUS_WEIGHT: u32 = 15;
pub const DEPENDENCY_WEIGHT: u32 = 15;
pub const URGENT_WEIGHT: u32 = 15;

pub fn weighted_score(metrics: &ProductivityMetrics) -> f64 {
    let weighted = metrics.completion_rate * COMPLETION_WEIGHT as f64
        + metrics.on_time_rate * ON_TIME_WEIGHT as f64
        + metrics.focus_rate * FOCUS_WEIGHT as f64
        + metrics.dependency_rate * DEPENDENCY_WEIGHT as f64
        + metrics.urgent_rate * URGENT_WEIGHT as f64;
    weighted / 100.0
}

/// Computes the five rates for the tasks matching `filter`, unrounded.
pub fn productivity_metrics(
    tasks: &[Task],
    filter: &TaskFilter,
    period: &Period,
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> ProductivityMetrics {
    let selected = filter.select(tasks);
    let taxonomy = config.taxonomy();

    ProductivityMetrics {
        completion_rate: metrics::completion_rate(&selected, period, &taxonomy),
        on_time_rate: metrics::on_time_rate(&selected, period),
        focus_rate: metrics::focus_rate(&selected, period),
        urgent_rate: metrics::urgent_response_rate(&selected, period, &config.urgent_priority),
        dependency_rate: metrics::dependency_health(&selected, now, &taxonomy),
    }
}

/// Scores one entity. The same path serves project, user, team and global scope.
pub fn score_productivity(
    tasks: &[Task],
    filter: &TaskFilter,
    period: &Period,
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> ProductivityResult {
    let raw = productivity_metrics(tasks, filter, period, now, config);
    let score = weighted_score(&raw).round() as i64;
    debug!(
        entity_type = %filter.entity_type(),
        entity_id = filter.entity_id().unwrap_or("-"),
        score,
        "scored productivity"
    );

    ProductivityResult {
        score,
        metrics: ProductivityMetrics {
            completion_rate: raw.completion_rate.round(),
            on_time_rate: raw.on_time_rate.round(),
            focus_rate: raw.focus_rate.round(),
            urgent_rate: raw.urgent_rate.round(),
            dependency_rate: raw.dependency_rate.round(),
        },
    }
}

/// Scores every filter independently and in parallel. Results keep the input order.
pub fn score_many(
    tasks: &[Task],
    filters: &[TaskFilter],
    period: &Period,
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> Vec<(TaskFilter, ProductivityResult)> {
    filters
        .par_iter()
        .map(|filter| {
            let result = score_productivity(tasks, filter, period, now, config);
            (filter.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        at, build_completed_task, build_open_task, build_urgent_task, in_project, march_2026,
    };

    #[test]
    fn weights_add_up_to_one() {
        let total =
            COMPLETION_WEIGHT + ON_TIME_WEIGHT + FOCUS_WEIGHT + DEPENDENCY_WEIGHT + URGENT_WEIGHT;
        assert_eq!(total, 100);

        let perfect = ProductivityMetrics {
            completion_rate: 100.0,
            on_time_rate: 100.0,
            focus_rate: 100.0,
            urgent_rate: 100.0,
            dependency_rate: 100.0,
        };
        assert_eq!(weighted_score(&perfect), 100.0);
    }

    #[test]
    fn half_completed_on_time_scenario() {
        let period = march_2026();
        let now = at("2026-03-31T12:00:00Z");
        let mut tasks = Vec::new();
        for idx in 0..5 {
            tasks.push(build_completed_task(
                &format!("D-{idx}"),
                2.0,
                "2026-03-20T17:00:00Z",
                "2026-03-10T10:00:00Z",
            ));
        }
        for idx in 0..5 {
            tasks.push(build_open_task(&format!("O-{idx}"), 2.0, "2026-04-10T17:00:00Z"));
        }
        // Open tasks must be relevant to the period to count as active.
        for task in tasks.iter_mut().skip(5) {
            task.planned_date = Some(at("2026-03-25T09:00:00Z"));
        }

        let result = score_productivity(
            &tasks,
            &TaskFilter::All,
            &period,
            now,
            &AnalyticsConfig::default(),
        );

        assert_eq!(result.metrics.completion_rate, 50.0);
        assert_eq!(result.metrics.on_time_rate, 100.0);
        assert_eq!(result.metrics.urgent_rate, 100.0);
        assert_eq!(result.metrics.dependency_rate, 100.0);
        // Five planned tasks, none finished on their planned day.
        assert_eq!(result.metrics.focus_rate, 0.0);
        let expected: f64 = 50.0 * 0.30 + 100.0 * 0.25 + 0.0 * 0.15 + 100.0 * 0.15 + 100.0 * 0.15;
        assert_eq!(result.score, expected.round() as i64);
    }

    #[test]
    fn empty_scope_scores_full_marks() {
        let result = score_productivity(
            &[],
            &TaskFilter::Project("ghost".into()),
            &march_2026(),
            at("2026-03-31T12:00:00Z"),
            &AnalyticsConfig::default(),
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.metrics.completion_rate, 100.0);
        assert_eq!(result.metrics.on_time_rate, 100.0);
        assert_eq!(result.metrics.focus_rate, 100.0);
    }

    #[test]
    fn filter_limits_the_scored_tasks() {
        let period = march_2026();
        let now = at("2026-03-31T12:00:00Z");
        let tasks = vec![
            in_project(
                build_completed_task("A-1", 1.0, "2026-03-05T17:00:00Z", "2026-03-04T10:00:00Z"),
                "alpha",
            ),
            in_project(build_open_task("B-1", 1.0, "2026-03-05T17:00:00Z"), "beta"),
        ];
        let config = AnalyticsConfig::default();

        let alpha = TaskFilter::Project("alpha".into());
        let beta = TaskFilter::Project("beta".into());
        let alpha = score_productivity(&tasks, &alpha, &period, now, &config);
        let beta = score_productivity(&tasks, &beta, &period, now, &config);
        assert_eq!(alpha.metrics.completion_rate, 100.0);
        assert_eq!(beta.metrics.completion_rate, 0.0);
    }

    #[test]
    fn score_many_keeps_input_order() {
        let period = march_2026();
        let now = at("2026-03-31T12:00:00Z");
        let tasks = vec![
            in_project(
                build_urgent_task("U-1", "2026-03-02T08:00:00Z", Some("2026-03-04T08:00:00Z")),
                "alpha",
            ),
            in_project(
                build_urgent_task("U-2", "2026-03-02T08:00:00Z", Some("2026-03-02T09:00:00Z")),
                "beta",
            ),
        ];
        let filters = vec![
            TaskFilter::Project("alpha".into()),
            TaskFilter::Project("beta".into()),
            TaskFilter::All,
        ];

        let results = score_many(&tasks, &filters, &period, now, &AnalyticsConfig::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, TaskFilter::Project("alpha".into()));
        assert_eq!(results[0].1.metrics.urgent_rate, 0.0);
        assert_eq!(results[1].1.metrics.urgent_rate, 100.0);
        assert_eq!(results[2].1.metrics.urgent_rate, 50.0);
    }
}
