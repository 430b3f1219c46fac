//! Rate metrics over a single period's task set.
//!
//! Every rate is a percentage in `[0, 100]`. When there is nothing to measure
//! (no active, completed, planned or urgent tasks) a rate falls back to 100:
//! no expected work is not a failure. Missing optional fields make a task
//! "not applicable" for the metric instead of failing the computation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::period::Period;
use crate::domain::task::{StatusTaxonomy, Task};

pub const NEUTRAL_RATE: f64 = 100.0;
pub const BLOCKING_PENALTY: f64 = 20.0;

fn percentage(part: usize, whole: usize) -> f64 {
    (part as f64 / whole as f64) * 100.0
}

/// A task is relevant to a period when its due, planned or completion date falls inside it.
pub fn is_active_in(task: &Task, period: &Period) -> bool {
    period.contains_opt(task.due_date)
        || period.contains_opt(task.planned_date)
        || period.contains_opt(task.completed_at)
}

pub fn completion_rate(tasks: &[&Task], period: &Period, taxonomy: &StatusTaxonomy) -> f64 {
    let active: Vec<&&Task> = tasks.iter().filter(|task| is_active_in(task, period)).collect();
    if active.is_empty() {
        debug!(metric = "completion_rate", "no active tasks, using neutral rate");
        return NEUTRAL_RATE;
    }
    let done = active
        .iter()
        .filter(|task| taxonomy.is_task_final(task))
        .count();
    percentage(done, active.len())
}

/// A completion without a due date counts as on time.
pub fn on_time_rate(tasks: &[&Task], period: &Period) -> f64 {
    let completed: Vec<&&Task> = tasks
        .iter()
        .filter(|task| period.contains_opt(task.completed_at))
        .collect();
    if completed.is_empty() {
        debug!(metric = "on_time_rate", "no completions, using neutral rate");
        return NEUTRAL_RATE;
    }
    let on_time = completed
        .iter()
        .filter(|task| match (task.completed_at, task.due_date) {
            (Some(completed_at), Some(due_date)) => completed_at <= due_date,
            _ => true,
        })
        .count();
    percentage(on_time, completed.len())
}

/// Share of tasks planned inside the period that were completed on their planned UTC day.
pub fn focus_rate(tasks: &[&Task], period: &Period) -> f64 {
    let planned: Vec<&&Task> = tasks
        .iter()
        .filter(|task| period.contains_opt(task.planned_date))
        .collect();
    if planned.is_empty() {
        debug!(metric = "focus_rate", "no planned tasks, using neutral rate");
        return NEUTRAL_RATE;
    }
    let kept = planned
        .iter()
        .filter(|task| match (task.planned_date, task.completed_at) {
            (Some(planned_date), Some(completed_at)) => {
                planned_date.date_naive() == completed_at.date_naive()
            }
            _ => false,
        })
        .count();
    percentage(kept, planned.len())
}

/// Step score for the time between an urgent task's creation and its start.
pub fn urgent_latency_score(latency_hours: f64) -> f64 {
    if latency_hours <= 2.0 {
        100.0
    } else if latency_hours <= 4.0 {
        80.0
    } else if latency_hours <= 8.0 {
        50.0
    } else if latency_hours <= 24.0 {
        20.0
    } else {
        0.0
    }
}

pub fn urgent_response_rate(tasks: &[&Task], period: &Period, urgent_priority: &str) -> f64 {
    let scores: Vec<f64> = tasks
        .iter()
        .filter(|task| task.has_priority(urgent_priority))
        .filter(|task| period.contains_opt(task.created_at))
        .filter_map(|task| match (task.created_at, task.started_at) {
            (Some(created_at), Some(started_at)) => {
                let latency = started_at - created_at;
                Some(urgent_latency_score(
                    latency.num_milliseconds() as f64 / 3_600_000.0,
                ))
            }
            _ => None,
        })
        .collect();
    if scores.is_empty() {
        debug!(metric = "urgent_rate", "no started urgent tasks, using neutral rate");
        return NEUTRAL_RATE;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Non-final tasks past their due date that some other task in the set depends on.
pub fn overdue_blocking_count(
    tasks: &[&Task],
    now: DateTime<Utc>,
    taxonomy: &StatusTaxonomy,
) -> usize {
    let depended_on: HashSet<&str> = tasks
        .iter()
        .flat_map(|task| task.dependencies.iter())
        .map(|edge| edge.task_id.id.as_str())
        .collect();

    tasks
        .iter()
        .filter(|task| !taxonomy.is_task_final(task))
        .filter(|task| task.due_date.is_some_and(|due| due < now))
        .filter(|task| depended_on.contains(task.task_id.id.as_str()))
        .count()
}

pub fn dependency_health(tasks: &[&Task], now: DateTime<Utc>, taxonomy: &StatusTaxonomy) -> f64 {
    let blocking = overdue_blocking_count(tasks, now, taxonomy);
    (100.0 - BLOCKING_PENALTY * blocking as f64).max(0.0)
}

/// Estimated hours of the tasks completed inside the period.
pub fn velocity(tasks: &[&Task], period: &Period) -> f64 {
    tasks
        .iter()
        .filter(|task| period.contains_opt(task.completed_at))
        .map(|task| task.effort_hours())
        .sum()
}

/// Fraction (0..=1) of non-final tasks with at least one incomplete dependency.
pub fn blocked_ratio(tasks: &[&Task], taxonomy: &StatusTaxonomy) -> f64 {
    let active: Vec<&&Task> = tasks
        .iter()
        .filter(|task| !taxonomy.is_task_final(task))
        .collect();
    if active.is_empty() {
        return 0.0;
    }
    let blocked = active
        .iter()
        .filter(|task| {
            task.dependencies
                .iter()
                .any(|edge| taxonomy.is_dependency_open(edge))
        })
        .count();
    blocked as f64 / active.len() as f64
}

/// Tasks due inside the period, already past due at `now`, and not completed by their due date.
pub fn overdue_count(tasks: &[&Task], period: &Period, now: DateTime<Utc>) -> usize {
    tasks
        .iter()
        .filter(|task| match task.due_date {
            Some(due) if period.contains(due) && due < now => match task.completed_at {
                Some(completed_at) => completed_at > due,
                None => true,
            },
            _ => false,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        at, build_completed_task, build_open_task, build_urgent_task, depends_on, march_2026,
    };

    fn refs(tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().collect()
    }

    #[test]
    fn empty_task_set_yields_neutral_rates() {
        let period = march_2026();
        let taxonomy = StatusTaxonomy::default();
        let tasks: Vec<&Task> = Vec::new();

        assert_eq!(completion_rate(&tasks, &period, &taxonomy), 100.0);
        assert_eq!(on_time_rate(&tasks, &period), 100.0);
        assert_eq!(focus_rate(&tasks, &period), 100.0);
        assert_eq!(urgent_response_rate(&tasks, &period, "urgent"), 100.0);
        assert_eq!(
            dependency_health(&tasks, at("2026-03-31T00:00:00Z"), &taxonomy),
            100.0
        );
    }

    fn inconsistent_tasks() -> Vec<Task> {
        let mut completed_before_created =
            build_completed_task("T-1", 2.0, "2026-03-20T17:00:00Z", "2026-03-05T10:00:00Z");
        completed_before_created.created_at = Some(at("2026-03-10T09:00:00Z"));
        completed_before_created.planned_date = Some(at("2026-03-05T09:00:00Z"));

        let mut started_before_created =
            build_urgent_task("U-1", "2026-03-10T10:00:00Z", Some("2026-03-10T08:00:00Z"));
        started_before_created.planned_date = Some(at("2026-03-10T09:00:00Z"));

        let mut completed_after_period =
            build_completed_task("T-2", 3.0, "2026-03-20T17:00:00Z", "2026-04-15T10:00:00Z");
        completed_after_period.planned_date = Some(at("2026-03-18T09:00:00Z"));

        let mut final_without_completion = build_open_task("T-3", 1.0, "2026-03-15T17:00:00Z");
        final_without_completion.status = Some("Cancelled".to_string());

        let mut waits_on_cancelled = build_open_task("T-4", 1.0, "2026-03-25T17:00:00Z");
        depends_on(&mut waits_on_cancelled, &final_without_completion);

        vec![
            completed_before_created,
            started_before_created,
            completed_after_period,
            final_without_completion,
            waits_on_cancelled,
        ]
    }

    #[test]
    fn rates_stay_in_range_for_inconsistent_tasks() {
        let period = march_2026();
        let now = at("2026-04-01T12:00:00Z");
        let taxonomy = StatusTaxonomy::default();
        let all = inconsistent_tasks();

        let mut test_cases: Vec<(String, Vec<Task>)> = all
            .iter()
            .map(|task| (task.task_id.id.clone(), vec![task.clone()]))
            .collect();
        test_cases.push(("mixed".to_string(), all.clone()));

        for (label, tasks) in test_cases {
            let tasks = refs(&tasks);
            let rates = [
                ("completion", completion_rate(&tasks, &period, &taxonomy)),
                ("on_time", on_time_rate(&tasks, &period)),
                ("focus", focus_rate(&tasks, &period)),
                ("urgent", urgent_response_rate(&tasks, &period, "urgent")),
                ("dependency", dependency_health(&tasks, now, &taxonomy)),
            ];
            for (metric, rate) in rates {
                assert!(
                    (0.0..=100.0).contains(&rate),
                    "Expected {} rate in [0, 100] for {}, got {}",
                    metric,
                    label,
                    rate
                );
            }
        }
    }

    #[test]
    fn inconsistent_timestamps_are_scored_as_given() {
        let period = march_2026();
        let taxonomy = StatusTaxonomy::default();
        let all = inconsistent_tasks();

        // Started two hours before it was created: negative latency scores 100.
        assert_eq!(urgent_response_rate(&refs(&all[1..2]), &period, "urgent"), 100.0);

        // Final status counts for completion even when the completion lies after the period,
        // but the completion itself is outside the on-time and focus windows.
        let late = refs(&all[2..3]);
        assert_eq!(completion_rate(&late, &period, &taxonomy), 100.0);
        assert_eq!(on_time_rate(&late, &period), 100.0);
        assert_eq!(focus_rate(&late, &period), 0.0);

        // Completed before it was created, still inside the period and before its due date.
        let early = refs(&all[0..1]);
        assert_eq!(on_time_rate(&early, &period), 100.0);
        assert_eq!(focus_rate(&early, &period), 100.0);
    }

    #[test]
    fn completion_rate_counts_final_tasks_among_active_ones() {
        let period = march_2026();
        let tasks = vec![
            build_completed_task("T-1", 2.0, "2026-03-05T17:00:00Z", "2026-03-04T10:00:00Z"),
            build_open_task("T-2", 2.0, "2026-03-10T17:00:00Z"),
            build_open_task("T-3", 2.0, "2026-03-12T17:00:00Z"),
            build_open_task("T-4", 2.0, "2026-03-20T17:00:00Z"),
            // Outside the period entirely.
            build_open_task("T-5", 2.0, "2026-05-01T17:00:00Z"),
        ];

        let rate = completion_rate(&refs(&tasks), &period, &StatusTaxonomy::default());
        assert_eq!(rate, 25.0);
    }

    #[test]
    fn on_time_rate_treats_missing_due_date_as_on_time() {
        let period = march_2026();
        let mut no_due =
            build_completed_task("T-3", 1.0, "2026-03-01T00:00:00Z", "2026-03-09T10:00:00Z");
        no_due.due_date = None;
        let tasks = vec![
            build_completed_task("T-1", 1.0, "2026-03-05T17:00:00Z", "2026-03-04T10:00:00Z"),
            build_completed_task("T-2", 1.0, "2026-03-05T17:00:00Z", "2026-03-06T10:00:00Z"),
            no_due,
            build_completed_task("T-4", 1.0, "2026-03-05T17:00:00Z", "2026-03-05T17:00:00Z"),
        ];

        assert_eq!(on_time_rate(&refs(&tasks), &period), 75.0);
    }

    #[test]
    fn focus_rate_compares_utc_calendar_days() {
        let period = march_2026();
        let mut same_day = Task::new("T-1");
        same_day.planned_date = Some(at("2026-03-10T08:00:00Z"));
        same_day.completed_at = Some(at("2026-03-10T23:30:00Z"));
        let mut next_day = Task::new("T-2");
        next_day.planned_date = Some(at("2026-03-10T08:00:00Z"));
        next_day.completed_at = Some(at("2026-03-11T00:30:00Z"));
        let mut not_done = Task::new("T-3");
        not_done.planned_date = Some(at("2026-03-12T08:00:00Z"));
        let mut unplanned = Task::new("T-4");
        unplanned.completed_at = Some(at("2026-03-12T08:00:00Z"));

        let tasks = vec![same_day, next_day, not_done, unplanned];
        let rate = focus_rate(&refs(&tasks), &period);
        assert!((rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn urgent_latency_uses_step_function() {
        let test_cases = vec![
            (0.5, 100.0),
            (2.0, 100.0),
            (3.0, 80.0),
            (4.0, 80.0),
            (8.0, 50.0),
            (12.0, 20.0),
            (24.0, 20.0),
            (24.5, 0.0),
        ];

        for (hours, expected) in test_cases {
            assert_eq!(
                urgent_latency_score(hours),
                expected,
                "Expected score {} for latency {}h",
                expected,
                hours
            );
        }
    }

    #[test]
    fn urgent_response_rate_averages_started_urgent_tasks() {
        let period = march_2026();
        let tasks = vec![
            build_urgent_task("U-1", "2026-03-02T08:00:00Z", Some("2026-03-02T09:00:00Z")),
            build_urgent_task("U-2", "2026-03-02T08:00:00Z", Some("2026-03-02T14:00:00Z")),
            // Never started, not scored.
            build_urgent_task("U-3", "2026-03-02T08:00:00Z", None),
            // Created before the period.
            build_urgent_task("U-4", "2026-02-02T08:00:00Z", Some("2026-02-05T08:00:00Z")),
        ];

        assert_eq!(urgent_response_rate(&refs(&tasks), &period, "urgent"), 75.0);
    }

    #[test]
    fn one_overdue_blocking_task_costs_twenty_points() {
        let now = at("2026-03-20T00:00:00Z");
        let taxonomy = StatusTaxonomy::default();

        let blocker = build_open_task("T-1", 4.0, "2026-03-25T17:00:00Z");
        let mut dependent = build_open_task("T-2", 4.0, "2026-03-28T17:00:00Z");
        depends_on(&mut dependent, &blocker);
        let baseline = vec![blocker.clone(), dependent.clone()];
        assert_eq!(dependency_health(&refs(&baseline), now, &taxonomy), 100.0);

        let mut overdue_blocker = blocker;
        overdue_blocker.due_date = Some(at("2026-03-15T17:00:00Z"));
        let blocked = vec![overdue_blocker, dependent];
        assert_eq!(dependency_health(&refs(&blocked), now, &taxonomy), 80.0);
    }

    #[test]
    fn dependency_health_is_clamped_at_zero() {
        let now = at("2026-03-20T00:00:00Z");
        let mut tasks = Vec::new();
        for idx in 0..6 {
            let blocker = build_open_task(&format!("B-{idx}"), 1.0, "2026-03-01T17:00:00Z");
            let mut dependent = build_open_task(&format!("D-{idx}"), 1.0, "2026-03-30T17:00:00Z");
            depends_on(&mut dependent, &blocker);
            tasks.push(blocker);
            tasks.push(dependent);
        }

        assert_eq!(overdue_blocking_count(&refs(&tasks), now, &StatusTaxonomy::default()), 6);
        assert_eq!(dependency_health(&refs(&tasks), now, &StatusTaxonomy::default()), 0.0);
    }

    #[test]
    fn overdue_task_without_dependents_does_not_block() {
        let now = at("2026-03-20T00:00:00Z");
        let tasks = vec![build_open_task("T-1", 1.0, "2026-03-01T17:00:00Z")];
        assert_eq!(dependency_health(&refs(&tasks), now, &StatusTaxonomy::default()), 100.0);
    }

    #[test]
    fn velocity_sums_hours_completed_in_period() {
        let period = march_2026();
        let mut no_estimate =
            build_completed_task("T-3", 0.0, "2026-03-05T17:00:00Z", "2026-03-05T10:00:00Z");
        no_estimate.estimated_hours = None;
        let tasks = vec![
            build_completed_task("T-1", 3.0, "2026-03-05T17:00:00Z", "2026-03-04T10:00:00Z"),
            build_completed_task("T-2", 5.0, "2026-03-05T17:00:00Z", "2026-02-27T10:00:00Z"),
            no_estimate,
            build_completed_task("T-4", 2.5, "2026-03-05T17:00:00Z", "2026-03-30T10:00:00Z"),
        ];

        assert_eq!(velocity(&refs(&tasks), &period), 5.5);
    }

    #[test]
    fn blocked_ratio_counts_open_tasks_with_open_dependencies() {
        let taxonomy = StatusTaxonomy::default();
        let done = build_completed_task("T-0", 1.0, "2026-03-05T17:00:00Z", "2026-03-04T10:00:00Z");
        let open = build_open_task("T-1", 1.0, "2026-03-05T17:00:00Z");
        let mut waiting_on_open = build_open_task("T-2", 1.0, "2026-03-10T17:00:00Z");
        depends_on(&mut waiting_on_open, &open);
        let mut waiting_on_done = build_open_task("T-3", 1.0, "2026-03-10T17:00:00Z");
        depends_on(&mut waiting_on_done, &done);
        let plain = build_open_task("T-4", 1.0, "2026-03-10T17:00:00Z");

        let tasks = vec![done, open, waiting_on_open, waiting_on_done, plain];
        assert_eq!(blocked_ratio(&refs(&tasks), &taxonomy), 0.25);
        assert_eq!(blocked_ratio(&[], &taxonomy), 0.0);
    }

    #[test]
    fn overdue_count_includes_late_completions() {
        let period = march_2026();
        let now = at("2026-03-20T00:00:00Z");
        let tasks = vec![
            build_open_task("T-1", 1.0, "2026-03-05T17:00:00Z"),
            build_completed_task("T-2", 1.0, "2026-03-05T17:00:00Z", "2026-03-07T10:00:00Z"),
            build_completed_task("T-3", 1.0, "2026-03-05T17:00:00Z", "2026-03-04T10:00:00Z"),
            // Not yet due.
            build_open_task("T-4", 1.0, "2026-03-25T17:00:00Z"),
        ];

        assert_eq!(overdue_count(&refs(&tasks), &period, now), 2);
    }
}
