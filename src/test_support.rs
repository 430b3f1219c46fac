use chrono::{DateTime, Utc};

use crate::domain::period::Period;
use crate::domain::task::{DependencyEdge, Task, TaskId};

pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .unwrap()
        .with_timezone(&Utc)
}

/// 2026-03-01 00:00 to 2026-03-31 23:59:59.999 UTC.
pub fn march_2026() -> Period {
    Period::new(at("2026-03-01T00:00:00Z"), at("2026-03-31T23:59:59.999Z"))
}

pub fn build_open_task(id: &str, hours: f64, due: &str) -> Task {
    let mut task = Task::new(id);
    task.status = Some("in_progress".to_string());
    task.estimated_hours = Some(hours);
    task.due_date = Some(at(due));
    task.created_at = Some(at("2026-02-20T09:00:00Z"));
    task
}

pub fn build_completed_task(id: &str, hours: f64, due: &str, completed: &str) -> Task {
    let mut task = Task::new(id);
    task.status = Some("completed".to_string());
    task.estimated_hours = Some(hours);
    task.due_date = Some(at(due));
    task.created_at = Some(at("2026-02-20T09:00:00Z"));
    task.completed_at = Some(at(completed));
    task
}

pub fn build_urgent_task(id: &str, created: &str, started: Option<&str>) -> Task {
    let mut task = Task::new(id);
    task.status = Some("in_progress".to_string());
    task.priority = Some("urgent".to_string());
    task.created_at = Some(at(created));
    task.started_at = started.map(at);
    task
}

pub fn depends_on(task: &mut Task, upstream: &Task) {
    task.dependencies.push(DependencyEdge {
        task_id: TaskId::new(upstream.task_id.id.clone()),
        status: upstream.status.clone(),
        completed_at: upstream.completed_at,
    });
}

pub fn in_project(mut task: Task, project: &str) -> Task {
    task.project = Some(project.to_string());
    task
}
