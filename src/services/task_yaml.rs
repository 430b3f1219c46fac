use std::collections::HashMap;
use std::io;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::scope::{EntityType, ReportScope, TaskFilter};
use crate::domain::task::{DependencyEdge, Task, TaskId};
use crate::services::task_source::{AccessDecision, AccessPolicy, DataSourceError, TaskSource};

#[derive(Error, Debug)]
pub enum TaskYamlError {
    #[error("failed to read task yaml: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse task yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("missing task id")]
    MissingTaskId,
    #[error("invalid date format: {0}")]
    InvalidDate(String),
}

#[derive(Serialize, Deserialize)]
struct SnapshotRecord {
    tasks: Vec<TaskRecord>,
}

#[derive(Serialize, Deserialize)]
struct TaskRecord {
    id: String,
    project: Option<String>,
    team: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    estimated_hours: Option<f64>,
    due_date: Option<String>,
    planned_date: Option<String>,
    created_at: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
    #[serde(default)]
    assignees: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

pub fn load_tasks_from_yaml_file(path: &str) -> Result<Vec<Task>, TaskYamlError> {
    let contents = std::fs::read_to_string(path)?;
    deserialize_tasks_from_yaml_str(&contents)
}

/// Parses a snapshot and resolves each dependency id against the other tasks
/// in it, copying the upstream status and completion time onto the edge.
pub fn deserialize_tasks_from_yaml_str(input: &str) -> Result<Vec<Task>, TaskYamlError> {
    let record: SnapshotRecord = serde_yaml::from_str(input)?;
    let mut tasks = Vec::with_capacity(record.tasks.len());
    let mut dependency_ids = Vec::with_capacity(record.tasks.len());

    for task_record in record.tasks {
        if task_record.id.trim().is_empty() {
            return Err(TaskYamlError::MissingTaskId);
        }

        let mut task = Task::new(task_record.id);
        task.project = task_record.project;
        task.team = task_record.team;
        task.status = task_record.status;
        task.priority = task_record.priority;
        task.estimated_hours = task_record.estimated_hours;
        task.due_date = parse_timestamp_opt(task_record.due_date.as_deref())?;
        task.planned_date = parse_timestamp_opt(task_record.planned_date.as_deref())?;
        task.created_at = parse_timestamp_opt(task_record.created_at.as_deref())?;
        task.started_at = parse_timestamp_opt(task_record.started_at.as_deref())?;
        task.completed_at = parse_timestamp_opt(task_record.completed_at.as_deref())?;
        task.assignees = task_record.assignees;
        dependency_ids.push(task_record.dependencies);
        tasks.push(task);
    }

    let upstream: HashMap<String, (Option<String>, Option<DateTime<Utc>>)> = tasks
        .iter()
        .map(|task| {
            (
                task.task_id.id.clone(),
                (task.status.clone(), task.completed_at),
            )
        })
        .collect();

    for (task, ids) in tasks.iter_mut().zip(dependency_ids) {
        task.dependencies = ids
            .into_iter()
            .map(|id| {
                let (status, completed_at) = upstream.get(&id).cloned().unwrap_or((None, None));
                DependencyEdge {
                    task_id: TaskId::new(id),
                    status,
                    completed_at,
                }
            })
            .collect();
    }

    Ok(tasks)
}

pub fn serialize_tasks_to_yaml<W: io::Write>(
    writer: &mut W,
    tasks: &[Task],
) -> io::Result<()> {
    let record = SnapshotRecord {
        tasks: tasks.iter().map(task_to_record).collect(),
    };
    let yaml =
        serde_yaml::to_string(&record).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writer.write_all(yaml.as_bytes())
}

fn task_to_record(task: &Task) -> TaskRecord {
    TaskRecord {
        id: task.task_id.id.clone(),
        project: task.project.clone(),
        team: task.team.clone(),
        status: task.status.clone(),
        priority: task.priority.clone(),
        estimated_hours: task.estimated_hours,
        due_date: task.due_date.map(|date| date.to_rfc3339()),
        planned_date: task.planned_date.map(|date| date.to_rfc3339()),
        created_at: task.created_at.map(|date| date.to_rfc3339()),
        started_at: task.started_at.map(|date| date.to_rfc3339()),
        completed_at: task.completed_at.map(|date| date.to_rfc3339()),
        assignees: task.assignees.clone(),
        dependencies: task
            .dependencies
            .iter()
            .map(|edge| edge.task_id.id.clone())
            .collect(),
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, TaskYamlError> {
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| TaskYamlError::InvalidDate(text.to_string()))
}

fn parse_timestamp_opt(value: Option<&str>) -> Result<Option<DateTime<Utc>>, TaskYamlError> {
    let text = match value {
        Some(text) => text,
        None => return Ok(None),
    };
    parse_timestamp(text).map(Some)
}

/// A snapshot file acting as the data collaborator.
#[derive(Debug, Clone, Default)]
pub struct YamlTaskSource {
    tasks: Vec<Task>,
}

impl YamlTaskSource {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn load(path: &str) -> Result<Self, TaskYamlError> {
        Ok(Self::new(load_tasks_from_yaml_file(path)?))
    }

    fn knows(&self, scope: &ReportScope) -> bool {
        match scope.filter() {
            Some(TaskFilter::All) => true,
            Some(filter) => self.tasks.iter().any(|task| filter.matches(task)),
            None => false,
        }
    }
}

impl TaskSource for YamlTaskSource {
    async fn fetch_tasks(
        &self,
        filter: &TaskFilter,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Task>, DataSourceError> {
        Ok(self
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .filter(|task| task.created_at.is_none_or(|created| created <= period_end))
            .cloned()
            .collect())
    }
}

impl AccessPolicy for YamlTaskSource {
    /// Whoever can read the file may see its analytics; unknown ids are not found.
    async fn check_access(&self, _caller: &str, scope: &ReportScope) -> AccessDecision {
        if scope.entity_type == EntityType::Global || self.knows(scope) {
            AccessDecision::Granted
        } else {
            AccessDecision::NotFound
        }
    }
}
