use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    pub id: String,
}

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A "depends-on" edge. Carries a copy of the upstream task's status and
/// completion time as they were when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyEdge {
    pub task_id: TaskId,
    pub status: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Read-only task record as handed over by the data collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub task_id: TaskId,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub planned_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub project: Option<String>,
    pub team: Option<String>,
    pub assignees: Vec<String>,
    pub dependencies: Vec<DependencyEdge>,
}

impl Task {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            task_id: TaskId::new(id),
            ..Self::default()
        }
    }

    /// Estimated effort in hours. Missing, negative or non-finite values count as 0.
    pub fn effort_hours(&self) -> f64 {
        match self.estimated_hours {
            Some(hours) if hours.is_finite() && hours > 0.0 => hours,
            _ => 0.0,
        }
    }

    pub fn has_priority(&self, priority: &str) -> bool {
        self.priority
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case(priority))
    }

    pub fn is_assigned_to(&self, user: &str) -> bool {
        self.assignees.iter().any(|assignee| assignee == user)
    }
}

/// Decides which free-form status strings represent final work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTaxonomy {
    pub final_statuses: Vec<String>,
}

impl Default for StatusTaxonomy {
    fn default() -> Self {
        Self {
            final_statuses: vec!["completed".to_string(), "cancelled".to_string()],
        }
    }
}

impl StatusTaxonomy {
    pub fn new(final_statuses: Vec<String>) -> Self {
        Self { final_statuses }
    }

    pub fn is_final(&self, status: Option<&str>) -> bool {
        match status {
            Some(status) => self
                .final_statuses
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(status.trim())),
            None => false,
        }
    }

    pub fn is_task_final(&self, task: &Task) -> bool {
        self.is_final(task.status.as_deref())
    }

    /// A dependency is incomplete unless its upstream status is final.
    pub fn is_dependency_open(&self, edge: &DependencyEdge) -> bool {
        !self.is_final(edge.status.as_deref())
    }
}
