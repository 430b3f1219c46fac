use std::fmt;

use serde::{Deserialize, Serialize};

use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    User,
    Team,
    Global,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Project => "project",
            EntityType::User => "user",
            EntityType::Team => "team",
            EntityType::Global => "global",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "project" => Ok(EntityType::Project),
            "user" => Ok(EntityType::User),
            "team" => Ok(EntityType::Team),
            "global" => Ok(EntityType::Global),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// Selects the tasks that belong to one scored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    Project(String),
    User(String),
    Team(String),
    All,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::Project(id) => task.project.as_deref() == Some(id.as_str()),
            TaskFilter::User(id) => task.is_assigned_to(id),
            TaskFilter::Team(id) => task.team.as_deref() == Some(id.as_str()),
            TaskFilter::All => true,
        }
    }

    pub fn select<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            TaskFilter::Project(_) => EntityType::Project,
            TaskFilter::User(_) => EntityType::User,
            TaskFilter::Team(_) => EntityType::Team,
            TaskFilter::All => EntityType::Global,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match self {
            TaskFilter::Project(id) | TaskFilter::User(id) | TaskFilter::Team(id) => Some(id),
            TaskFilter::All => None,
        }
    }
}

/// The entity a report is requested for. `entity_id` is `None` only for global scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportScope {
    pub entity_type: EntityType,
    pub entity_id: Option<String>,
}

impl ReportScope {
    pub fn global() -> Self {
        Self {
            entity_type: EntityType::Global,
            entity_id: None,
        }
    }

    pub fn project(id: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Project,
            entity_id: Some(id.into()),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::User,
            entity_id: Some(id.into()),
        }
    }

    pub fn team(id: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Team,
            entity_id: Some(id.into()),
        }
    }

    /// A scope without an id for a non-global entity type selects nothing.
    pub fn filter(&self) -> Option<TaskFilter> {
        match (self.entity_type, self.entity_id.clone()) {
            (EntityType::Global, _) => Some(TaskFilter::All),
            (EntityType::Project, Some(id)) => Some(TaskFilter::Project(id)),
            (EntityType::User, Some(id)) => Some(TaskFilter::User(id)),
            (EntityType::Team, Some(id)) => Some(TaskFilter::Team(id)),
            (_, None) => None,
        }
    }
}
