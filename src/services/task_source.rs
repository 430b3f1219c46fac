use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::scope::{ReportScope, TaskFilter};
use crate::domain::task::Task;

/// Failure of the task data collaborator. The engine reports every variant
/// to its caller as "data unavailable".
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("task data not found")]
    NotFound,
    #[error("task store unreachable: {0}")]
    Unreachable(String),
}

/// Describes an interface for retrieving task snapshots.
pub trait TaskSource {
    /// Tasks matching `filter` that existed on or before `period_end`, with
    /// their dependency edges and assignees resolved.
    async fn fetch_tasks(
        &self,
        filter: &TaskFilter,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Task>, DataSourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied,
    NotFound,
}

/// Decides whether a caller may see analytics for a scope.
pub trait AccessPolicy {
    async fn check_access(&self, caller: &str, scope: &ReportScope) -> AccessDecision;
}

/// Grants every request for a scope that exists. For single-user tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    async fn check_access(&self, _caller: &str, _scope: &ReportScope) -> AccessDecision {
        AccessDecision::Granted
    }
}
