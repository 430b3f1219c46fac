use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::metric::{ProductivityResult, ReportResult, ReportSummary};
use crate::domain::period::Period;
use crate::domain::scope::{ReportScope, TaskFilter};
use crate::domain::task::Task;
use crate::services::causes::{CauseContext, CauseRule, analyze_causes, default_rules};
use crate::services::comparison::compare;
use crate::services::config::AnalyticsConfig;
use crate::services::forecast::{ForecastInput, forecast};
use crate::services::metrics;
use crate::services::productivity::score_productivity;
use crate::services::task_source::{AccessDecision, AccessPolicy, DataSourceError, TaskSource};
use crate::services::trend_store::{StatTrend, TrendKey, TrendStore, stat_trend};

pub const PRODUCTIVITY_STAT: &str = "productivity_score";

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("forbidden")]
    AccessDenied,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataSourceError),
}

/// Composes metrics, causes and forecast for one scope and period.
///
/// Either a complete result or an error comes back; nothing is computed
/// before the access policy has granted the request.
pub struct AnalyticsEngine<S, A> {
    source: S,
    access: A,
    config: AnalyticsConfig,
    rules: Vec<Box<dyn CauseRule>>,
}

impl<S: TaskSource, A: AccessPolicy> AnalyticsEngine<S, A> {
    pub fn new(source: S, access: A, config: AnalyticsConfig) -> Self {
        Self {
            source,
            access,
            config,
            rules: default_rules(),
        }
    }

    /// Appends a cause rule after the built-in ones.
    pub fn with_rule(mut self, rule: Box<dyn CauseRule>) -> Self {
        self.rules.push(rule);
        self
    }

    async fn authorize(
        &self,
        caller: &str,
        scope: &ReportScope,
    ) -> Result<TaskFilter, AnalyticsError> {
        let describe = || match &scope.entity_id {
            Some(id) => format!("{} {}", scope.entity_type, id),
            None => scope.entity_type.to_string(),
        };
        let filter = scope
            .filter()
            .ok_or_else(|| AnalyticsError::NotFound(describe()))?;

        match self.access.check_access(caller, scope).await {
            AccessDecision::Granted => Ok(filter),
            AccessDecision::Denied => {
                warn!(caller, entity = %describe(), "analytics request refused");
                Err(AnalyticsError::AccessDenied)
            }
            AccessDecision::NotFound => Err(AnalyticsError::NotFound(describe())),
        }
    }

    async fn fetch(
        &self,
        filter: &TaskFilter,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Task>, AnalyticsError> {
        self.source
            .fetch_tasks(filter, period_end)
            .await
            .map_err(|error| {
                warn!(%error, "task data fetch failed");
                AnalyticsError::from(error)
            })
    }

    pub async fn productivity(
        &self,
        caller: &str,
        scope: &ReportScope,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<ProductivityResult, AnalyticsError> {
        let filter = self.authorize(caller, scope).await?;
        let tasks = self.fetch(&filter, period.end).await?;
        Ok(score_productivity(&tasks, &filter, &period, now, &self.config))
    }

    /// Scores the scope and records the score in `store`, returning its direction
    /// since the previous recording.
    pub async fn productivity_with_trend<T: TrendStore + ?Sized>(
        &self,
        caller: &str,
        scope: &ReportScope,
        period: Period,
        now: DateTime<Utc>,
        store: &T,
    ) -> Result<(ProductivityResult, StatTrend), AnalyticsError> {
        let result = self.productivity(caller, scope, period, now).await?;
        let key = TrendKey::new(scope.entity_type, scope.entity_id.as_deref(), PRODUCTIVITY_STAT);
        let trend = stat_trend(store, &key, result.score as f64, now);
        Ok((result, trend))
    }

    pub async fn report(
        &self,
        caller: &str,
        scope: &ReportScope,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<ReportResult, AnalyticsError> {
        let filter = self.authorize(caller, scope).await?;
        let previous = period.preceding();

        let (current_tasks, previous_tasks) = tokio::join!(
            self.fetch(&filter, period.end),
            self.fetch(&filter, previous.end)
        );
        let current_tasks = current_tasks?;
        let previous_tasks = previous_tasks?;

        let report = self.assemble(&filter, &current_tasks, &previous_tasks, period, now);
        info!(
            entity_type = %scope.entity_type,
            entity_id = scope.entity_id.as_deref().unwrap_or("-"),
            score = report.productivity.score,
            risk = ?report.summary.overall_risk,
            "assembled analytics report"
        );
        Ok(report)
    }

    fn assemble(
        &self,
        filter: &TaskFilter,
        current_tasks: &[Task],
        previous_tasks: &[Task],
        period: Period,
        now: DateTime<Utc>,
    ) -> ReportResult {
        let previous = period.preceding();
        let taxonomy = self.config.taxonomy();
        let current: Vec<&Task> = current_tasks.iter().collect();
        let before: Vec<&Task> = previous_tasks.iter().collect();
        let active: Vec<&Task> = current
            .iter()
            .copied()
            .filter(|task| !taxonomy.is_task_final(task))
            .collect();

        let velocity_current = metrics::velocity(&current, &period);
        let velocity_previous = metrics::velocity(&before, &previous);
        let overdue_current = metrics::overdue_count(&current, &period, now);
        let overdue_previous = metrics::overdue_count(&before, &previous, now);

        let summary_forecast = forecast(
            &ForecastInput {
                active_tasks: &active,
                velocity_current,
                velocity_previous,
                overdue_current,
                overdue_previous,
                now,
            },
            &taxonomy,
        );

        let summary = ReportSummary {
            velocity: compare(velocity_current, velocity_previous, "hrs"),
            completion_rate: compare(
                metrics::completion_rate(&current, &period, &taxonomy),
                metrics::completion_rate(&before, &previous, &taxonomy),
                "%",
            ),
            blocked_ratio: compare(
                metrics::blocked_ratio(&current, &taxonomy) * 100.0,
                metrics::blocked_ratio(&before, &taxonomy) * 100.0,
                "%",
            ),
            overdue_tasks: compare(overdue_current as f64, overdue_previous as f64, "tasks"),
            overall_risk: summary_forecast.risk_level,
        };

        let causes = analyze_causes(
            &self.rules,
            &CauseContext {
                tasks: &current,
                period: &period,
                config: &self.config,
            },
        );

        ReportResult {
            summary,
            productivity: score_productivity(current_tasks, filter, &period, now, &self.config),
            causes,
            forecast: summary_forecast,
            actions: Vec::new(),
        }
    }
}
