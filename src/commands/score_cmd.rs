use crate::commands::base_commands::{PeriodArgs, ScopeArgs};
use crate::commands::inputs::{CommandError, local_caller, parse_period};
use crate::services::config::AnalyticsConfig;
use crate::services::report::AnalyticsEngine;
use crate::services::task_yaml::YamlTaskSource;
use crate::services::trend_store::FileTrendStore;

pub async fn score_command(
    input: &str,
    scope: &ScopeArgs,
    period: &PeriodArgs,
    config: Option<&str>,
    trend_store: Option<&str>,
) -> Result<(), CommandError> {
    let config = AnalyticsConfig::load_if_provided(config)?;
    let (period, now) = parse_period(period)?;
    let source = YamlTaskSource::load(input)?;
    let scope = scope.scope();
    let store_path = trend_store
        .map(std::path::PathBuf::from)
        .or_else(|| config.trend_store.clone());
    let engine = AnalyticsEngine::new(source.clone(), source, config);
    let caller = local_caller();

    let yaml = match store_path {
        Some(path) => {
            let store = FileTrendStore::open(&path)?;
            let (result, trend) = engine
                .productivity_with_trend(&caller, &scope, period, now, &store)
                .await?;
            store.flush()?;
            let mut yaml = serde_yaml::to_string(&result)
                .map_err(|e| CommandError::Serialize(e.to_string()))?;
            let previous = match trend.previous {
                Some(value) => value.to_string(),
                None => "none".to_string(),
            };
            yaml.push_str(&format!(
                "trend: {}\npreviousScore: {previous}\n",
                trend.direction.as_str()
            ));
            yaml
        }
        None => {
            let result = engine.productivity(&caller, &scope, period, now).await?;
            serde_yaml::to_string(&result).map_err(|e| CommandError::Serialize(e.to_string()))?
        }
    };

    print!("{yaml}");
    Ok(())
}
