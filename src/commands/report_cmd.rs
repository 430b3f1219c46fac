use crate::commands::base_commands::{PeriodArgs, ReportFormat, ScopeArgs};
use crate::commands::inputs::{CommandError, local_caller, parse_period};
use crate::commands::report_format::format_report;
use crate::services::config::AnalyticsConfig;
use crate::services::report::AnalyticsEngine;
use crate::services::task_yaml::YamlTaskSource;

pub async fn report_command(
    input: &str,
    scope: &ScopeArgs,
    period: &PeriodArgs,
    config: Option<&str>,
    output: Option<&str>,
    format: ReportFormat,
) -> Result<(), CommandError> {
    let config = AnalyticsConfig::load_if_provided(config)?;
    let (period, now) = parse_period(period)?;
    let source = YamlTaskSource::load(input)?;
    let scope = scope.scope();
    let engine = AnalyticsEngine::new(source.clone(), source, config);

    let report = engine.report(&local_caller(), &scope, period, now).await?;
    let rendered = match format {
        ReportFormat::Text => format_report(&report, &scope, &period),
        ReportFormat::Yaml => {
            serde_yaml::to_string(&report).map_err(|e| CommandError::Serialize(e.to_string()))?
        }
        ReportFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|e| CommandError::Serialize(e.to_string()))?,
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            println!("Analytics report written to {path}");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
