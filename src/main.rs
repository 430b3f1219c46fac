use std::process::ExitCode;

use clap::Parser;
use task_analytics::commands::base_commands::{CliArgs, Commands};
use task_analytics::commands::completions_cmd::completions_command;
use task_analytics::commands::report_cmd::report_command;
use task_analytics::commands::score_cmd::score_command;
use task_analytics::commands::trend_cmd::trend_command;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let result = match args.command {
        Commands::Score {
            input,
            scope,
            period,
            config,
            trend_store,
        } => {
            score_command(
                &input,
                &scope,
                &period,
                config.as_deref(),
                trend_store.as_deref(),
            )
            .await
        }
        Commands::Report {
            input,
            scope,
            period,
            config,
            output,
            format,
        } => {
            report_command(
                &input,
                &scope,
                &period,
                config.as_deref(),
                output.as_deref(),
                format,
            )
            .await
        }
        Commands::Trend {
            store,
            entity_type,
            entity_id,
            stat,
            value,
        } => trend_command(&store, entity_type, entity_id.as_deref(), &stat, value),
        Commands::Completions { shell } => {
            completions_command(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to run command: {e}");
            ExitCode::FAILURE
        }
    }
}
