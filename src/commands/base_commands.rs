use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::domain::scope::{EntityType, ReportScope};

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

/// Which entity to analyse. Without any of these the whole snapshot is used.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct ScopeArgs {
    /// Project id
    #[arg(long)]
    pub project: Option<String>,
    /// User id (tasks assigned to the user)
    #[arg(long)]
    pub user: Option<String>,
    /// Team id
    #[arg(long)]
    pub team: Option<String>,
}

impl ScopeArgs {
    pub fn scope(&self) -> ReportScope {
        if let Some(project) = &self.project {
            ReportScope::project(project)
        } else if let Some(user) = &self.user {
            ReportScope::user(user)
        } else if let Some(team) = &self.team {
            ReportScope::team(team)
        } else {
            ReportScope::global()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// First day or instant of the analysed period (YYYY-MM-DD or RFC 3339)
    #[arg(short, long)]
    pub start: String,
    /// Last day or instant of the analysed period (YYYY-MM-DD or RFC 3339)
    #[arg(short, long)]
    pub end: String,
    /// Reference time for overdue checks and forecasts (defaults to now)
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the productivity score for a scope and period
    Score {
        /// Task snapshot YAML file
        #[arg(short, long)]
        input: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        period: PeriodArgs,
        /// Optional analytics config YAML
        #[arg(short, long)]
        config: Option<String>,
        /// Record the score in this trend store file and report its direction
        #[arg(long)]
        trend_store: Option<String>,
    },
    /// Build a full analytics report comparing the period with the one before it
    Report {
        /// Task snapshot YAML file
        #[arg(short, long)]
        input: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        period: PeriodArgs,
        /// Optional analytics config YAML
        #[arg(short, long)]
        config: Option<String>,
        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Record a statistic and show whether it went up or down since last time
    Trend {
        /// Trend store YAML file (created when missing)
        #[arg(long)]
        store: String,
        /// Entity type: project, user, team or global
        #[arg(long, default_value_t = EntityType::Global)]
        entity_type: EntityType,
        /// Entity id (omit for global statistics)
        #[arg(long)]
        entity_id: Option<String>,
        /// Name of the statistic
        #[arg(long)]
        stat: String,
        /// Current value of the statistic
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
