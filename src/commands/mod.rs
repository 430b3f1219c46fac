pub mod base_commands;
pub mod completions_cmd;
pub mod inputs;
pub mod report_cmd;
pub mod report_format;
pub mod score_cmd;
pub mod trend_cmd;
