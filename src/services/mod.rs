pub mod causes;
pub mod comparison;
pub mod config;
pub mod forecast;
pub mod metrics;
pub mod productivity;
pub mod report;
pub mod task_source;
pub mod task_yaml;
pub mod trend_store;
