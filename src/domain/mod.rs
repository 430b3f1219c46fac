pub mod metric;
pub mod period;
pub mod scope;
pub mod task;
