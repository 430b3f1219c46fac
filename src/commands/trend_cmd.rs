use chrono::Utc;

use crate::commands::inputs::CommandError;
use crate::domain::scope::EntityType;
use crate::services::trend_store::{FileTrendStore, TrendKey, stat_trend};

pub fn trend_command(
    store: &str,
    entity_type: EntityType,
    entity_id: Option<&str>,
    stat: &str,
    value: f64,
) -> Result<(), CommandError> {
    let store = FileTrendStore::open(store)?;
    let key = TrendKey::new(entity_type, entity_id, stat);
    let trend = stat_trend(&store, &key, value, Utc::now());
    store.flush()?;

    let direction = trend.direction.as_str();
    match trend.previous {
        Some(previous) => println!("{stat}: {direction} ({previous} -> {value})"),
        None => println!("{stat}: {direction} (first observation {value})"),
    }
    Ok(())
}
