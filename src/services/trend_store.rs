use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::metric::Trend;
use crate::domain::scope::EntityType;

#[derive(Error, Debug)]
pub enum TrendStoreError {
    #[error("failed to read trend store {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse trend store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to write trend store {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrendKey {
    pub entity_type: EntityType,
    pub entity_id: Option<String>,
    pub stat_key: String,
}

impl TrendKey {
    pub fn new(entity_type: EntityType, entity_id: Option<&str>, stat_key: &str) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.map(str::to_string),
            stat_key: stat_key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendEntry {
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Last-known value per `(entity, stat)`.
///
/// Writes are per-key upserts: writers of different keys never wait on each
/// other and concurrent writers of the same key resolve last-write-wins.
pub trait TrendStore: Send + Sync {
    fn get_previous(&self, key: &TrendKey) -> Option<TrendEntry>;
    fn set_current(&self, key: &TrendKey, value: f64, recorded_at: DateTime<Utc>);
}

#[derive(Debug, Default)]
pub struct InMemoryTrendStore {
    entries: DashMap<TrendKey, TrendEntry>,
}

impl InMemoryTrendStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TrendStore for InMemoryTrendStore {
    fn get_previous(&self, key: &TrendKey) -> Option<TrendEntry> {
        self.entries.get(key).map(|entry| *entry)
    }

    fn set_current(&self, key: &TrendKey, value: f64, recorded_at: DateTime<Utc>) {
        self.entries
            .insert(key.clone(), TrendEntry { value, recorded_at });
    }
}

#[derive(Serialize, Deserialize)]
struct TrendRecord {
    entity_type: EntityType,
    entity_id: Option<String>,
    stat_key: String,
    value: f64,
    recorded_at: DateTime<Utc>,
}

/// In-memory store that loads from and flushes to a YAML file.
#[derive(Debug)]
pub struct FileTrendStore {
    path: PathBuf,
    inner: InMemoryTrendStore,
}

impl FileTrendStore {
    /// Opens the store at `path`. A missing file starts an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TrendStoreError> {
        let path = path.as_ref().to_path_buf();
        let inner = InMemoryTrendStore::new();
        if !path.exists() {
            debug!(path = %path.display(), "trend store file missing, starting empty");
            return Ok(Self { path, inner });
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| TrendStoreError::Read {
            path: path.clone(),
            source,
        })?;
        let records: Vec<TrendRecord> = if contents.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str(&contents).map_err(|source| TrendStoreError::Parse {
                path: path.clone(),
                source,
            })?
        };
        for record in records {
            let key = TrendKey {
                entity_type: record.entity_type,
                entity_id: record.entity_id,
                stat_key: record.stat_key,
            };
            inner.set_current(&key, record.value, record.recorded_at);
        }
        Ok(Self { path, inner })
    }

    pub fn flush(&self) -> Result<(), TrendStoreError> {
        let mut records: Vec<TrendRecord> = self
            .inner
            .entries
            .iter()
            .map(|entry| TrendRecord {
                entity_type: entry.key().entity_type,
                entity_id: entry.key().entity_id.clone(),
                stat_key: entry.key().stat_key.clone(),
                value: entry.value().value,
                recorded_at: entry.value().recorded_at,
            })
            .collect();
        records.sort_by(|a, b| {
            (a.entity_type.as_str(), &a.entity_id, &a.stat_key).cmp(&(
                b.entity_type.as_str(),
                &b.entity_id,
                &b.stat_key,
            ))
        });

        let yaml = serde_yaml::to_string(&records).map_err(|e| TrendStoreError::Write {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })?;
        std::fs::write(&self.path, yaml).map_err(|source| TrendStoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl TrendStore for FileTrendStore {
    fn get_previous(&self, key: &TrendKey) -> Option<TrendEntry> {
        self.inner.get_previous(key)
    }

    fn set_current(&self, key: &TrendKey, value: f64, recorded_at: DateTime<Utc>) {
        self.inner.set_current(key, value, recorded_at);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatTrend {
    pub direction: Trend,
    pub current: f64,
    pub previous: Option<f64>,
    pub delta: f64,
}

/// Compares `current` against the last recorded value for `key`, then records `current`.
/// The first observation of a key is neutral.
pub fn stat_trend<S: TrendStore + ?Sized>(
    store: &S,
    key: &TrendKey,
    current: f64,
    now: DateTime<Utc>,
) -> StatTrend {
    let previous = store.get_previous(key).map(|entry| entry.value);
    let delta = previous.map_or(0.0, |previous| current - previous);
    store.set_current(key, current, now);

    StatTrend {
        direction: Trend::from_delta(delta),
        current,
        previous,
        delta,
    }
}
