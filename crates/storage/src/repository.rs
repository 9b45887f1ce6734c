use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keys of the persisted statistics fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    GamesPlayed,
    CumulativeCorrect,
    BestGameCorrect,
    BestGameTotal,
    BestGameDate,
}

impl StatKey {
    pub const ALL: [StatKey; 5] = [
        StatKey::GamesPlayed,
        StatKey::CumulativeCorrect,
        StatKey::BestGameCorrect,
        StatKey::BestGameTotal,
        StatKey::BestGameDate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::GamesPlayed => "gamesCount",
            StatKey::CumulativeCorrect => "correctAnswers",
            StatKey::BestGameCorrect => "bestGame.correct",
            StatKey::BestGameTotal => "bestGame.total",
            StatKey::BestGameDate => "bestGame.date",
        }
    }
}

/// A single stored statistics value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatValue {
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl StatValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StatValue::Int(v) => Some(*v),
            StatValue::Timestamp(_) => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            StatValue::Timestamp(t) => Some(*t),
            StatValue::Int(_) => None,
        }
    }
}

/// Key-value contract for the statistics fields.
///
/// Absent keys read as `Ok(None)`; callers pick the zero default.
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    /// Read a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError>;

    /// Write several values as one unit: either all land or none do.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be stored.
    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError>;

    /// Write a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: StatKey, value: StatValue) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }
}

/// In-memory statistics store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<StatKey, StatValue>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StatisticsStore for InMemoryStore {
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).copied())
    }

    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.extend(entries.iter().copied());
        Ok(())
    }
}

/// Storage handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub statistics: Arc<dyn StatisticsStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let statistics: Arc<dyn StatisticsStore> = Arc::new(InMemoryStore::new());
        Self { statistics }
    }
}
