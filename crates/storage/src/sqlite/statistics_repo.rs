use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{StatKey, StatValue, StatisticsStore, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn map_value_row(key: StatKey, row: &sqlx::sqlite::SqliteRow) -> Result<StatValue, StorageError> {
    let int_value: Option<i64> = row.try_get("int_value").map_err(ser)?;
    let ts_value: Option<DateTime<Utc>> = row.try_get("ts_value").map_err(ser)?;
    match (int_value, ts_value) {
        (Some(v), None) => Ok(StatValue::Int(v)),
        (None, Some(t)) => Ok(StatValue::Timestamp(t)),
        _ => Err(StorageError::Serialization(format!(
            "malformed value for {}",
            key.as_str()
        ))),
    }
}

#[async_trait::async_trait]
impl StatisticsStore for SqliteRepository {
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT int_value, ts_value
            FROM statistics
            WHERE key = ?1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| map_value_row(key, &row)).transpose()
    }

    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (key, value) in entries {
            let (int_value, ts_value) = match value {
                StatValue::Int(v) => (Some(*v), None),
                StatValue::Timestamp(t) => (None, Some(*t)),
            };
            sqlx::query(
                r"
                INSERT INTO statistics (key, int_value, ts_value, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(key) DO UPDATE SET
                    int_value = excluded.int_value,
                    ts_value = excluded.ts_value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key.as_str())
            .bind(int_value)
            .bind(ts_value)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
