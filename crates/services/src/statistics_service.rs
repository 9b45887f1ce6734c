use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{GameResult, QUESTIONS_PER_ROUND, StatisticsRecord};
use storage::repository::{InMemoryStore, StatKey, StatValue, StatisticsStore, StorageError};

use crate::Clock;
use crate::error::StatisticsError;

/// Lifetime quiz statistics on top of a key-value store.
///
/// Reads never fail: absent keys, backend errors and malformed values all
/// degrade to the zero default and are logged. Only `store` reports errors.
#[derive(Clone)]
pub struct StatisticsService {
    clock: Clock,
    store: Arc<dyn StatisticsStore>,
    questions_per_round: u32,
}

impl StatisticsService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn StatisticsStore>) -> Self {
        Self {
            clock,
            store,
            questions_per_round: QUESTIONS_PER_ROUND,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryStore::new()))
    }

    /// Round length used by `total_accuracy`.
    #[must_use]
    pub fn with_questions_per_round(mut self, questions_per_round: u32) -> Self {
        self.questions_per_round = questions_per_round;
        self
    }

    #[must_use]
    pub fn questions_per_round(&self) -> u32 {
        self.questions_per_round
    }

    pub async fn games_played(&self) -> u64 {
        or_logged(self.try_count(StatKey::GamesPlayed).await, || 0)
    }

    pub async fn cumulative_correct(&self) -> u64 {
        or_logged(self.try_count(StatKey::CumulativeCorrect).await, || 0)
    }

    /// The best round so far, or an empty result stamped `now` if none.
    pub async fn best_game(&self) -> GameResult {
        or_logged(self.try_best_game().await, || {
            GameResult::empty(self.clock.now())
        })
    }

    /// Accuracy over every completed round, in percent.
    pub async fn total_accuracy(&self) -> f64 {
        self.record().await.total_accuracy(self.questions_per_round)
    }

    /// Reads the whole record.
    pub async fn record(&self) -> StatisticsRecord {
        StatisticsRecord {
            games_played: self.games_played().await,
            cumulative_correct: self.cumulative_correct().await,
            best_game: self.best_game().await,
        }
    }

    /// Records a finished round and returns the updated record.
    ///
    /// The best game is compared against the value stored before this call
    /// and replaced only by a strictly higher score. Counters and best game
    /// are written as one batch. Nothing is written if the stored values
    /// cannot be read.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::GameResult` if `correct > total`, or
    /// `StatisticsError::Storage` if the prior record cannot be read or the
    /// batch cannot be written.
    pub async fn store(
        &self,
        correct: u32,
        total: u32,
    ) -> Result<StatisticsRecord, StatisticsError> {
        let candidate = GameResult::new(correct, total, self.clock.now())?;
        let prior = self.try_record().await?;

        let games_played = prior.games_played.saturating_add(1);
        let cumulative_correct = prior.cumulative_correct.saturating_add(u64::from(correct));
        let is_new_best = candidate.beats(&prior.best_game);

        let mut entries = vec![
            (StatKey::GamesPlayed, StatValue::Int(to_stored(games_played))),
            (
                StatKey::CumulativeCorrect,
                StatValue::Int(to_stored(cumulative_correct)),
            ),
        ];
        if is_new_best {
            entries.extend([
                (StatKey::BestGameCorrect, StatValue::Int(i64::from(correct))),
                (StatKey::BestGameTotal, StatValue::Int(i64::from(total))),
                (
                    StatKey::BestGameDate,
                    StatValue::Timestamp(candidate.achieved_at()),
                ),
            ]);
        }
        self.store.set_many(&entries).await?;

        tracing::info!(
            target: "quiz.statistics",
            correct,
            total,
            games_played,
            is_new_best,
            "round recorded"
        );

        Ok(StatisticsRecord {
            games_played,
            cumulative_correct,
            best_game: if is_new_best {
                candidate
            } else {
                prior.best_game
            },
        })
    }

    async fn try_record(&self) -> Result<StatisticsRecord, StorageError> {
        Ok(StatisticsRecord {
            games_played: self.try_count(StatKey::GamesPlayed).await?,
            cumulative_correct: self.try_count(StatKey::CumulativeCorrect).await?,
            best_game: self.try_best_game().await?,
        })
    }

    /// Backend errors propagate; malformed values degrade to the empty result.
    async fn try_best_game(&self) -> Result<GameResult, StorageError> {
        let now = self.clock.now();
        let correct = self.try_count(StatKey::BestGameCorrect).await?;
        let total = self.try_count(StatKey::BestGameTotal).await?;
        let achieved_at = self
            .try_timestamp(StatKey::BestGameDate)
            .await?
            .unwrap_or(now);

        let (Ok(correct), Ok(total)) = (u32::try_from(correct), u32::try_from(total)) else {
            tracing::warn!(target: "quiz.statistics", correct, total, "best game out of range");
            return Ok(GameResult::empty(now));
        };
        Ok(GameResult::new(correct, total, achieved_at).unwrap_or_else(|err| {
            tracing::warn!(target: "quiz.statistics", %err, "discarding corrupt best game");
            GameResult::empty(now)
        }))
    }

    /// Absent keys and non-count values read as zero.
    async fn try_count(&self, key: StatKey) -> Result<u64, StorageError> {
        let Some(value) = self.store.get(key).await? else {
            return Ok(0);
        };
        match value.as_int().map(u64::try_from) {
            Some(Ok(count)) => Ok(count),
            _ => {
                tracing::warn!(
                    target: "quiz.statistics",
                    key = key.as_str(),
                    ?value,
                    "not a count"
                );
                Ok(0)
            }
        }
    }

    async fn try_timestamp(&self, key: StatKey) -> Result<Option<DateTime<Utc>>, StorageError> {
        let Some(value) = self.store.get(key).await? else {
            return Ok(None);
        };
        let ts = value.as_timestamp();
        if ts.is_none() {
            tracing::warn!(
                target: "quiz.statistics",
                key = key.as_str(),
                ?value,
                "not a timestamp"
            );
        }
        Ok(ts)
    }
}

fn or_logged<T>(result: Result<T, StorageError>, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(target: "quiz.statistics", %err, "read failed");
        fallback()
    })
}

fn to_stored(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use quiz_core::time::{fixed_clock, fixed_now};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct BrokenStore;

    #[async_trait]
    impl StatisticsStore for BrokenStore {
        async fn get(&self, _key: StatKey) -> Result<Option<StatValue>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn set_many(
            &self,
            _entries: &[(StatKey, StatValue)],
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    /// In-memory store whose reads can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        fail_reads: AtomicBool,
    }

    #[async_trait]
    impl StatisticsStore for FlakyStore {
        async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("database is locked".into()));
            }
            self.inner.get(key).await
        }

        async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError> {
            self.inner.set_many(entries).await
        }
    }

    #[tokio::test]
    async fn fresh_statistics_read_as_zero() {
        let stats = StatisticsService::in_memory(fixed_clock());

        assert_eq!(stats.games_played().await, 0);
        assert_eq!(stats.cumulative_correct().await, 0);
        assert_eq!(stats.best_game().await, GameResult::empty(fixed_now()));
        assert!(stats.total_accuracy().await.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn best_game_only_moves_on_strictly_higher_score() {
        let store = Arc::new(InMemoryStore::new());
        let first_at = fixed_now();
        let stats = StatisticsService::new(Clock::fixed(first_at), store.clone());

        stats.store(7, 10).await.unwrap();
        assert_eq!(stats.games_played().await, 1);
        assert_eq!(stats.cumulative_correct().await, 7);
        assert_eq!(
            stats.best_game().await,
            GameResult::new(7, 10, first_at).unwrap()
        );

        let later_at = first_at + Duration::hours(1);
        let later = StatisticsService::new(Clock::fixed(later_at), store.clone());
        later.store(5, 10).await.unwrap();
        later.store(7, 10).await.unwrap();
        assert_eq!(later.games_played().await, 3);
        assert_eq!(later.cumulative_correct().await, 19);
        assert_eq!(later.best_game().await.achieved_at(), first_at);

        let best_at = first_at + Duration::hours(2);
        let latest = StatisticsService::new(Clock::fixed(best_at), store);
        let record = latest.store(9, 10).await.unwrap();
        assert_eq!(record.best_game, GameResult::new(9, 10, best_at).unwrap());
        assert_eq!(latest.best_game().await, record.best_game);
    }

    #[tokio::test]
    async fn accuracy_over_recorded_rounds() {
        let stats = StatisticsService::in_memory(fixed_clock());
        stats.store(7, 10).await.unwrap();
        stats.store(8, 10).await.unwrap();

        assert!((stats.total_accuracy().await - 75.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn impossible_score_is_rejected_without_writing() {
        let stats = StatisticsService::in_memory(fixed_clock());
        let err = stats.store(11, 10).await.unwrap_err();

        assert!(matches!(err, StatisticsError::GameResult(_)));
        assert_eq!(stats.games_played().await, 0);
    }

    #[tokio::test]
    async fn broken_store_reads_as_defaults_and_reports_writes() {
        let stats = StatisticsService::new(fixed_clock(), Arc::new(BrokenStore));

        assert_eq!(stats.record().await, StatisticsRecord::empty(fixed_now()));
        let err = stats.store(3, 10).await.unwrap_err();
        assert!(matches!(err, StatisticsError::Storage(_)));
    }

    #[tokio::test]
    async fn corrupt_values_fall_back_to_defaults() {
        let store = Arc::new(InMemoryStore::new());
        store
            .set_many(&[
                (StatKey::GamesPlayed, StatValue::Int(-4)),
                (StatKey::BestGameCorrect, StatValue::Int(12)),
                (StatKey::BestGameTotal, StatValue::Int(10)),
                (StatKey::BestGameDate, StatValue::Int(5)),
            ])
            .await
            .unwrap();
        let stats = StatisticsService::new(fixed_clock(), store);

        assert_eq!(stats.games_played().await, 0);
        assert_eq!(stats.best_game().await, GameResult::empty(fixed_now()));
    }

    #[tokio::test]
    async fn failed_read_during_store_leaves_history_untouched() {
        let store = Arc::new(FlakyStore::default());
        let stats = StatisticsService::new(fixed_clock(), store.clone());
        for _ in 0..5 {
            stats.store(9, 10).await.unwrap();
        }

        store.fail_reads.store(true, Ordering::SeqCst);
        let err = stats.store(3, 10).await.unwrap_err();
        assert!(matches!(err, StatisticsError::Storage(_)));

        store.fail_reads.store(false, Ordering::SeqCst);
        let record = stats.record().await;
        assert_eq!(record.games_played, 5);
        assert_eq!(record.cumulative_correct, 45);
        assert_eq!(record.best_game, GameResult::new(9, 10, fixed_now()).unwrap());
    }
}
