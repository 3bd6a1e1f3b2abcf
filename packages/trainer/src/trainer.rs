//! Trainer session
//!
//! One command's worth of work: restore the pool from disk, act on it
//! through the scheduler, and write it back.

use std::path::Path;

use rand_chacha::ChaCha8Rng;

use hanzi_srs_algo::{
    seeded_rng, Clock, Gradation, IntroductionDecision, ItemId, Outcome, Pool, ReviewBatch,
    ReviewEvent, Scheduler, TaskKind,
};

use crate::config::Config;
use crate::error::{StoreError, TrainerError};
use crate::pinyin::PinyinNormalizer;
use crate::services::{snapshot, stats_export, vocabulary};

/// Summary printed by `status`
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub known: usize,
    pub unseen: usize,
    pub due: usize,
    pub buckets: Vec<(Gradation, usize)>,
    pub decision: IntroductionDecision,
}

pub struct Trainer<C: Clock> {
    config: Config,
    scheduler: Scheduler<C, ChaCha8Rng>,
}

impl<C: Clock> Trainer<C> {
    /// Restores the snapshot, then ingests the vocabulary file if present
    pub fn open(config: Config, clock: C) -> Result<Self, StoreError> {
        let mut pool = Pool::new();
        let restored = snapshot::restore_into(&mut pool, &config.snapshot_path)?;

        let now = clock.now();
        let summary = if config.vocabulary_path.exists() {
            let records = vocabulary::load_vocabulary(&config.vocabulary_path)?;
            vocabulary::ingest_all(&mut pool, records, now)
        } else {
            tracing::warn!(path = %config.vocabulary_path.display(), "vocabulary file not found");
            vocabulary::IngestSummary::default()
        };

        tracing::info!(
            restored,
            added = summary.added,
            updated = summary.updated,
            unseen = pool.unseen().len(),
            "pool ready"
        );

        let scheduler = Scheduler::new(pool, config.params.clone(), clock, seeded_rng(config.seed));
        Ok(Self { config, scheduler })
    }

    pub fn scheduler(&self) -> &Scheduler<C, ChaCha8Rng> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<C, ChaCha8Rng> {
        &mut self.scheduler
    }

    pub fn save(&self) -> Result<(), StoreError> {
        snapshot::save_snapshot(
            &self.config.snapshot_path,
            self.scheduler.pool(),
            self.scheduler.clock().now(),
        )
    }

    pub fn status(&self) -> StatusReport {
        let pool = self.scheduler.pool();
        StatusReport {
            known: pool.known().len(),
            unseen: pool.unseen().len(),
            due: self.scheduler.due_count(),
            buckets: self.scheduler.histogram().iter().collect(),
            decision: self.scheduler.introduction_decision(),
        }
    }

    /// Promotes one unseen item when the policy allows it; `force` answers
    /// yes when the policy leaves the choice to us
    pub fn introduce(&mut self, force: bool) -> Result<Option<ItemId>, TrainerError> {
        let introduced = self.scheduler.maybe_introduce(force);
        if introduced.is_some() {
            self.save()?;
        }
        Ok(introduced)
    }

    pub fn batch(&mut self) -> Option<ReviewBatch> {
        self.scheduler.next_batch()
    }

    /// Applies one outcome to one task and persists the result
    pub fn review(
        &mut self,
        item_id: &str,
        task: TaskKind,
        outcome: Outcome,
    ) -> Result<ReviewEvent, TrainerError> {
        let event = self.scheduler.record_outcome(item_id, task, outcome)?;
        self.save()?;
        Ok(event)
    }

    /// Records a wrong answer that matched other known items; `loose`
    /// compares pinyin without tones
    pub fn confuse(
        &mut self,
        item_id: &str,
        task: TaskKind,
        answer: &str,
        loose: bool,
    ) -> Result<Vec<ItemId>, TrainerError> {
        let normalizer = if loose {
            PinyinNormalizer::loose()
        } else {
            PinyinNormalizer::strict()
        };
        let matches = self
            .scheduler
            .record_confusion(item_id, task.target(), answer, &normalizer)?;
        if !matches.is_empty() {
            self.save()?;
        }
        Ok(matches)
    }

    /// Writes the stats report to `path`, or to the configured location
    pub fn export_stats(&self, path: Option<&Path>) -> Result<usize, StoreError> {
        let rows = self.scheduler.stats();
        let path = path.unwrap_or(self.config.stats_path.as_path());
        stats_export::export_stats(path, &rows)?;
        Ok(rows.len())
    }
}
