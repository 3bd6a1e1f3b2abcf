//! Scheduler - unified entry point for a training session
//!
//! Wires the pool, the composition policy and the batch selector to an
//! injected clock and uniform source. The caller drives the loop:
//! 1. `introduction_decision` (and `promote_random_unseen` when it says so)
//! 2. `next_batch`
//! 3. `record_outcome` for every task it drills on every batch item

use crate::batch::{select_due_batch, ReviewBatch};
use crate::clock::{Clock, UniformSource};
use crate::error::SrsError;
use crate::item::{Item, ItemStats, VocabRecord};
use crate::pool::{AnswerNormalizer, GradationHistogram, IngestOutcome, IntroductionDecision, Pool};
use crate::types::{Attribute, ItemId, Outcome, ReviewEvent, TaskKind, TrainingParams};

pub struct Scheduler<C, R> {
    pool: Pool,
    params: TrainingParams,
    clock: C,
    rng: R,
}

impl<C: Clock, R: UniformSource> Scheduler<C, R> {
    pub fn new(pool: Pool, params: TrainingParams, clock: C, rng: R) -> Self {
        Self {
            pool,
            params,
            clock,
            rng,
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn into_pool(self) -> Pool {
        self.pool
    }

    pub fn ingest(&mut self, record: VocabRecord) -> IngestOutcome {
        let now = self.clock.now();
        self.pool.ingest(record, now)
    }

    pub fn histogram(&self) -> GradationHistogram {
        self.pool.histogram()
    }

    pub fn due_count(&self) -> usize {
        self.pool.due_count(self.clock.now())
    }

    pub fn introduction_decision(&self) -> IntroductionDecision {
        self.pool.should_introduce_new_item(&self.params, self.clock.now())
    }

    pub fn promote_random_unseen(&mut self) -> Option<&Item> {
        self.pool.select_and_promote_random_unseen_item(&mut self.rng)
    }

    /// Promotes an unseen item if the policy asks for one, or if it defers
    /// to the caller and `on_ask` says yes
    pub fn maybe_introduce(&mut self, on_ask: bool) -> Option<ItemId> {
        let introduce = match self.introduction_decision() {
            IntroductionDecision::Introduce => true,
            IntroductionDecision::AskCaller => on_ask,
            IntroductionDecision::DoNotIntroduce(_) => false,
        };
        if !introduce {
            return None;
        }
        self.promote_random_unseen().map(|item| item.id.clone())
    }

    pub fn next_batch(&mut self) -> Option<ReviewBatch> {
        let now = self.clock.now();
        select_due_batch(&self.pool, now, self.params.batch_size, &mut self.rng)
    }

    /// Applies one attempt outcome to one task of a known item
    pub fn record_outcome(
        &mut self,
        item_id: &str,
        task: TaskKind,
        outcome: Outcome,
    ) -> Result<ReviewEvent, SrsError> {
        let now = self.clock.now();
        let item = self.pool.known_mut(item_id)?;
        let event = item.record_attempt(task, outcome, now, &mut self.rng)?;
        tracing::debug!(
            item = %item_id,
            %task,
            outcome = outcome.code(),
            level_old = event.level_old,
            level_new = event.level_new,
            global_level = item.global_level(),
            "recorded attempt"
        );
        Ok(event)
    }

    pub fn record_confusion<N>(
        &mut self,
        item_id: &str,
        attribute: Attribute,
        answer: &str,
        normalizer: &N,
    ) -> Result<Vec<ItemId>, SrsError>
    where
        N: AnswerNormalizer + ?Sized,
    {
        self.pool.record_confusion(item_id, attribute, answer, normalizer)
    }

    pub fn stats(&self) -> Vec<ItemStats> {
        self.pool.stats()
    }
}
