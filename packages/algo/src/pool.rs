//! Pool & Composition Policy
//!
//! The pool holds two disjoint partitions:
//! - `known`: items under active review
//! - `new`: parsed but not yet introduced
//!
//! Items only ever move from `new` to `known`, one random pick at a time.
//! Both partitions are ordered maps so a seeded source picks reproducibly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::UniformSource;
use crate::error::SrsError;
use crate::item::{Item, ItemStats, VocabRecord};
use crate::types::{Attribute, Gradation, ItemId, TrainingParams, DUE_PRIORITY};

// ==================== Policy Types ====================

/// Item counts per gradation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GradationHistogram {
    counts: [usize; 6],
}

impl GradationHistogram {
    pub fn count(&self, gradation: Gradation) -> usize {
        self.counts[gradation as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Gradation, usize)> + '_ {
        Gradation::ALL.into_iter().zip(self.counts.iter().copied())
    }

    fn add(&mut self, gradation: Gradation) {
        self.counts[gradation as usize] += 1;
    }
}

/// Why the policy declined to introduce a new item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclineReason {
    /// Ephemeral and fleeting buckets together reached their cap
    FleetingCapReached,
    /// Too many items are already due
    DueCapReached,
    /// Ephemeral bucket is full
    EphemeralFull,
}

/// Answer of the composition policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroductionDecision {
    Introduce,
    DoNotIntroduce(DeclineReason),
    /// Nothing is due; whether to add an item is up to the caller
    AskCaller,
}

/// What [`Pool::ingest`] did with a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    AddedNew,
    /// The id was already waiting in `new`; the fresh record replaced it
    ReplacedNew,
    /// The id is known; only its context was refreshed
    UpdatedContext,
}

/// Normalizes free-text answers before they are compared with item attributes
pub trait AnswerNormalizer {
    fn normalize(&self, attribute: Attribute, text: &str) -> String;
}

/// Trims, lowercases and collapses inner whitespace
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainNormalizer;

impl AnswerNormalizer for PlainNormalizer {
    fn normalize(&self, _attribute: Attribute, text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

// ==================== Pool ====================

#[derive(Clone, Debug, Default)]
pub struct Pool {
    known: BTreeMap<ItemId, Item>,
    new: BTreeMap<ItemId, Item>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn known(&self) -> &BTreeMap<ItemId, Item> {
        &self.known
    }

    pub fn unseen(&self) -> &BTreeMap<ItemId, Item> {
        &self.new
    }

    pub fn get_known(&self, id: &str) -> Option<&Item> {
        self.known.get(id)
    }

    pub fn known_mut(&mut self, id: &str) -> Result<&mut Item, SrsError> {
        match self.known.get_mut(id) {
            Some(item) => Ok(item),
            None if self.new.contains_key(id) => Err(SrsError::NotKnown(id.to_string())),
            None => Err(SrsError::UnknownItem(id.to_string())),
        }
    }

    /// Adds a parsed vocabulary record
    ///
    /// Known items keep their statistics; only their context is refreshed.
    pub fn ingest(&mut self, record: VocabRecord, now: DateTime<Utc>) -> IngestOutcome {
        if let Some(item) = self.known.get_mut(&record.id) {
            item.context = record.context;
            return IngestOutcome::UpdatedContext;
        }
        let id = record.id.clone();
        match self.new.insert(id, Item::new(record, now)) {
            Some(_) => IngestOutcome::ReplacedNew,
            None => IngestOutcome::AddedNew,
        }
    }

    /// Places a restored item in `known`, evicting any unseen copy
    pub fn insert_known(&mut self, item: Item) {
        self.new.remove(&item.id);
        self.known.insert(item.id.clone(), item);
    }

    /// Moves one uniformly random unseen item into `known`
    pub fn select_and_promote_random_unseen_item<R>(&mut self, rng: &mut R) -> Option<&Item>
    where
        R: UniformSource + ?Sized,
    {
        if self.new.is_empty() {
            return None;
        }
        let idx = rng.pick_index(self.new.len());
        let id = self.new.keys().nth(idx)?.clone();
        let item = self.new.remove(&id)?;
        tracing::info!(item = %id, hanzi = %item.hanzi, "introduced new item");
        self.known.insert(id.clone(), item);
        self.known.get(&id)
    }

    /// Known items bucketed by global level
    pub fn histogram(&self) -> GradationHistogram {
        let mut histogram = GradationHistogram::default();
        for item in self.known.values() {
            histogram.add(item.gradation());
        }
        histogram
    }

    /// Global priority of `item`, or `None` when its timestamp lies after `now`
    pub(crate) fn checked_priority(item: &Item, now: DateTime<Utc>) -> Option<f64> {
        match item.global_priority(now) {
            Ok(priority) => Some(priority),
            Err(err) => {
                tracing::warn!(item = %item.id, error = %err, "skipping item with future review");
                None
            }
        }
    }

    /// Known items with global priority of at least 1
    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        self.known
            .values()
            .filter_map(|item| Self::checked_priority(item, now))
            .filter(|&priority| priority >= DUE_PRIORITY)
            .count()
    }

    /// Decides whether the next round should bring in an unseen item
    pub fn should_introduce_new_item(
        &self,
        params: &TrainingParams,
        now: DateTime<Utc>,
    ) -> IntroductionDecision {
        let histogram = self.histogram();
        let due = self.due_count(now);
        let ephemeral = histogram.count(Gradation::Ephemeral);
        let fleeting = histogram.count(Gradation::Fleeting);

        let decision = if due == 0 {
            IntroductionDecision::AskCaller
        } else if ephemeral < params.max_ephemeral_words {
            IntroductionDecision::Introduce
        } else if ephemeral + fleeting >= params.max_fleeting_words {
            IntroductionDecision::DoNotIntroduce(DeclineReason::FleetingCapReached)
        } else if due >= params.max_total_words {
            IntroductionDecision::DoNotIntroduce(DeclineReason::DueCapReached)
        } else {
            IntroductionDecision::DoNotIntroduce(DeclineReason::EphemeralFull)
        };

        tracing::debug!(due, ephemeral, fleeting, ?decision, "introduction decision");
        decision
    }

    /// Records that `answer`, given for `attribute` of `item_id`, matches other
    /// known items; returns the ids whose confusion count was bumped
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
        self.known_mut(item_id)?;
        let wanted = normalizer.normalize(attribute, answer);
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let matches: Vec<ItemId> = self
            .known
            .values()
            .filter(|other| other.id != item_id)
            .filter(|other| normalizer.normalize(attribute, other.attribute(attribute)) == wanted)
            .map(|other| other.id.clone())
            .collect();

        let item = self.known_mut(item_id)?;
        for other in &matches {
            item.note_confusion(attribute, other);
        }
        if !matches.is_empty() {
            tracing::debug!(item = %item_id, %attribute, confused_with = ?matches, "recorded confusion");
        }
        Ok(matches)
    }

    /// Level summary of every known item
    pub fn stats(&self) -> Vec<ItemStats> {
        self.known.values().map(ItemStats::of).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{seeded_rng, ScriptedSource};
    use crate::types::{Outcome, TaskKind};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn record(id: &str, pinyin: &str, translation: &str) -> VocabRecord {
        VocabRecord {
            id: id.to_string(),
            hanzi: format!("字{id}"),
            pinyin: pinyin.to_string(),
            translation: translation.to_string(),
            context: None,
        }
    }

    fn pool_with_unseen(n: usize) -> Pool {
        let mut pool = Pool::new();
        for i in 0..n {
            pool.ingest(record(&format!("w{i:02}"), "zi4", "character"), t0());
        }
        pool
    }

    /// Promotes every unseen item and raises all its tasks to `level`
    fn promote_all_at(pool: &mut Pool, level: u32) {
        let mut source = ScriptedSource::default();
        while pool.select_and_promote_random_unseen_item(&mut source).is_some() {}
        let ids: Vec<_> = pool.known().keys().cloned().collect();
        for id in ids {
            let item = pool.known_mut(&id).unwrap();
            for kind in TaskKind::ALL {
                item.tasks_mut().get_mut(kind).level = level;
            }
            item.update_global(t0());
        }
    }

    #[test]
    fn test_ingest_and_context_update() {
        let mut pool = Pool::new();
        assert_eq!(pool.ingest(record("a", "ma1", "mother"), t0()), IngestOutcome::AddedNew);
        assert_eq!(pool.ingest(record("a", "ma1", "mother"), t0()), IngestOutcome::ReplacedNew);

        let mut source = ScriptedSource::new([0.0]);
        pool.select_and_promote_random_unseen_item(&mut source).unwrap();
        let mut source = ScriptedSource::default();
        pool.known_mut("a")
            .unwrap()
            .record_attempt(TaskKind::ALL[0], Outcome::Correct, t0() + Duration::hours(1), &mut source)
            .unwrap();

        let mut updated = record("a", "ma1", "mother");
        updated.context = Some("family".to_string());
        assert_eq!(pool.ingest(updated, t0()), IngestOutcome::UpdatedContext);

        let item = pool.get_known("a").unwrap();
        assert_eq!(item.context.as_deref(), Some("family"));
        assert_eq!(item.history(TaskKind::ALL[0]).len(), 1);
        assert!(pool.unseen().is_empty());
    }

    #[test]
    fn test_promote_from_empty_returns_none() {
        let mut pool = Pool::new();
        let mut rng = seeded_rng(Some(1));
        assert!(pool.select_and_promote_random_unseen_item(&mut rng).is_none());
    }

    #[test]
    fn test_promote_keeps_partitions_disjoint() {
        let mut pool = pool_with_unseen(4);
        let mut rng = seeded_rng(Some(9));
        let id = pool.select_and_promote_random_unseen_item(&mut rng).unwrap().id.clone();
        assert!(pool.known().contains_key(&id));
        assert!(!pool.unseen().contains_key(&id));
        assert_eq!(pool.known().len() + pool.unseen().len(), 4);
    }

    #[test]
    fn test_promote_uses_draw_for_index() {
        let mut pool = pool_with_unseen(4);
        let mut source = ScriptedSource::new([0.6]);
        let id = pool.select_and_promote_random_unseen_item(&mut source).unwrap().id.clone();
        assert_eq!(id, "w02");
    }

    #[test]
    fn test_insert_known_evicts_unseen_copy() {
        let mut pool = pool_with_unseen(2);
        let item = Item::new(record("w00", "zi4", "character"), t0());
        pool.insert_known(item);
        assert!(pool.known().contains_key("w00"));
        assert!(!pool.unseen().contains_key("w00"));
    }

    #[test]
    fn test_ask_caller_when_nothing_due() {
        let mut pool = pool_with_unseen(3);
        promote_all_at(&mut pool, 10);
        let decision = pool.should_introduce_new_item(&TrainingParams::default(), t0());
        assert_eq!(decision, IntroductionDecision::AskCaller);
    }

    #[test]
    fn test_introduce_when_ephemeral_below_cap() {
        let mut pool = pool_with_unseen(2);
        promote_all_at(&mut pool, 0);
        let now = t0() + Duration::minutes(5);
        let decision = pool.should_introduce_new_item(&TrainingParams::default(), now);
        assert_eq!(decision, IntroductionDecision::Introduce);
    }

    #[test]
    fn test_bucket_gating_blocks_introduction() {
        let mut pool = pool_with_unseen(5);
        promote_all_at(&mut pool, 2);
        let params = TrainingParams {
            max_ephemeral_words: 5,
            ..TrainingParams::default()
        };
        let now = t0() + Duration::hours(1);
        assert!(pool.due_count(now) > 0);
        let decision = pool.should_introduce_new_item(&params, now);
        assert!(matches!(decision, IntroductionDecision::DoNotIntroduce(_)));
    }

    #[test]
    fn test_decline_reasons_in_order() {
        let mut pool = pool_with_unseen(6);
        promote_all_at(&mut pool, 1);
        let now = t0() + Duration::hours(2);

        let fleeting_cap = TrainingParams {
            max_ephemeral_words: 6,
            max_fleeting_words: 6,
            max_total_words: 100,
            ..TrainingParams::default()
        };
        assert_eq!(
            pool.should_introduce_new_item(&fleeting_cap, now),
            IntroductionDecision::DoNotIntroduce(DeclineReason::FleetingCapReached)
        );

        let due_cap = TrainingParams {
            max_ephemeral_words: 6,
            max_fleeting_words: 20,
            max_total_words: 6,
            ..TrainingParams::default()
        };
        assert_eq!(
            pool.should_introduce_new_item(&due_cap, now),
            IntroductionDecision::DoNotIntroduce(DeclineReason::DueCapReached)
        );

        let roomy = TrainingParams {
            max_ephemeral_words: 6,
            max_fleeting_words: 20,
            max_total_words: 100,
            ..TrainingParams::default()
        };
        assert_eq!(
            pool.should_introduce_new_item(&roomy, now),
            IntroductionDecision::DoNotIntroduce(DeclineReason::EphemeralFull)
        );
    }

    #[test]
    fn test_histogram_counts_known_only() {
        let mut pool = pool_with_unseen(3);
        let mut source = ScriptedSource::new([0.0]);
        pool.select_and_promote_random_unseen_item(&mut source);
        let histogram = pool.histogram();
        assert_eq!(histogram.total(), 1);
        assert_eq!(histogram.count(Gradation::Ephemeral), 1);
    }

    #[test]
    fn test_record_confusion_matches_other_items() {
        let mut pool = Pool::new();
        pool.ingest(record("a", "ma1", "mother"), t0());
        pool.ingest(record("b", "ma3", "horse"), t0());
        pool.ingest(record("c", "ma3", "horse (variant)"), t0());
        let mut source = ScriptedSource::default();
        while pool.select_and_promote_random_unseen_item(&mut source).is_some() {}

        let matched = pool
            .record_confusion("a", Attribute::Translation, "  Horse ", &PlainNormalizer)
            .unwrap();
        assert_eq!(matched, vec!["b".to_string()]);

        let matched = pool
            .record_confusion("a", Attribute::Pinyin, "ma3", &PlainNormalizer)
            .unwrap();
        assert_eq!(matched, vec!["b".to_string(), "c".to_string()]);

        let item = pool.get_known("a").unwrap();
        assert_eq!(item.confusions()[&Attribute::Pinyin]["b"], 1);
        assert_eq!(item.confusions()[&Attribute::Translation]["b"], 1);
    }

    #[test]
    fn test_record_confusion_on_unseen_item_fails() {
        let mut pool = pool_with_unseen(1);
        let err = pool
            .record_confusion("w00", Attribute::Pinyin, "zi4", &PlainNormalizer)
            .unwrap_err();
        assert_eq!(err, SrsError::NotKnown("w00".to_string()));
    }
}
