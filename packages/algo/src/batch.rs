//! Review Batch Selector
//!
//! An item is eligible for a round when its global priority exceeds 1 or it
//! has never left level 0. A round is a uniform sample without replacement.

use chrono::{DateTime, Utc};

use crate::clock::UniformSource;
use crate::pool::Pool;
use crate::types::{ItemId, DUE_PRIORITY};

/// Ids of the items picked for one training round, never empty
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewBatch {
    ids: Vec<ItemId>,
}

impl ReviewBatch {
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_ids(self) -> Vec<ItemId> {
        self.ids
    }
}

impl IntoIterator for ReviewBatch {
    type Item = ItemId;
    type IntoIter = std::vec::IntoIter<ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

/// Known items eligible for review at `now`, in id order
pub fn eligible_items(pool: &Pool, now: DateTime<Utc>) -> Vec<ItemId> {
    pool.known()
        .values()
        .filter(|item| {
            item.global_level() == 0
                || Pool::checked_priority(item, now).is_some_and(|p| p > DUE_PRIORITY)
        })
        .map(|item| item.id.clone())
        .collect()
}

/// Samples up to `batch_size` eligible items; `None` when nothing is due
pub fn select_due_batch<R>(
    pool: &Pool,
    now: DateTime<Utc>,
    batch_size: usize,
    rng: &mut R,
) -> Option<ReviewBatch>
where
    R: UniformSource + ?Sized,
{
    let eligible = eligible_items(pool, now);
    if eligible.is_empty() || batch_size == 0 {
        tracing::debug!(eligible = eligible.len(), "nothing to train");
        return None;
    }

    let amount = batch_size.min(eligible.len());
    let ids: Vec<ItemId> = rng
        .sample_indices(eligible.len(), amount)
        .into_iter()
        .map(|idx| eligible[idx].clone())
        .collect();

    tracing::info!(eligible = eligible.len(), picked = ids.len(), "selected review batch");
    Some(ReviewBatch { ids })
}
