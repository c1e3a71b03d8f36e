//! Paced name resolution
//!
//! Addresses are resolved a few at a time with a pause between groups so the
//! name resolver endpoint is not flooded when a leaderboard has hundreds of
//! rows.

use std::collections::HashSet;
use std::time::Duration;

use alloy_primitives::Address;
use futures::future::join_all;
use tracing::debug;

use crate::store::NameCache;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    /// Pause between two batches; none after the last one
    pub delay: Duration,
}

impl BatchPolicy {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY)
    }
}

/// Addresses that still need a lookup, de-duplicated, in first-seen order
pub fn unresolved(names: &NameCache, addresses: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut seen = HashSet::new();
    addresses
        .into_iter()
        .filter(|address| seen.insert(*address) && !names.has(address))
        .collect()
}

/// Resolve `addresses` through the cache in paced batches.
///
/// Lookups within a batch run together; `on_batch` receives each batch's
/// results as soon as the whole batch settled. Returns the number of batches.
pub async fn resolve_in_batches<F>(
    names: &NameCache,
    policy: BatchPolicy,
    addresses: &[Address],
    mut on_batch: F,
) -> usize
where
    F: FnMut(Vec<(Address, Option<String>)>),
{
    let batches: Vec<&[Address]> = addresses.chunks(policy.batch_size.max(1)).collect();
    let count = batches.len();

    for (index, batch) in batches.into_iter().enumerate() {
        let results = join_all(batch.iter().map(|&address| async move {
            (address, names.lookup(address).await)
        }))
        .await;

        let named = results.iter().filter(|(_, name)| name.is_some()).count();
        debug!(batch = index + 1, of = count, size = results.len(), named, "name batch settled");
        on_batch(results);

        if index + 1 < count {
            tokio::time::sleep(policy.delay).await;
        }
    }
    count
}
