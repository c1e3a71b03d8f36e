//! Runtime infrastructure - Tokio runtime bridge, fetch worker, paced name resolution

mod batch;
mod bridge;
mod worker;

pub use batch::{resolve_in_batches, unresolved, BatchPolicy, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent, Screen};
pub use worker::{run_async_worker, Worker};
