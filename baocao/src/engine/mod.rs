//! The batch resolution engine.
//!
//! [`batch`] holds the queue-controller state machine; `policy` implements
//! the per-request classification/fallback decision; `prune` drops
//! future-dated requests before anything is queued.

/// The batch state machine: queue controller, clarification gate, collector.
pub mod batch;
pub(crate) mod policy;
pub(crate) mod prune;
