// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast scheduler and distribution engine.
//!
//! [`BroadcastEngine`] persists posts, defers their distribution until the
//! publish time via cancellable tasks in a [`TaskRegistry`], fans delivery
//! out to every active auto-post target with independent per-target outcome
//! accounting, and later deletes the delivered messages when a post carries
//! an auto-delete delay.
//!
//! Deferred timers are held only in process memory. A restart loses them;
//! [`BroadcastEngine::recover`] re-registers tasks from durable Scheduled
//! posts at startup.

pub mod engine;
pub mod registry;

pub use engine::{new_post_id, BroadcastEngine, DeletionReport, DistributionReport};
pub use registry::TaskRegistry;
