// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contracts consumed by the moderation state machine and the
//! broadcast engine.
//!
//! The contracts are entity-shaped rather than a generic document API: each
//! trait carries the typed operations its consumer needs. Implementations
//! must degrade to a reported [`HubcastError::Storage`] when the backend is
//! unreachable; they must never panic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HubcastResult;
use crate::types::{
    AutoPostTarget, Category, ChannelEntry, PostId, ScheduledPost, SendFailure, SendOutcome,
    Submission, SubmissionId, UserId,
};

/// Source of truth for approved directory channels, keyed by unique handle.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Inserts a new entry. Fails with `Duplicate` if the handle exists.
    async fn insert_entry(&self, entry: &ChannelEntry) -> HubcastResult<()>;

    async fn entry_by_handle(&self, handle: &str) -> HubcastResult<Option<ChannelEntry>>;

    /// Entries in one category, ordered by add time (feed rendering order).
    async fn entries_in_category(&self, category: Category) -> HubcastResult<Vec<ChannelEntry>>;

    /// Entries owned by one requester, ordered by add time.
    async fn entries_by_requester(&self, user: UserId) -> HubcastResult<Vec<ChannelEntry>>;

    /// Removes an entry. Returns whether anything was deleted.
    async fn delete_entry(&self, handle: &str) -> HubcastResult<bool>;

    async fn count_in_category(&self, category: Category) -> HubcastResult<i64>;

    /// Updates the best-effort subscriber count for an entry.
    async fn set_subscribers(&self, handle: &str, subscribers: i64) -> HubcastResult<()>;
}

/// The registry of fan-out targets read by the broadcast engine.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Adds a target, initially active. Fails with `Duplicate` if it exists.
    async fn add_target(&self, handle: &str, now: DateTime<Utc>) -> HubcastResult<()>;

    /// Hard-removes a target. Returns whether anything was deleted.
    async fn remove_target(&self, handle: &str) -> HubcastResult<bool>;

    /// Flips the active flag without deleting history. Returns whether the
    /// target exists.
    async fn set_target_active(&self, handle: &str, active: bool) -> HubcastResult<bool>;

    /// The current distribution set: active targets only.
    async fn active_targets(&self) -> HubcastResult<Vec<AutoPostTarget>>;

    async fn all_targets(&self) -> HubcastResult<Vec<AutoPostTarget>>;

    /// Bumps the success counter and last-post timestamp after a delivery.
    async fn record_target_success(&self, handle: &str, at: DateTime<Utc>) -> HubcastResult<()>;

    /// Bumps the error counter after a failed delivery.
    async fn record_target_failure(&self, handle: &str) -> HubcastResult<()>;
}

/// Persisted scheduled posts and their per-target outcome history.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &ScheduledPost) -> HubcastResult<()>;

    async fn get_post(&self, id: &PostId) -> HubcastResult<Option<ScheduledPost>>;

    /// Posts still in `Scheduled` status, for the startup recovery sweep.
    async fn scheduled_posts(&self) -> HubcastResult<Vec<ScheduledPost>>;

    /// Persists the outcome of a distribution run: status becomes `Sent`,
    /// the outcome lists become append-only historical facts.
    async fn mark_sent(
        &self,
        id: &PostId,
        sent_at: DateTime<Utc>,
        sent: &[SendOutcome],
        failed: &[SendFailure],
    ) -> HubcastResult<()>;

    /// Persists the outcome of a deletion run: status becomes `Deleted`.
    async fn mark_deleted(
        &self,
        id: &PostId,
        deleted_at: DateTime<Utc>,
        deleted_count: i64,
        failed_deletions: &[SendFailure],
    ) -> HubcastResult<()>;
}

/// Durable half of the pending-submission state. The in-memory index in
/// `hubcast-moderation` is reconciled from this store at startup.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_submission(&self, submission: &Submission) -> HubcastResult<()>;

    /// Removes a submission on any terminal transition. Returns whether
    /// anything was deleted.
    async fn delete_submission(&self, id: &SubmissionId) -> HubcastResult<bool>;

    /// All pending submissions, for startup reconciliation.
    async fn pending_submissions(&self) -> HubcastResult<Vec<Submission>>;
}
