// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the four persistence contracts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use hubcast_config::StorageConfig;
use hubcast_core::traits::{PostStore, RegistryStore, SubmissionStore, TargetStore};
use hubcast_core::types::{
    AutoPostTarget, Category, ChannelEntry, PostId, ScheduledPost, SendFailure, SendOutcome,
    Submission, SubmissionId, UserId,
};
use hubcast_core::HubcastResult;

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. One `SqliteStore` instance (behind an `Arc`) serves
/// every component; writes are serialized by the single-writer connection.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Opens the configured database, applying migrations.
    pub async fn open(config: &StorageConfig) -> HubcastResult<Self> {
        let db = Database::open(&config.database_path).await?;
        debug!(path = %config.database_path, "SQLite store opened");
        Ok(Self { db })
    }

    /// Opens a database at an explicit path (tests, tooling).
    pub async fn open_path(path: &str) -> HubcastResult<Self> {
        let db = Database::open(path).await?;
        Ok(Self { db })
    }

    /// Checkpoints the WAL for a clean shutdown.
    pub async fn close(&self) -> HubcastResult<()> {
        self.db.close().await
    }
}

#[async_trait]
impl RegistryStore for SqliteStore {
    async fn insert_entry(&self, entry: &ChannelEntry) -> HubcastResult<()> {
        queries::registry::insert_entry(&self.db, entry).await
    }

    async fn entry_by_handle(&self, handle: &str) -> HubcastResult<Option<ChannelEntry>> {
        queries::registry::entry_by_handle(&self.db, handle).await
    }

    async fn entries_in_category(&self, category: Category) -> HubcastResult<Vec<ChannelEntry>> {
        queries::registry::entries_in_category(&self.db, category).await
    }

    async fn entries_by_requester(&self, user: UserId) -> HubcastResult<Vec<ChannelEntry>> {
        queries::registry::entries_by_requester(&self.db, user).await
    }

    async fn delete_entry(&self, handle: &str) -> HubcastResult<bool> {
        queries::registry::delete_entry(&self.db, handle).await
    }

    async fn count_in_category(&self, category: Category) -> HubcastResult<i64> {
        queries::registry::count_in_category(&self.db, category).await
    }

    async fn set_subscribers(&self, handle: &str, subscribers: i64) -> HubcastResult<()> {
        queries::registry::set_subscribers(&self.db, handle, subscribers).await
    }
}

#[async_trait]
impl TargetStore for SqliteStore {
    async fn add_target(&self, handle: &str, now: DateTime<Utc>) -> HubcastResult<()> {
        queries::targets::add_target(&self.db, handle, now).await
    }

    async fn remove_target(&self, handle: &str) -> HubcastResult<bool> {
        queries::targets::remove_target(&self.db, handle).await
    }

    async fn set_target_active(&self, handle: &str, active: bool) -> HubcastResult<bool> {
        queries::targets::set_target_active(&self.db, handle, active).await
    }

    async fn active_targets(&self) -> HubcastResult<Vec<AutoPostTarget>> {
        queries::targets::list_targets(&self.db, true).await
    }

    async fn all_targets(&self) -> HubcastResult<Vec<AutoPostTarget>> {
        queries::targets::list_targets(&self.db, false).await
    }

    async fn record_target_success(&self, handle: &str, at: DateTime<Utc>) -> HubcastResult<()> {
        queries::targets::record_success(&self.db, handle, at).await
    }

    async fn record_target_failure(&self, handle: &str) -> HubcastResult<()> {
        queries::targets::record_failure(&self.db, handle).await
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn insert_post(&self, post: &ScheduledPost) -> HubcastResult<()> {
        queries::posts::insert_post(&self.db, post).await
    }

    async fn get_post(&self, id: &PostId) -> HubcastResult<Option<ScheduledPost>> {
        queries::posts::get_post(&self.db, id).await
    }

    async fn scheduled_posts(&self) -> HubcastResult<Vec<ScheduledPost>> {
        queries::posts::scheduled_posts(&self.db).await
    }

    async fn mark_sent(
        &self,
        id: &PostId,
        sent_at: DateTime<Utc>,
        sent: &[SendOutcome],
        failed: &[SendFailure],
    ) -> HubcastResult<()> {
        queries::posts::mark_sent(&self.db, id, sent_at, sent, failed).await
    }

    async fn mark_deleted(
        &self,
        id: &PostId,
        deleted_at: DateTime<Utc>,
        deleted_count: i64,
        failed_deletions: &[SendFailure],
    ) -> HubcastResult<()> {
        queries::posts::mark_deleted(&self.db, id, deleted_at, deleted_count, failed_deletions)
            .await
    }
}

#[async_trait]
impl SubmissionStore for SqliteStore {
    async fn insert_submission(&self, submission: &Submission) -> HubcastResult<()> {
        queries::submissions::insert_submission(&self.db, submission).await
    }

    async fn delete_submission(&self, id: &SubmissionId) -> HubcastResult<bool> {
        queries::submissions::delete_submission(&self.db, id).await
    }

    async fn pending_submissions(&self) -> HubcastResult<Vec<Submission>> {
        queries::submissions::pending_submissions(&self.db).await
    }
}
