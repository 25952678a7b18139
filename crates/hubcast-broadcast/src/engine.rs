// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast scheduling and multi-target distribution.
//!
//! Posts with a future publish time get a cancellable deferred task; past-due
//! posts distribute immediately. Distribution attempts every active target
//! independently, records per-target outcomes, and only persists the
//! aggregate after all targets have been attempted. A failure on one target
//! never aborts the rest.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use strum::IntoEnumIterator;
use tokio::time::sleep;
use tracing::{error, info, warn};

use hubcast_config::HubConfig;
use hubcast_core::traits::{PostStore, TargetStore, Transport};
use hubcast_core::types::{
    AutoPostTarget, Button, Category, ChatRef, Keyboard, PostId, PostStatistics, ScheduledPost,
    SendFailure, SendOutcome,
};
use hubcast_core::{HubcastError, HubcastResult};

use crate::registry::TaskRegistry;

/// Cap on failed targets named in the operator summary.
const SUMMARY_FAILURE_LIMIT: usize = 5;

/// Result of one distribution run.
#[derive(Debug, Clone)]
pub struct DistributionReport {
    pub post: PostId,
    pub sent: Vec<SendOutcome>,
    pub failed: Vec<SendFailure>,
    /// False when outcomes were delivered but the aggregate could not be
    /// written to the store.
    pub persisted: bool,
}

/// Result of one deletion run.
#[derive(Debug, Clone)]
pub struct DeletionReport {
    pub post: PostId,
    pub deleted_count: i64,
    pub failed_deletions: Vec<SendFailure>,
    pub persisted: bool,
}

pub struct BroadcastEngine {
    posts: Arc<dyn PostStore>,
    targets: Arc<dyn TargetStore>,
    transport: Arc<dyn Transport>,
    tasks: TaskRegistry,
    hub: HubConfig,
}

impl BroadcastEngine {
    pub fn new(
        posts: Arc<dyn PostStore>,
        targets: Arc<dyn TargetStore>,
        transport: Arc<dyn Transport>,
        hub: HubConfig,
    ) -> Self {
        Self {
            posts,
            targets,
            transport,
            tasks: TaskRegistry::new(),
            hub,
        }
    }

    /// Persists a new post and either distributes it now or registers a
    /// deferred task firing at its publish time. Returns the post identity.
    pub async fn schedule_broadcast(
        self: &Arc<Self>,
        post: ScheduledPost,
    ) -> HubcastResult<PostId> {
        let id = post.id.clone();
        self.posts.insert_post(&post).await?;

        let now = Utc::now();
        if post.publish_at <= now {
            self.distribute(&id).await?;
        } else {
            let delay = (post.publish_at - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            self.spawn_distribution(id.clone(), delay);
            info!(post = %id, delay_secs = delay.as_secs(), "broadcast deferred");
        }
        Ok(id)
    }

    /// Cancels a post's deferred task before it fires. Returns whether a
    /// pending task was actually cancelled; after firing this has no effect.
    pub fn cancel(&self, id: &PostId) -> bool {
        let cancelled = self.tasks.cancel(id);
        if cancelled {
            info!(post = %id, "scheduled broadcast cancelled");
        }
        cancelled
    }

    /// Distributes a post to every active target.
    ///
    /// Per-target failures are recorded and never abort the run. The
    /// aggregate is persisted only after all targets have been attempted;
    /// a persistence failure is reported through `persisted: false` rather
    /// than discarding the in-memory outcome.
    pub async fn distribute(self: &Arc<Self>, id: &PostId) -> HubcastResult<DistributionReport> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| HubcastError::NotFound(format!("post {id} not found")))?;

        let targets = self.targets.active_targets().await?;
        let keyboard = self.build_keyboard(&post);

        let mut sent = Vec::new();
        let mut failed = Vec::new();
        for target in &targets {
            self.attempt_send(&post, target, &keyboard, &mut sent, &mut failed)
                .await;
        }

        let sent_at = Utc::now();
        let persisted = match self.posts.mark_sent(id, sent_at, &sent, &failed).await {
            Ok(()) => true,
            Err(e) => {
                error!(post = %id, error = %e, "failed to persist distribution result");
                false
            }
        };

        counter!("hubcast_broadcasts_total").increment(1);
        counter!("hubcast_broadcast_sends_total").increment(sent.len() as u64);
        counter!("hubcast_broadcast_failures_total").increment(failed.len() as u64);
        info!(post = %id, sent = sent.len(), failed = failed.len(), "distribution complete");

        self.notify_distribution(id, &sent, &failed).await;

        if let Some(delay_secs) = post.delete_after_secs {
            // A non-positive delay deletes right away instead of wrapping
            // into a huge unsigned duration.
            let delay = std::time::Duration::from_secs(delay_secs.max(0) as u64);
            self.spawn_deletion(id.clone(), delay);
        }

        Ok(DistributionReport {
            post: id.clone(),
            sent,
            failed,
            persisted,
        })
    }

    /// Removes a post's delivered messages from their targets.
    pub async fn delete_post(&self, id: &PostId) -> HubcastResult<DeletionReport> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| HubcastError::NotFound(format!("post {id} not found")))?;

        let mut deleted_count = 0i64;
        let mut failed_deletions = Vec::new();
        for outcome in &post.sent {
            let target = ChatRef::Handle(outcome.target.clone());
            match self.transport.delete_message(&target, outcome.message).await {
                Ok(()) => deleted_count += 1,
                Err(e) => {
                    warn!(post = %id, target = %target, error = %e, "deletion failed");
                    failed_deletions.push(SendFailure {
                        target: outcome.target.clone(),
                        error: e.to_string(),
                        at: Utc::now(),
                    });
                }
            }
        }

        let deleted_at = Utc::now();
        let persisted = match self
            .posts
            .mark_deleted(id, deleted_at, deleted_count, &failed_deletions)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(post = %id, error = %e, "failed to persist deletion result");
                false
            }
        };

        info!(post = %id, deleted = deleted_count, failed = failed_deletions.len(), "deletion complete");
        self.best_effort_notify(&format!(
            "Deletion result for post {id}\n\nDeleted: {deleted_count} channels\nFailed: {} channels",
            failed_deletions.len()
        ))
        .await;

        Ok(DeletionReport {
            post: id.clone(),
            deleted_count,
            failed_deletions,
            persisted,
        })
    }

    /// Persisted aggregates and lifecycle timestamps for one post.
    pub async fn statistics(&self, id: &PostId) -> HubcastResult<PostStatistics> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| HubcastError::NotFound(format!("post {id} not found")))?;
        Ok(PostStatistics {
            id: post.id,
            status: post.status,
            total_sent: post.total_sent,
            total_failed: post.total_failed,
            sent_targets: post.sent.len(),
            failed_targets: post.failed.len(),
            created_at: post.created_at,
            sent_at: post.sent_at,
            deleted_at: post.deleted_at,
        })
    }

    /// Startup sweep: re-registers a task for every durable Scheduled post.
    ///
    /// Timers do not survive a restart on their own; this pass closes the gap
    /// for posts whose publish time is still ahead and promptly distributes
    /// those that came due while the process was down. Returns the number of
    /// posts re-registered.
    pub async fn recover(self: &Arc<Self>) -> HubcastResult<usize> {
        let pending = self.posts.scheduled_posts().await?;
        let count = pending.len();
        let now = Utc::now();
        for post in pending {
            let delay = (post.publish_at - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            self.spawn_distribution(post.id, delay);
        }
        if count > 0 {
            info!(count, "recovered scheduled posts");
        }
        Ok(count)
    }

    /// Adds a fan-out target by handle. A leading `@` is stripped.
    pub async fn add_target(&self, handle: &str, now: DateTime<Utc>) -> HubcastResult<()> {
        let handle = normalize_handle(handle)?;
        self.targets.add_target(&handle, now).await?;
        info!(handle, "auto-post target added");
        Ok(())
    }

    /// Removes a fan-out target. Returns whether it existed.
    pub async fn remove_target(&self, handle: &str) -> HubcastResult<bool> {
        let handle = normalize_handle(handle)?;
        let removed = self.targets.remove_target(&handle).await?;
        if removed {
            info!(handle, "auto-post target removed");
        }
        Ok(removed)
    }

    /// Deactivates a target without discarding its history.
    pub async fn deactivate_target(&self, handle: &str) -> HubcastResult<bool> {
        let handle = normalize_handle(handle)?;
        self.targets.set_target_active(&handle, false).await
    }

    pub async fn list_targets(&self) -> HubcastResult<Vec<AutoPostTarget>> {
        self.targets.all_targets().await
    }

    fn spawn_distribution(self: &Arc<Self>, id: PostId, delay: std::time::Duration) {
        let engine = Arc::clone(self);
        let task_id = id.clone();
        self.tasks.register_with(id, || {
            tokio::spawn(async move {
                sleep(delay).await;
                // Take ownership of the registration before any work so a
                // late cancel cannot abort an in-flight run.
                if !engine.tasks.claim(&task_id) {
                    return;
                }
                if let Err(e) = engine.distribute(&task_id).await {
                    error!(post = %task_id, error = %e, "deferred distribution failed");
                }
            })
        });
    }

    fn spawn_deletion(self: &Arc<Self>, id: PostId, delay: std::time::Duration) {
        let engine = Arc::clone(self);
        let task_id = id.clone();
        self.tasks.register_with(id, || {
            tokio::spawn(async move {
                sleep(delay).await;
                if !engine.tasks.claim(&task_id) {
                    return;
                }
                if let Err(e) = engine.delete_post(&task_id).await {
                    error!(post = %task_id, error = %e, "deferred deletion failed");
                }
            })
        });
    }

    async fn attempt_send(
        &self,
        post: &ScheduledPost,
        target: &AutoPostTarget,
        keyboard: &Keyboard,
        sent: &mut Vec<SendOutcome>,
        failed: &mut Vec<SendFailure>,
    ) {
        let chat = ChatRef::Handle(target.handle.clone());
        let buttons = (!keyboard.is_empty()).then_some(keyboard);
        let result = match &post.content.image {
            Some(image) => {
                self.transport
                    .send_image(&chat, image, &post.content.text, buttons)
                    .await
            }
            None => {
                self.transport
                    .send_message(&chat, &post.content.text, buttons)
                    .await
            }
        };

        let now = Utc::now();
        match result {
            Ok(message) => {
                sent.push(SendOutcome {
                    target: target.handle.clone(),
                    message,
                    at: now,
                });
                if let Err(e) = self.targets.record_target_success(&target.handle, now).await {
                    warn!(target = %target.handle, error = %e, "failed to record target success");
                }
            }
            Err(e) => {
                warn!(target = %target.handle, error = %e, "send failed");
                failed.push(SendFailure {
                    target: target.handle.clone(),
                    error: e.to_string(),
                    at: now,
                });
                if let Err(e) = self.targets.record_target_failure(&target.handle).await {
                    warn!(target = %target.handle, error = %e, "failed to record target failure");
                }
            }
        }
    }

    /// Button layout: category links packed two per row, then the post's
    /// custom rows below.
    fn build_keyboard(&self, post: &ScheduledPost) -> Keyboard {
        let mut keyboard = Keyboard::default();
        let mut row = Vec::new();
        for category in Category::iter() {
            let Some(url) = self.hub.category_link(category) else {
                continue;
            };
            row.push(Button::url(category.to_string(), url));
            if row.len() == 2 {
                keyboard.push_row(std::mem::take(&mut row));
            }
        }
        keyboard.push_row(row);

        for custom_row in &post.content.custom_buttons {
            keyboard.push_row(custom_row.clone());
        }
        keyboard
    }

    async fn notify_distribution(&self, id: &PostId, sent: &[SendOutcome], failed: &[SendFailure]) {
        let mut message = format!(
            "Broadcast result for post {id}\n\nSent: {} channels\nFailed: {} channels\n",
            sent.len(),
            failed.len()
        );
        if !failed.is_empty() {
            message.push_str("\nChannels with errors:\n");
            for failure in failed.iter().take(SUMMARY_FAILURE_LIMIT) {
                message.push_str(&format!("• @{}: {}\n", failure.target, failure.error));
            }
            if failed.len() > SUMMARY_FAILURE_LIMIT {
                message.push_str(&format!(
                    "…and {} more\n",
                    failed.len() - SUMMARY_FAILURE_LIMIT
                ));
            }
        }
        self.best_effort_notify(&message).await;
    }

    /// Operator notifications never fail the surrounding run.
    async fn best_effort_notify(&self, text: &str) {
        let operator = ChatRef::from(self.hub.operator());
        if let Err(e) = self.transport.send_message(&operator, text, None).await {
            warn!(error = %e, "operator notification failed");
        }
    }
}

/// Generates a fresh post identity.
pub fn new_post_id() -> PostId {
    PostId(uuid::Uuid::new_v4().to_string())
}

fn normalize_handle(handle: &str) -> HubcastResult<String> {
    let handle = handle.trim_start_matches('@').trim();
    if handle.is_empty() {
        return Err(HubcastError::Validation(
            "target handle must not be empty".to_string(),
        ));
    }
    Ok(handle.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_normalization_strips_the_at_prefix() {
        assert_eq!(normalize_handle("@promo").unwrap(), "promo");
        assert_eq!(normalize_handle("promo").unwrap(), "promo");
        assert!(normalize_handle("@").is_err());
        assert!(normalize_handle("  ").is_err());
    }
}
