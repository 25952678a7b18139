// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation state machine for channel submissions.
//!
//! Submissions move Pending -> Approved | Rejected | Cancelled; every
//! terminal transition removes the record from both the in-memory index and
//! the durable store in the same operation. Only the configured operator may
//! approve or reject; only the originating requester may cancel or check
//! status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{info, warn};

use hubcast_config::HubConfig;
use hubcast_core::traits::{RegistryStore, SubmissionStore, Transport};
use hubcast_core::types::{
    Button, Category, ChannelEntry, ChatId, ChatRef, Keyboard, MessageRef, RejectReason,
    Submission, SubmissionId, SubmissionStatus, UserId,
};
use hubcast_core::{HubcastError, HubcastResult};

use crate::parser::parse_submission;
use crate::pending::PendingIndex;
use crate::feed::render_feed;

pub struct ModerationService {
    registry: Arc<dyn RegistryStore>,
    submissions: Arc<dyn SubmissionStore>,
    transport: Arc<dyn Transport>,
    pending: PendingIndex,
    hub: HubConfig,
}

impl ModerationService {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        submissions: Arc<dyn SubmissionStore>,
        transport: Arc<dyn Transport>,
        hub: HubConfig,
    ) -> Self {
        Self {
            registry,
            submissions,
            transport,
            pending: PendingIndex::new(),
            hub,
        }
    }

    /// Rebuilds the in-memory pending index from durable records. Call once
    /// at startup before handling any inbound event.
    pub async fn reconcile(&self) -> HubcastResult<usize> {
        let stored = self.submissions.pending_submissions().await?;
        let count = stored.len();
        self.pending.reload(stored);
        if count > 0 {
            info!(count, "reloaded pending submissions");
        }
        Ok(count)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Processes a raw registration message from `requester`.
    ///
    /// Parses the text, rejects handles already in the registry, stores the
    /// submission durably and in memory, and notifies both the operator and
    /// the requester. Returns the submission identity.
    pub async fn submit(
        &self,
        raw_text: &str,
        requester: UserId,
        requester_name: &str,
        origin_chat: ChatId,
        origin_message: MessageRef,
        now: DateTime<Utc>,
    ) -> HubcastResult<SubmissionId> {
        let parsed = parse_submission(raw_text)?;

        if let Some(existing) = self.registry.entry_by_handle(&parsed.handle).await? {
            return Err(HubcastError::Duplicate {
                handle: parsed.handle,
                category: existing.category.to_string(),
            });
        }

        let link = parsed.canonical_link();
        let submission = Submission {
            id: SubmissionId::derive(requester, origin_message),
            requester,
            requester_name: requester_name.to_string(),
            category: parsed.category,
            channel_name: parsed.name,
            handle: parsed.handle,
            channel_id: parsed.channel_id,
            link,
            origin_chat,
            origin_message,
            status: SubmissionStatus::Pending,
            created_at: now,
        };

        // Durable record first; the index only ever trails the store, and
        // startup reconciliation closes any gap.
        self.submissions.insert_submission(&submission).await?;
        self.pending.insert(submission.clone());
        counter!("hubcast_submissions_total").increment(1);
        info!(id = %submission.id, handle = %submission.handle, "submission stored");

        self.notify_operator_of_submission(&submission).await;
        self.notify_requester_of_submission(&submission).await;

        Ok(submission.id)
    }

    /// Approves a pending submission, writing the registry entry and
    /// rebuilding the category feed.
    pub async fn approve(
        &self,
        id: &SubmissionId,
        acting_user: UserId,
        now: DateTime<Utc>,
    ) -> HubcastResult<ChannelEntry> {
        self.require_operator(acting_user)?;
        let submission = self
            .pending
            .get(id)
            .ok_or_else(|| HubcastError::NotFound(format!("submission {id} is not pending")))?;

        let entry = ChannelEntry {
            channel_id: submission.channel_id,
            name: submission.channel_name.clone(),
            handle: submission.handle.clone(),
            category: submission.category,
            added_by: submission.requester,
            link: submission.link.clone(),
            subscribers: 0,
            created_at: now,
            updated_at: now,
        };
        self.registry.insert_entry(&entry).await?;
        self.rebuild_feed(submission.category).await?;

        let total = self.registry.count_in_category(submission.category).await?;
        self.remove_everywhere(id).await?;
        counter!("hubcast_submissions_approved_total").increment(1);
        info!(id = %id, handle = %entry.handle, category = %entry.category, "submission approved");

        let mut keyboard = Keyboard::default();
        let mut row = vec![];
        if let Some(url) = self.hub.category_link(submission.category) {
            row.push(Button::url("View Category", url));
        }
        row.push(Button::url(
            "Share Channel",
            format!(
                "https://t.me/share/url?url=https://t.me/{}",
                submission.handle
            ),
        ));
        keyboard.push_row(row);

        self.best_effort_send(
            &ChatRef::from(submission.origin_chat),
            &format!(
                "Your channel {} has been approved and added to the {} category.",
                submission.channel_name, submission.category
            ),
            Some(&keyboard),
        )
        .await;
        self.best_effort_send(
            &self.operator_chat(),
            &format!(
                "Channel approved and added to {}. Channels in category: {total}.",
                submission.category
            ),
            None,
        )
        .await;

        Ok(entry)
    }

    /// Rejects a pending submission with a reason, notifying the requester.
    pub async fn reject(
        &self,
        id: &SubmissionId,
        acting_user: UserId,
        reason: RejectReason,
    ) -> HubcastResult<()> {
        self.require_operator(acting_user)?;
        let submission = self
            .pending
            .get(id)
            .ok_or_else(|| HubcastError::NotFound(format!("submission {id} is not pending")))?;

        self.remove_everywhere(id).await?;
        counter!("hubcast_submissions_rejected_total").increment(1);
        info!(id = %id, handle = %submission.handle, "submission rejected");

        self.best_effort_send(
            &ChatRef::from(submission.origin_chat),
            &format!(
                "Your request to add the channel {} to the {} category was rejected.\n\nReason: {}",
                submission.channel_name,
                submission.category,
                reason.message()
            ),
            None,
        )
        .await;
        self.best_effort_send(
            &self.operator_chat(),
            &format!(
                "Rejection sent to the requester for channel {}.\nReason: {}",
                submission.channel_name,
                reason.message()
            ),
            None,
        )
        .await;

        Ok(())
    }

    /// Cancels a pending submission. Only the originating requester may
    /// cancel; the registry is never touched.
    pub async fn cancel(&self, id: &SubmissionId, requester: UserId) -> HubcastResult<()> {
        let submission = self
            .pending
            .get(id)
            .ok_or_else(|| HubcastError::NotFound(format!("submission {id} is not pending")))?;
        if submission.requester != requester {
            return Err(HubcastError::Permission(
                "only the requester who submitted the request may cancel it".to_string(),
            ));
        }

        self.remove_everywhere(id).await?;
        info!(id = %id, "submission cancelled");
        Ok(())
    }

    /// Read-only status check, restricted to the originating requester.
    pub async fn check_status(
        &self,
        id: &SubmissionId,
        requester: UserId,
    ) -> HubcastResult<Submission> {
        let submission = self
            .pending
            .get(id)
            .ok_or_else(|| HubcastError::NotFound(format!("submission {id} is not pending")))?;
        if submission.requester != requester {
            return Err(HubcastError::Permission(
                "only the requester who submitted the request may check its status".to_string(),
            ));
        }
        Ok(submission)
    }

    /// Removes a registered channel by handle and rebuilds its category feed.
    /// Operator command surface.
    pub async fn remove_channel(
        &self,
        handle: &str,
        acting_user: UserId,
    ) -> HubcastResult<Category> {
        self.require_operator(acting_user)?;
        let entry = self
            .registry
            .entry_by_handle(handle)
            .await?
            .ok_or_else(|| HubcastError::NotFound(format!("channel @{handle} not found")))?;

        self.registry.delete_entry(handle).await?;
        self.rebuild_feed(entry.category).await?;
        info!(handle, category = %entry.category, "channel removed");
        Ok(entry.category)
    }

    /// The channels a requester has registered, for the self-service listing.
    pub async fn requester_channels(&self, requester: UserId) -> HubcastResult<Vec<ChannelEntry>> {
        self.registry.entries_by_requester(requester).await
    }

    /// Rewrites a category's public feed message from current registry state.
    /// Idempotent; safe to call after any membership change.
    pub async fn rebuild_feed(&self, category: Category) -> HubcastResult<()> {
        let Some(message) = self.hub.feed_message(category) else {
            warn!(%category, "no feed message configured, skipping rebuild");
            return Ok(());
        };
        let entries = self.registry.entries_in_category(category).await?;
        let text = render_feed(category, &entries);
        self.transport
            .edit_message(&self.hub.category_channel(), message, &text)
            .await
    }

    fn require_operator(&self, acting_user: UserId) -> HubcastResult<()> {
        if acting_user != self.hub.operator() {
            return Err(HubcastError::Permission(
                "only the operator may approve or reject submissions".to_string(),
            ));
        }
        Ok(())
    }

    fn operator_chat(&self) -> ChatRef {
        ChatRef::from(self.hub.operator())
    }

    /// Removes the submission from the durable store and the index together.
    async fn remove_everywhere(&self, id: &SubmissionId) -> HubcastResult<()> {
        self.submissions.delete_submission(id).await?;
        self.pending.remove(id);
        Ok(())
    }

    async fn notify_operator_of_submission(&self, submission: &Submission) {
        let mut keyboard = Keyboard::default();
        keyboard.push_row(vec![
            Button::callback("Approve", format!("approve_{}", submission.id)),
            Button::callback("Reject", format!("reject_{}", submission.id)),
        ]);
        let mut row = vec![Button::url(
            "View Channel",
            format!("https://t.me/{}", submission.handle),
        )];
        if let Some(url) = self.hub.category_link(submission.category) {
            row.push(Button::url("View Category", url));
        }
        keyboard.push_row(row);

        self.best_effort_send(
            &self.operator_chat(),
            &format!(
                "New channel submission\n\nRequester: {}\nCategory: {}\nChannel: {}\nHandle: @{}\nID: {}\n\nApprove this request?",
                submission.requester_name,
                submission.category,
                submission.channel_name,
                submission.handle,
                submission.channel_id
            ),
            Some(&keyboard),
        )
        .await;
    }

    async fn notify_requester_of_submission(&self, submission: &Submission) {
        let mut keyboard = Keyboard::default();
        keyboard.push_row(vec![
            Button::callback("Request Status", format!("check_status_{}", submission.id)),
            Button::callback("Cancel Request", format!("cancel_{}", submission.id)),
        ]);

        self.best_effort_send(
            &ChatRef::from(submission.origin_chat),
            &format!(
                "Your request to add the channel {} to the {} category has been sent to the operator for approval.",
                submission.channel_name, submission.category
            ),
            Some(&keyboard),
        )
        .await;
    }

    /// Notification sends never fail the surrounding operation.
    async fn best_effort_send(&self, target: &ChatRef, text: &str, keyboard: Option<&Keyboard>) {
        if let Err(e) = self.transport.send_message(target, text, keyboard).await {
            warn!(%target, error = %e, "notification send failed");
        }
    }
}
