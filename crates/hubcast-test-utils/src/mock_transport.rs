// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` with captured outbound traffic and
//! scriptable per-target failures, so distribution and moderation flows can
//! be asserted without a live platform connection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hubcast_core::traits::Transport;
use hubcast_core::types::{ChatRef, Keyboard, MemberRole, MessageRef, UserId};
use hubcast_core::HubcastError;

/// A message captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub target: ChatRef,
    pub text: String,
    pub image: Option<String>,
    pub keyboard: Option<Keyboard>,
    pub message: MessageRef,
}

/// An edit captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedMessage {
    pub target: ChatRef,
    pub message: MessageRef,
    pub text: String,
}

/// A restriction captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    pub chat: ChatRef,
    pub user: UserId,
    pub duration: Duration,
}

/// A mock messaging transport.
///
/// Sends are captured for assertion. Targets registered via
/// [`fail_target`](Self::fail_target) reject every send and delete with a
/// delivery error, which is how tests exercise partial-failure paths.
pub struct MockTransport {
    sent: Mutex<Vec<SentMessage>>,
    edited: Mutex<Vec<EditedMessage>>,
    deleted: Mutex<Vec<(ChatRef, MessageRef)>>,
    restrictions: Mutex<Vec<Restriction>>,
    failing: Mutex<HashSet<String>>,
    roles: Mutex<HashMap<(ChatRef, UserId), MemberRole>>,
    send_delay: Mutex<Option<Duration>>,
    next_message_id: AtomicI64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            edited: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            restrictions: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            roles: Mutex::new(HashMap::new()),
            send_delay: Mutex::new(None),
            next_message_id: AtomicI64::new(1),
        }
    }

    /// Delays every send by `delay`, letting tests race other operations
    /// against an in-flight run.
    pub async fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().await = Some(delay);
    }

    /// Makes every send and delete aimed at `target` fail.
    pub async fn fail_target(&self, target: &ChatRef) {
        self.failing.lock().await.insert(target.to_string());
    }

    /// Sets the role reported for `user` in `chat`. Unset pairs report
    /// `Member`.
    pub async fn set_role(&self, chat: ChatRef, user: UserId, role: MemberRole) {
        self.roles.lock().await.insert((chat, user), role);
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one target, in order.
    pub async fn sent_to(&self, target: &ChatRef) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| &m.target == target)
            .cloned()
            .collect()
    }

    pub async fn edited_messages(&self) -> Vec<EditedMessage> {
        self.edited.lock().await.clone()
    }

    pub async fn deleted_messages(&self) -> Vec<(ChatRef, MessageRef)> {
        self.deleted.lock().await.clone()
    }

    pub async fn restrictions(&self) -> Vec<Restriction> {
        self.restrictions.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.edited.lock().await.clear();
        self.deleted.lock().await.clear();
        self.restrictions.lock().await.clear();
    }

    async fn pause(&self) {
        let delay = *self.send_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn check_target(&self, target: &ChatRef) -> Result<(), HubcastError> {
        if self.failing.lock().await.contains(&target.to_string()) {
            return Err(HubcastError::delivery(
                target.to_string(),
                "chat not found",
            ));
        }
        Ok(())
    }

    fn next_ref(&self) -> MessageRef {
        MessageRef(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_message(
        &self,
        target: &ChatRef,
        text: &str,
        buttons: Option<&Keyboard>,
    ) -> Result<MessageRef, HubcastError> {
        self.pause().await;
        self.check_target(target).await?;
        let message = self.next_ref();
        self.sent.lock().await.push(SentMessage {
            target: target.clone(),
            text: text.to_string(),
            image: None,
            keyboard: buttons.cloned(),
            message,
        });
        Ok(message)
    }

    async fn send_image(
        &self,
        target: &ChatRef,
        image: &str,
        caption: &str,
        buttons: Option<&Keyboard>,
    ) -> Result<MessageRef, HubcastError> {
        self.pause().await;
        self.check_target(target).await?;
        let message = self.next_ref();
        self.sent.lock().await.push(SentMessage {
            target: target.clone(),
            text: caption.to_string(),
            image: Some(image.to_string()),
            keyboard: buttons.cloned(),
            message,
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        target: &ChatRef,
        message: MessageRef,
        text: &str,
    ) -> Result<(), HubcastError> {
        self.check_target(target).await?;
        self.edited.lock().await.push(EditedMessage {
            target: target.clone(),
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        target: &ChatRef,
        message: MessageRef,
    ) -> Result<(), HubcastError> {
        self.check_target(target).await?;
        self.deleted.lock().await.push((target.clone(), message));
        Ok(())
    }

    async fn restrict_user(
        &self,
        chat: &ChatRef,
        user: UserId,
        duration: Duration,
    ) -> Result<(), HubcastError> {
        self.restrictions.lock().await.push(Restriction {
            chat: chat.clone(),
            user,
            duration,
        });
        Ok(())
    }

    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user: UserId,
    ) -> Result<MemberRole, HubcastError> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&(chat.clone(), user))
            .copied()
            .unwrap_or(MemberRole::Member))
    }
}
