// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound messaging transport seam.
//!
//! The core never talks to a messaging platform directly; it sends, edits,
//! and deletes messages through this trait. Every failure is a typed
//! [`HubcastError::Delivery`] naming the one target it concerns.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::HubcastError;
use crate::types::{ChatRef, Keyboard, MemberRole, MessageRef, UserId};

/// Capability to deliver, edit, and remove messages on a named chat, and to
/// query or restrict chat members.
///
/// Operator and requester notifications are plain sends through this same
/// contract; there is no separate notification protocol.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a text message, optionally with an inline keyboard.
    async fn send_message(
        &self,
        target: &ChatRef,
        text: &str,
        buttons: Option<&Keyboard>,
    ) -> Result<MessageRef, HubcastError>;

    /// Sends an image with a caption, optionally with an inline keyboard.
    async fn send_image(
        &self,
        target: &ChatRef,
        image: &str,
        caption: &str,
        buttons: Option<&Keyboard>,
    ) -> Result<MessageRef, HubcastError>;

    /// Replaces the text of a previously delivered message.
    async fn edit_message(
        &self,
        target: &ChatRef,
        message: MessageRef,
        text: &str,
    ) -> Result<(), HubcastError>;

    /// Removes a previously delivered message.
    async fn delete_message(&self, target: &ChatRef, message: MessageRef)
        -> Result<(), HubcastError>;

    /// Applies a platform-level send restriction to a user for `duration`.
    async fn restrict_user(
        &self,
        chat: &ChatRef,
        user: UserId,
        duration: Duration,
    ) -> Result<(), HubcastError>;

    /// Looks up a user's role in a chat.
    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user: UserId,
    ) -> Result<MemberRole, HubcastError>;
}
