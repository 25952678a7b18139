// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport adapter for Hubcast.
//!
//! Implements the [`Transport`] contract against the Telegram Bot API via
//! teloxide: HTML-formatted sends, inline keyboard mapping, message edits
//! and deletions, member-role lookups, and send restrictions for the abuse
//! throttle.

pub mod markup;

use async_trait::async_trait;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatPermissions, InputFile, MessageId, ParseMode, Recipient};
use tracing::debug;

use hubcast_config::TelegramConfig;
use hubcast_core::traits::Transport;
use hubcast_core::types::{ChatRef, Keyboard, MemberRole, MessageRef, UserId};
use hubcast_core::{HubcastError, HubcastResult};

use crate::markup::to_inline_keyboard;

/// Telegram implementation of the messaging transport.
#[derive(Debug)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Creates a transport from configuration.
    ///
    /// Requires `telegram.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> HubcastResult<Self> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            HubcastError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;
        if token.is_empty() {
            return Err(HubcastError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }
        Ok(Self {
            bot: Bot::new(token),
        })
    }

    pub fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }
}

fn recipient(target: &ChatRef) -> Recipient {
    match target {
        ChatRef::Handle(handle) => Recipient::ChannelUsername(format!("@{handle}")),
        ChatRef::Id(id) => Recipient::Id(ChatId(*id)),
    }
}

fn delivery_error(target: &ChatRef, e: teloxide::RequestError) -> HubcastError {
    HubcastError::Delivery {
        target: target.to_string(),
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

/// Images are referenced either by URL or by a local file path.
fn input_file(image: &str) -> InputFile {
    match reqwest::Url::parse(image) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => InputFile::url(url),
        _ => InputFile::file(std::path::PathBuf::from(image)),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_message(
        &self,
        target: &ChatRef,
        text: &str,
        buttons: Option<&Keyboard>,
    ) -> Result<MessageRef, HubcastError> {
        let mut request = self
            .bot
            .send_message(recipient(target), text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = buttons {
            request = request.reply_markup(to_inline_keyboard(keyboard));
        }
        let message = request.await.map_err(|e| delivery_error(target, e))?;
        metrics::counter!("hubcast_telegram_sends_total").increment(1);
        debug!(%target, message_id = message.id.0, "message sent");
        Ok(MessageRef(i64::from(message.id.0)))
    }

    async fn send_image(
        &self,
        target: &ChatRef,
        image: &str,
        caption: &str,
        buttons: Option<&Keyboard>,
    ) -> Result<MessageRef, HubcastError> {
        let mut request = self
            .bot
            .send_photo(recipient(target), input_file(image))
            .caption(caption.to_string())
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = buttons {
            request = request.reply_markup(to_inline_keyboard(keyboard));
        }
        let message = request.await.map_err(|e| delivery_error(target, e))?;
        metrics::counter!("hubcast_telegram_sends_total").increment(1);
        Ok(MessageRef(i64::from(message.id.0)))
    }

    async fn edit_message(
        &self,
        target: &ChatRef,
        message: MessageRef,
        text: &str,
    ) -> Result<(), HubcastError> {
        self.bot
            .edit_message_text(recipient(target), MessageId(message.0 as i32), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| delivery_error(target, e))?;
        Ok(())
    }

    async fn delete_message(
        &self,
        target: &ChatRef,
        message: MessageRef,
    ) -> Result<(), HubcastError> {
        self.bot
            .delete_message(recipient(target), MessageId(message.0 as i32))
            .await
            .map_err(|e| delivery_error(target, e))?;
        Ok(())
    }

    async fn restrict_user(
        &self,
        chat: &ChatRef,
        user: UserId,
        duration: Duration,
    ) -> Result<(), HubcastError> {
        let until = chrono::Utc::now() + chrono::Duration::from_std(duration).unwrap_or_default();
        self.bot
            .restrict_chat_member(
                recipient(chat),
                teloxide::types::UserId(user.0 as u64),
                ChatPermissions::empty(),
            )
            .until_date(until)
            .await
            .map_err(|e| delivery_error(chat, e))?;
        Ok(())
    }

    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user: UserId,
    ) -> Result<MemberRole, HubcastError> {
        let member = self
            .bot
            .get_chat_member(recipient(chat), teloxide::types::UserId(user.0 as u64))
            .await
            .map_err(|e| delivery_error(chat, e))?;
        let kind = &member.kind;
        Ok(if kind.is_owner() {
            MemberRole::Owner
        } else if kind.is_administrator() {
            MemberRole::Administrator
        } else if kind.is_restricted() {
            MemberRole::Restricted
        } else if kind.is_left() {
            MemberRole::Left
        } else if kind.is_banned() {
            MemberRole::Banned
        } else {
            MemberRole::Member
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_maps_handles_and_ids() {
        assert_eq!(
            recipient(&ChatRef::Handle("promo".into())),
            Recipient::ChannelUsername("@promo".into())
        );
        assert_eq!(
            recipient(&ChatRef::Id(-100123)),
            Recipient::Id(ChatId(-100123))
        );
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = TelegramTransport::new(&TelegramConfig { bot_token: None }).unwrap_err();
        assert!(matches!(err, HubcastError::Config(_)));
    }
}
