// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hubcast directory bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;

use hubcast_core::types::{Category, ChatRef, MessageRef, UserId};
use serde::{Deserialize, Serialize};

/// Top-level Hubcast configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubcastConfig {
    /// Hub community, operator, and category feed settings.
    #[serde(default)]
    pub hub: HubConfig,

    /// Sliding-window abuse throttle settings.
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Hub community configuration: who the operator is and where the public
/// category feed lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// The single privileged administrative actor.
    #[serde(default)]
    pub operator_id: i64,

    /// The channel holding one pinned feed message per category.
    #[serde(default)]
    pub category_channel_id: i64,

    /// Feed message id per category within the category channel.
    #[serde(default)]
    pub feed_messages: HashMap<Category, i64>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            operator_id: 0,
            category_channel_id: 0,
            feed_messages: HashMap::new(),
        }
    }
}

impl HubConfig {
    pub fn operator(&self) -> UserId {
        UserId(self.operator_id)
    }

    pub fn category_channel(&self) -> ChatRef {
        ChatRef::Id(self.category_channel_id)
    }

    /// The feed message to rewrite when a category's membership changes.
    pub fn feed_message(&self, category: Category) -> Option<MessageRef> {
        self.feed_messages.get(&category).copied().map(MessageRef)
    }

    /// Public deep link to a category's feed message.
    ///
    /// Private-channel links drop the `-100` marker from the chat id:
    /// chat `-1002259108243`, message `4` links as `t.me/c/2259108243/4`.
    pub fn category_link(&self, category: Category) -> Option<String> {
        let message_id = self.feed_messages.get(&category)?;
        let internal = self
            .category_channel_id
            .to_string()
            .trim_start_matches("-100")
            .to_string();
        Some(format!("https://t.me/c/{internal}/{message_id}"))
    }
}

/// Sliding-window abuse throttle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Messages retained within the window before the throttle trips.
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    /// Mute duration applied when the throttle trips, in seconds.
    #[serde(default = "default_mute_secs")]
    pub mute_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            message_limit: default_message_limit(),
            mute_secs: default_mute_secs(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_message_limit() -> usize {
    5
}

fn default_mute_secs() -> u64 {
    300
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("hubcast/hubcast.db").to_string_lossy().into_owned())
        .unwrap_or_else(|| "hubcast.db".to_string())
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. Required when the Telegram transport is used.
    #[serde(default)]
    pub bot_token: Option<String>,
}
