// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Hubcast directory bot.
//!
//! TOML configuration with XDG hierarchy, environment variable overrides,
//! and strict unknown-key rejection.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{HubConfig, HubcastConfig, StorageConfig, TelegramConfig, ThrottleConfig};
