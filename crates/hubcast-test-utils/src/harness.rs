// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling a temp-SQLite store, a mock transport, and a hub
//! configuration suitable for driving the full moderation and broadcast
//! pipelines in tests.

use std::collections::HashMap;
use std::sync::Arc;

use hubcast_config::HubConfig;
use hubcast_core::types::Category;
use hubcast_core::HubcastResult;
use hubcast_storage::SqliteStore;
use strum::IntoEnumIterator;

use crate::mock_transport::MockTransport;

/// The operator id used by every harness.
pub const OPERATOR_ID: i64 = 1000;

/// The category channel id used by every harness.
pub const CATEGORY_CHANNEL_ID: i64 = -1002259108243;

pub struct TestHarness {
    pub store: Arc<SqliteStore>,
    pub transport: Arc<MockTransport>,
    pub hub: HubConfig,
    // Held so the database file outlives the harness.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Builds a harness with a fresh temp database and a feed message
    /// configured for every category.
    pub async fn new() -> HubcastResult<Self> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| hubcast_core::HubcastError::Internal(e.to_string()))?;
        let db_path = temp_dir.path().join("hubcast-test.db");
        let store = SqliteStore::open_path(&db_path.to_string_lossy()).await?;

        let feed_messages: HashMap<Category, i64> = Category::iter()
            .enumerate()
            .map(|(i, c)| (c, (i as i64 + 2) * 2))
            .collect();

        Ok(Self {
            store: Arc::new(store),
            transport: Arc::new(MockTransport::new()),
            hub: HubConfig {
                operator_id: OPERATOR_ID,
                category_channel_id: CATEGORY_CHANNEL_ID,
                feed_messages,
            },
            _temp_dir: temp_dir,
        })
    }
}
