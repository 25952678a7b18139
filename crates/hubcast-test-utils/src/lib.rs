// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hubcast integration tests.
//!
//! Provides a mock transport with scriptable per-target failures and a
//! harness that assembles a temp SQLite store with a ready-made hub
//! configuration, for fast, deterministic, CI-runnable tests without a live
//! platform connection.

pub mod harness;
pub mod mock_transport;

pub use harness::{TestHarness, CATEGORY_CHANNEL_ID, OPERATOR_ID};
pub use mock_transport::{EditedMessage, MockTransport, Restriction, SentMessage};
