// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission moderation for the channel directory.
//!
//! Free-text registration requests are parsed by [`parser`], tracked as
//! pending submissions in [`pending`], and driven through their lifecycle by
//! [`ModerationService`]. Approvals feed the channel registry and rebuild the
//! public category feed rendered by [`feed`].

pub mod feed;
pub mod parser;
pub mod pending;
pub mod service;

pub use parser::{parse_submission, ParsedSubmission, USAGE_HINT};
pub use pending::PendingIndex;
pub use service::ModerationService;
