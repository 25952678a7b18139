// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the core components and their external collaborators.
//!
//! All seams use `#[async_trait]` for dynamic dispatch compatibility.

pub mod store;
pub mod transport;

pub use store::{PostStore, RegistryStore, SubmissionStore, TargetStore};
pub use transport::Transport;
