// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hubcast directory bot.
//!
//! This crate provides the foundational trait seams, error types, and common
//! types used throughout the Hubcast workspace: the messaging transport
//! contract, the four persistence contracts, and the shared domain model
//! (categories, registry entries, targets, posts, and submissions).

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{HubcastError, HubcastResult};
pub use traits::{PostStore, RegistryStore, SubmissionStore, TargetStore, Transport};
pub use types::{
    Category, ChatId, ChatRef, MessageRef, PostId, PostStatus, SubmissionId, SubmissionStatus,
    UserId,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_cover_the_taxonomy() {
        let _validation = HubcastError::Validation("bad input".into());
        let _duplicate = HubcastError::Duplicate {
            handle: "news".into(),
            category: "News".into(),
        };
        let _permission = HubcastError::Permission("not the operator".into());
        let _not_found = HubcastError::NotFound("post 1".into());
        let _delivery = HubcastError::delivery("@news", "blocked by channel");
        let _storage = HubcastError::storage(std::io::Error::other("disk"));
        let _config = HubcastError::Config("missing token".into());
        let _internal = HubcastError::Internal("unexpected".into());
    }

    #[test]
    fn delivery_error_names_its_target() {
        let err = HubcastError::delivery("@news", "chat not found");
        assert_eq!(err.to_string(), "delivery to @news failed: chat not found");
    }

    #[test]
    fn duplicate_error_names_the_existing_category() {
        let err = HubcastError::Duplicate {
            handle: "dailymemes".into(),
            category: Category::MemesAndHumor.to_string(),
        };
        assert!(err.to_string().contains("Memes & Humor"));
    }

    #[test]
    fn trait_objects_are_constructible() {
        // The seams must stay object-safe; consumers hold them as Arc<dyn _>.
        fn _assert_transport(_: &dyn Transport) {}
        fn _assert_registry(_: &dyn RegistryStore) {}
        fn _assert_targets(_: &dyn TargetStore) {}
        fn _assert_posts(_: &dyn PostStore) {}
        fn _assert_submissions(_: &dyn SubmissionStore) {}
    }
}
