// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end moderation flow tests against a temp SQLite store and a mock
//! transport.

use chrono::Utc;
use hubcast_core::types::{
    Category, ChatId, ChatRef, MessageRef, RejectReason, SubmissionStatus, UserId,
};
use hubcast_core::HubcastError;
use hubcast_moderation::ModerationService;
use hubcast_test_utils::{TestHarness, CATEGORY_CHANNEL_ID, OPERATOR_ID};

const REQUESTER: UserId = UserId(42);
const GROUP: ChatId = ChatId(-100555);

const RAW: &str = "#Anime\nAnime World\n@animeworld\nID -1001234567890\n@admin bot added";

fn service(harness: &TestHarness) -> ModerationService {
    ModerationService::new(
        harness.store.clone(),
        harness.store.clone(),
        harness.transport.clone(),
        harness.hub.clone(),
    )
}

#[tokio::test]
async fn submit_then_check_status_round_trips() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();
    assert_eq!(id.0, "42_1001");

    let status = svc.check_status(&id, REQUESTER).await.unwrap();
    assert_eq!(status.status, SubmissionStatus::Pending);
    assert_eq!(status.category, Category::Anime);
    assert_eq!(status.channel_name, "Anime World");
    assert_eq!(status.handle, "animeworld");

    // Operator prompt and requester acknowledgement both went out.
    let operator_chat = ChatRef::Id(OPERATOR_ID);
    assert_eq!(harness.transport.sent_to(&operator_chat).await.len(), 1);
    assert_eq!(
        harness.transport.sent_to(&ChatRef::Id(GROUP.0)).await.len(),
        1
    );

    svc.cancel(&id, REQUESTER).await.unwrap();
    assert!(matches!(
        svc.check_status(&id, REQUESTER).await,
        Err(HubcastError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_numeric_id_never_reaches_any_store() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let raw = "#Anime\nAnime World\n@animeworld\n@admin bot added";
    let err = svc
        .submit(raw, REQUESTER, "Ana", GROUP, MessageRef(1), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, HubcastError::Validation(msg) if msg.contains("#Category")));

    assert_eq!(svc.pending_count(), 0);
    use hubcast_core::traits::SubmissionStore;
    assert!(harness.store.pending_submissions().await.unwrap().is_empty());
    assert!(harness.transport.sent_messages().await.is_empty());
}

#[tokio::test]
async fn approve_writes_the_registry_and_rebuilds_the_feed() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();

    let entry = svc
        .approve(&id, UserId(OPERATOR_ID), Utc::now())
        .await
        .unwrap();
    assert_eq!(entry.handle, "animeworld");
    assert_eq!(entry.added_by, REQUESTER);

    use hubcast_core::traits::RegistryStore;
    let stored = harness
        .store
        .entry_by_handle("animeworld")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.category, Category::Anime);

    // Feed rebuilt in the category channel with the new entry linked.
    let edits = harness.transport.edited_messages().await;
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].target, ChatRef::Id(CATEGORY_CHANNEL_ID));
    assert!(edits[0].text.starts_with("Anime\n\n"));
    assert!(edits[0].text.contains("[Anime World](https://t.me/animeworld)"));
}

#[tokio::test]
async fn second_approve_of_the_same_submission_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();

    svc.approve(&id, UserId(OPERATOR_ID), Utc::now())
        .await
        .unwrap();
    // A duplicate operator tap on the same prompt.
    assert!(matches!(
        svc.approve(&id, UserId(OPERATOR_ID), Utc::now()).await,
        Err(HubcastError::NotFound(_))
    ));
}

#[tokio::test]
async fn only_the_operator_may_approve_or_reject() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();

    assert!(matches!(
        svc.approve(&id, REQUESTER, Utc::now()).await,
        Err(HubcastError::Permission(_))
    ));
    assert!(matches!(
        svc.reject(&id, REQUESTER, RejectReason::Duplicate).await,
        Err(HubcastError::Permission(_))
    ));
    // Still pending after the denied attempts.
    assert_eq!(svc.pending_count(), 1);
}

#[tokio::test]
async fn reject_notifies_the_requester_with_the_reason() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();
    harness.transport.clear().await;

    svc.reject(&id, UserId(OPERATOR_ID), RejectReason::WrongCategory)
        .await
        .unwrap();

    let to_requester = harness.transport.sent_to(&ChatRef::Id(GROUP.0)).await;
    assert_eq!(to_requester.len(), 1);
    assert!(to_requester[0].text.contains("rejected"));
    assert!(to_requester[0]
        .text
        .contains("The selected category is not suitable for this channel."));
    assert_eq!(svc.pending_count(), 0);
}

#[tokio::test]
async fn duplicate_handle_is_rejected_naming_the_existing_category() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();
    svc.approve(&id, UserId(OPERATOR_ID), Utc::now())
        .await
        .unwrap();

    // Same handle, different category, different requester.
    let raw = "#Music\nAnime Beats\n@animeworld\nID -100987\n@admin ok";
    let err = svc
        .submit(raw, UserId(7), "Bo", GROUP, MessageRef(2002), Utc::now())
        .await
        .unwrap_err();
    match err {
        HubcastError::Duplicate { handle, category } => {
            assert_eq!(handle, "animeworld");
            assert_eq!(category, "Anime");
        }
        other => panic!("expected Duplicate, got {other}"),
    }
}

#[tokio::test]
async fn cancel_requires_the_originating_requester() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();

    assert!(matches!(
        svc.cancel(&id, UserId(7)).await,
        Err(HubcastError::Permission(_))
    ));
    assert!(matches!(
        svc.check_status(&id, UserId(7)).await,
        Err(HubcastError::Permission(_))
    ));

    svc.cancel(&id, REQUESTER).await.unwrap();
    use hubcast_core::traits::RegistryStore;
    assert!(harness
        .store
        .entry_by_handle("animeworld")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn startup_reconciliation_reloads_pending_submissions() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();

    // A new service over the same store starts with an empty index until it
    // reconciles.
    let restarted = service(&harness);
    assert_eq!(restarted.pending_count(), 0);
    assert_eq!(restarted.reconcile().await.unwrap(), 1);
    let status = restarted.check_status(&id, REQUESTER).await.unwrap();
    assert_eq!(status.handle, "animeworld");
}

#[tokio::test]
async fn remove_channel_rebuilds_the_feed_to_a_bare_header() {
    let harness = TestHarness::new().await.unwrap();
    let svc = service(&harness);

    let id = svc
        .submit(RAW, REQUESTER, "Ana", GROUP, MessageRef(1001), Utc::now())
        .await
        .unwrap();
    svc.approve(&id, UserId(OPERATOR_ID), Utc::now())
        .await
        .unwrap();
    harness.transport.clear().await;

    let category = svc
        .remove_channel("animeworld", UserId(OPERATOR_ID))
        .await
        .unwrap();
    assert_eq!(category, Category::Anime);

    let edits = harness.transport.edited_messages().await;
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].text, "Anime\n\n");

    let mine = svc.requester_channels(REQUESTER).await.unwrap();
    assert!(mine.is_empty());
}
