// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end distribution tests against a temp SQLite store and a mock
//! transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hubcast_broadcast::{new_post_id, BroadcastEngine};
use hubcast_core::traits::{PostStore, TargetStore};
use hubcast_core::types::{
    Button, ChatRef, PostContent, PostId, PostStatus, ScheduledPost, SendFailure, SendOutcome,
};
use hubcast_core::{HubcastError, HubcastResult};
use hubcast_test_utils::{TestHarness, OPERATOR_ID};

fn engine(harness: &TestHarness) -> Arc<BroadcastEngine> {
    Arc::new(BroadcastEngine::new(
        harness.store.clone(),
        harness.store.clone(),
        harness.transport.clone(),
        harness.hub.clone(),
    ))
}

fn post(id: &str, text: &str, publish_in_secs: i64, delete_after_secs: Option<i64>) -> ScheduledPost {
    let now = Utc::now();
    ScheduledPost::new(
        PostId(id.into()),
        PostContent {
            text: text.into(),
            image: None,
            custom_buttons: vec![],
        },
        now + chrono::Duration::seconds(publish_in_secs),
        delete_after_secs,
        now,
    )
}

async fn add_targets(harness: &TestHarness, handles: &[&str]) {
    let now = Utc::now();
    for handle in handles {
        harness.store.add_target(handle, now).await.unwrap();
    }
}

/// Post store whose distribution write always fails, for exercising the
/// delivered-but-unpersisted degradation path.
struct UnwritablePosts {
    inner: Arc<dyn PostStore>,
}

#[async_trait]
impl PostStore for UnwritablePosts {
    async fn insert_post(&self, post: &ScheduledPost) -> HubcastResult<()> {
        self.inner.insert_post(post).await
    }

    async fn get_post(&self, id: &PostId) -> HubcastResult<Option<ScheduledPost>> {
        self.inner.get_post(id).await
    }

    async fn scheduled_posts(&self) -> HubcastResult<Vec<ScheduledPost>> {
        self.inner.scheduled_posts().await
    }

    async fn mark_sent(
        &self,
        _id: &PostId,
        _sent_at: DateTime<Utc>,
        _sent: &[SendOutcome],
        _failed: &[SendFailure],
    ) -> HubcastResult<()> {
        Err(HubcastError::storage(std::io::Error::other("disk full")))
    }

    async fn mark_deleted(
        &self,
        id: &PostId,
        deleted_at: DateTime<Utc>,
        deleted_count: i64,
        failed_deletions: &[SendFailure],
    ) -> HubcastResult<()> {
        self.inner
            .mark_deleted(id, deleted_at, deleted_count, failed_deletions)
            .await
    }
}

#[tokio::test]
async fn past_due_posts_distribute_immediately() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one", "promo_two"]).await;
    let engine = engine(&harness);

    let id = engine
        .schedule_broadcast(post("p1", "hello", -5, None))
        .await
        .unwrap();

    // Distribution already ran inside the schedule call, no task pending.
    let stats = engine.statistics(&id).await.unwrap();
    assert_eq!(stats.status, PostStatus::Sent);
    assert_eq!(stats.total_sent, 2);
    assert_eq!(stats.total_failed, 0);
    assert_eq!(
        harness
            .transport
            .sent_to(&ChatRef::Handle("promo_one".into()))
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn partial_failure_is_accounted_per_target() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["accepts", "rejects"]).await;
    harness
        .transport
        .fail_target(&ChatRef::Handle("rejects".into()))
        .await;
    let engine = engine(&harness);

    let id = engine
        .schedule_broadcast(post("p2", "promo text", 0, None))
        .await
        .unwrap();

    let stats = engine.statistics(&id).await.unwrap();
    assert_eq!(stats.status, PostStatus::Sent);
    assert_eq!(stats.total_sent, 1);
    assert_eq!(stats.total_failed, 1);
    assert_eq!(stats.sent_targets, 1);
    assert_eq!(stats.failed_targets, 1);

    // The operator summary names exactly the one failed target.
    let summaries = harness.transport.sent_to(&ChatRef::Id(OPERATOR_ID)).await;
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].text.contains("Sent: 1 channels"));
    assert!(summaries[0].text.contains("Failed: 1 channels"));
    assert!(summaries[0].text.contains("@rejects"));
    assert!(!summaries[0].text.contains("@accepts"));

    // Target counters reflect the split.
    let targets = harness.store.all_targets().await.unwrap();
    let ok = targets.iter().find(|t| t.handle == "accepts").unwrap();
    assert_eq!((ok.success_count, ok.error_count), (1, 0));
    assert!(ok.last_post_at.is_some());
    let bad = targets.iter().find(|t| t.handle == "rejects").unwrap();
    assert_eq!((bad.success_count, bad.error_count), (0, 1));
}

#[tokio::test]
async fn failure_summary_truncates_after_five_targets() {
    let harness = TestHarness::new().await.unwrap();
    let handles = ["f1", "f2", "f3", "f4", "f5", "f6", "f7"];
    add_targets(&harness, &handles).await;
    for handle in &handles {
        harness
            .transport
            .fail_target(&ChatRef::Handle((*handle).into()))
            .await;
    }
    let engine = engine(&harness);

    engine
        .schedule_broadcast(post("p3", "text", 0, None))
        .await
        .unwrap();

    let summaries = harness.transport.sent_to(&ChatRef::Id(OPERATOR_ID)).await;
    assert_eq!(summaries.len(), 1);
    let text = &summaries[0].text;
    assert!(text.contains("Failed: 7 channels"));
    assert_eq!(text.matches("• @").count(), 5);
    assert!(text.contains("…and 2 more"));
}

#[tokio::test]
async fn deferred_posts_fire_at_publish_time_and_cancel_prevents_send() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one"]).await;
    let engine = engine(&harness);

    let keep = engine
        .schedule_broadcast(post("keep", "kept", 1, None))
        .await
        .unwrap();
    let doomed = engine
        .schedule_broadcast(post("drop", "dropped", 1, None))
        .await
        .unwrap();

    assert!(engine.cancel(&doomed));
    // Cancelling twice is a no-op.
    assert!(!engine.cancel(&doomed));

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let kept = engine.statistics(&keep).await.unwrap();
    assert_eq!(kept.status, PostStatus::Sent);
    let dropped = engine.statistics(&doomed).await.unwrap();
    assert_eq!(dropped.status, PostStatus::Scheduled);

    let delivered = harness
        .transport
        .sent_to(&ChatRef::Handle("promo_one".into()))
        .await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].text, "kept");
}

#[tokio::test]
async fn cancel_after_firing_never_interrupts_the_run() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one", "promo_two"]).await;
    harness
        .transport
        .set_send_delay(Duration::from_millis(200))
        .await;
    let engine = engine(&harness);

    let now = Utc::now();
    let p = ScheduledPost::new(
        PostId("fired".into()),
        PostContent {
            text: "in flight".into(),
            image: None,
            custom_buttons: vec![],
        },
        now + chrono::Duration::milliseconds(50),
        None,
        now,
    );
    let id = engine.schedule_broadcast(p).await.unwrap();

    // The timer has fired and the first slow send is under way; a cancel
    // at this point must not reach the running task.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!engine.cancel(&id));

    tokio::time::sleep(Duration::from_millis(700)).await;
    let stats = engine.statistics(&id).await.unwrap();
    assert_eq!(stats.status, PostStatus::Sent);
    assert_eq!(stats.total_sent, 2);
}

#[tokio::test]
async fn store_write_failure_after_sends_reports_unpersisted() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one", "promo_two"]).await;
    let posts = Arc::new(UnwritablePosts {
        inner: harness.store.clone(),
    });
    let engine = Arc::new(BroadcastEngine::new(
        posts,
        harness.store.clone(),
        harness.transport.clone(),
        harness.hub.clone(),
    ));

    harness
        .store
        .insert_post(&post("p8", "delivered anyway", -1, None))
        .await
        .unwrap();
    let report = engine.distribute(&PostId("p8".into())).await.unwrap();

    // Deliveries happened and are reported; only the aggregate write failed.
    assert_eq!(report.sent.len(), 2);
    assert!(report.failed.is_empty());
    assert!(!report.persisted);
    assert_eq!(
        harness
            .transport
            .sent_to(&ChatRef::Handle("promo_one".into()))
            .await
            .len(),
        1
    );
    let stats = engine.statistics(&PostId("p8".into())).await.unwrap();
    assert_eq!(stats.status, PostStatus::Scheduled);
}

#[tokio::test]
async fn image_posts_deliver_the_image_with_caption() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one"]).await;
    let engine = engine(&harness);

    let mut p = post("p9", "caption text", 0, None);
    p.content.image = Some("https://example.com/banner.png".into());
    engine.schedule_broadcast(p).await.unwrap();

    let delivered = harness
        .transport
        .sent_to(&ChatRef::Handle("promo_one".into()))
        .await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0].image.as_deref(),
        Some("https://example.com/banner.png")
    );
    assert_eq!(delivered[0].text, "caption text");
}

#[tokio::test]
async fn negative_auto_delete_delay_deletes_promptly() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one"]).await;
    let engine = engine(&harness);

    let id = engine
        .schedule_broadcast(post("p10", "gone already", 0, Some(-30)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let stats = engine.statistics(&id).await.unwrap();
    assert_eq!(stats.status, PostStatus::Deleted);
    assert_eq!(harness.transport.deleted_messages().await.len(), 1);
}

#[tokio::test]
async fn auto_delete_removes_delivered_messages() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one", "promo_two"]).await;
    let engine = engine(&harness);

    let id = engine
        .schedule_broadcast(post("p4", "short lived", 0, Some(1)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let stats = engine.statistics(&id).await.unwrap();
    assert_eq!(stats.status, PostStatus::Deleted);
    assert_eq!(harness.transport.deleted_messages().await.len(), 2);
}

#[tokio::test]
async fn distributing_an_unknown_post_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let engine = engine(&harness);

    let missing = PostId("missing".into());
    assert!(matches!(
        engine.distribute(&missing).await,
        Err(HubcastError::NotFound(_))
    ));
    assert!(matches!(
        engine.statistics(&missing).await,
        Err(HubcastError::NotFound(_))
    ));
}

#[tokio::test]
async fn recovery_sweep_reschedules_durable_posts() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one"]).await;

    // First engine persists a deferred post, then is dropped before firing.
    {
        let first = engine(&harness);
        first
            .schedule_broadcast(post("p5", "survives restart", 3600, None))
            .await
            .unwrap();
        first.cancel(&PostId("p5".into()));
    }

    let second = engine(&harness);
    assert_eq!(second.recover().await.unwrap(), 1);
}

#[tokio::test]
async fn custom_buttons_ride_below_the_category_rows() {
    let harness = TestHarness::new().await.unwrap();
    add_targets(&harness, &["promo_one"]).await;
    let engine = engine(&harness);

    let mut p = post("p6", "with buttons", 0, None);
    p.content.custom_buttons = vec![vec![Button::url("Join", "https://t.me/joinme")]];
    engine.schedule_broadcast(p).await.unwrap();

    let delivered = harness
        .transport
        .sent_to(&ChatRef::Handle("promo_one".into()))
        .await;
    assert_eq!(delivered.len(), 1);
    let keyboard = delivered[0].keyboard.as_ref().unwrap();

    // 16 categories pack into 8 rows of two, custom row last.
    assert_eq!(keyboard.0.len(), 9);
    assert!(keyboard.0[..8].iter().all(|row| row.len() == 2));
    assert_eq!(keyboard.0[8][0].text, "Join");
}

#[tokio::test]
async fn target_lifecycle_through_the_engine() {
    let harness = TestHarness::new().await.unwrap();
    let engine = engine(&harness);

    engine.add_target("@promo_one", Utc::now()).await.unwrap();
    assert!(matches!(
        engine.add_target("promo_one", Utc::now()).await,
        Err(HubcastError::Duplicate { .. })
    ));

    engine.add_target("promo_two", Utc::now()).await.unwrap();
    assert!(engine.deactivate_target("promo_two").await.unwrap());

    let listed = engine.list_targets().await.unwrap();
    assert_eq!(listed.len(), 2);

    let p = post("p7", "targets", 0, None);
    engine.schedule_broadcast(p).await.unwrap();
    // Only the active target received the post.
    assert_eq!(
        harness
            .transport
            .sent_to(&ChatRef::Handle("promo_one".into()))
            .await
            .len(),
        1
    );
    assert!(harness
        .transport
        .sent_to(&ChatRef::Handle("promo_two".into()))
        .await
        .is_empty());

    assert!(engine.remove_target("@promo_two").await.unwrap());
    assert_eq!(engine.list_targets().await.unwrap().len(), 1);
}

#[test]
fn generated_post_ids_are_unique() {
    assert_ne!(new_post_id(), new_post_id());
}
