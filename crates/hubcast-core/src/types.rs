// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Hubcast workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Platform-assigned numeric user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Platform-assigned numeric chat id (group, channel, or private chat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Reference to a delivered message on its chat, as returned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef(pub i64);

/// An outbound destination: either a public handle or a raw chat id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatRef {
    /// Public handle, addressed as `@handle`.
    Handle(String),
    /// Raw numeric chat id.
    Id(i64),
}

impl std::fmt::Display for ChatRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRef::Handle(h) => write!(f, "@{h}"),
            ChatRef::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<ChatId> for ChatRef {
    fn from(id: ChatId) -> Self {
        ChatRef::Id(id.0)
    }
}

impl From<UserId> for ChatRef {
    fn from(id: UserId) -> Self {
        ChatRef::Id(id.0)
    }
}

/// A chat member's role as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum MemberRole {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberRole {
    /// Owners and administrators are exempt from the abuse throttle.
    pub fn is_privileged(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }
}

/// The fixed directory category set.
///
/// Declaration order is load-bearing: submission parsing matches the first
/// category whose label contains the submitted tag, iterating in this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[strum(serialize = "Movies & Series")]
    MoviesAndSeries,
    #[strum(serialize = "Anime")]
    Anime,
    #[strum(serialize = "Music")]
    Music,
    #[strum(serialize = "Gaming")]
    Gaming,
    #[strum(serialize = "Memes & Humor")]
    MemesAndHumor,
    #[strum(serialize = "Quotes")]
    Quotes,
    #[strum(serialize = "Books")]
    Books,
    #[strum(serialize = "Wallpapers")]
    Wallpapers,
    #[strum(serialize = "Photography")]
    Photography,
    #[strum(serialize = "Lifestyle")]
    Lifestyle,
    #[strum(serialize = "Apps")]
    Apps,
    #[strum(serialize = "Social Media")]
    SocialMedia,
    #[strum(serialize = "News")]
    News,
    #[strum(serialize = "Sports")]
    Sports,
    #[strum(serialize = "Groups")]
    Groups,
    #[strum(serialize = "Other")]
    Other,
}

impl Category {
    /// Match a free-text tag against the category set, case-insensitively,
    /// as a substring of the label. The first match in declaration order wins.
    pub fn match_tag(tag: &str) -> Option<Category> {
        let needle = tag.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Category::iter().find(|c| c.to_string().to_lowercase().contains(&needle))
    }
}

/// An inline action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Url(String),
    Callback(String),
}

/// A button layout: rows of buttons, rendered top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard(pub Vec<Vec<Button>>);

impl Keyboard {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.0.push(row);
        }
    }
}

/// An approved channel in the public directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    /// Platform-assigned numeric channel id, unique across the registry.
    pub channel_id: i64,
    pub name: String,
    /// Public handle, unique across the registry.
    pub handle: String,
    pub category: Category,
    /// The requester whose submission created this entry.
    pub added_by: UserId,
    /// Canonical join link shown in the category feed.
    pub link: String,
    /// Best-effort subscriber count, refreshed externally.
    pub subscribers: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fan-out destination for scheduled broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPostTarget {
    pub handle: String,
    pub active: bool,
    pub added_at: DateTime<Utc>,
    pub last_post_at: Option<DateTime<Utc>>,
    pub success_count: i64,
    pub error_count: i64,
}

/// Unique identifier for a scheduled post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a scheduled post. Posts are never physically deleted;
/// they transition to `Deleted` after their messages are removed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum PostStatus {
    Scheduled,
    Sent,
    Deleted,
}

/// The payload of a scheduled post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub text: String,
    /// Optional image reference (platform file id or local path).
    pub image: Option<String>,
    /// Custom button rows appended below the fixed category-link rows.
    pub custom_buttons: Vec<Vec<Button>>,
}

/// One successful delivery within a distribution run. Append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub target: String,
    pub message: MessageRef,
    pub at: DateTime<Utc>,
}

/// One failed delivery or deletion within a run. Append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFailure {
    pub target: String,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// A broadcast post with its full persisted lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: PostId,
    pub content: PostContent,
    pub publish_at: DateTime<Utc>,
    /// Seconds after a successful send at which the post is deleted again.
    pub delete_after_secs: Option<i64>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub sent: Vec<SendOutcome>,
    pub failed: Vec<SendFailure>,
    pub total_sent: i64,
    pub total_failed: i64,
    pub deleted_count: i64,
    pub failed_deletions: Vec<SendFailure>,
}

impl ScheduledPost {
    /// A freshly created post, not yet distributed.
    pub fn new(
        id: PostId,
        content: PostContent,
        publish_at: DateTime<Utc>,
        delete_after_secs: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content,
            publish_at,
            delete_after_secs,
            status: PostStatus::Scheduled,
            created_at: now,
            sent_at: None,
            deleted_at: None,
            sent: Vec::new(),
            failed: Vec::new(),
            total_sent: 0,
            total_failed: 0,
            deleted_count: 0,
            failed_deletions: Vec::new(),
        }
    }
}

/// Persisted aggregates and lifecycle timestamps for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatistics {
    pub id: PostId,
    pub status: PostStatus,
    pub total_sent: i64,
    pub total_failed: i64,
    pub sent_targets: usize,
    pub failed_targets: usize,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Unique identifier for a submission, derived from requester id and source
/// message id so that re-processing a duplicate inbound message is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn derive(requester: UserId, source_message: MessageRef) -> Self {
        Self(format!("{}_{}", requester.0, source_message.0))
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a submission. Only `Pending` submissions are stored;
/// terminal transitions remove the record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// An unreviewed request to add a channel to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub requester: UserId,
    pub requester_name: String,
    pub category: Category,
    pub channel_name: String,
    pub handle: String,
    pub channel_id: i64,
    pub link: String,
    /// Chat the submission message arrived in; replies go back here.
    pub origin_chat: ChatId,
    pub origin_message: MessageRef,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    Duplicate,
    InappropriateContent,
    IncorrectInformation,
    WrongCategory,
    Other(String),
}

impl RejectReason {
    /// The human-readable explanation sent back to the requester.
    pub fn message(&self) -> &str {
        match self {
            RejectReason::Duplicate => "The channel already exists in our categories.",
            RejectReason::InappropriateContent => {
                "The channel's content does not comply with our rules."
            }
            RejectReason::IncorrectInformation => {
                "The information provided is incorrect or incomplete."
            }
            RejectReason::WrongCategory => {
                "The selected category is not suitable for this channel."
            }
            RejectReason::Other(text) => text,
        }
    }
}
