// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled post persistence: creation, lookup, and the two lifecycle
//! transitions written by the distribution and deletion runs.

use chrono::{DateTime, Utc};
use hubcast_core::types::{PostId, PostStatus, ScheduledPost, SendFailure, SendOutcome};
use hubcast_core::HubcastResult;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{parse_enum, parse_json, parse_opt_ts, parse_ts, to_json};

fn row_to_post(row: &rusqlite::Row<'_>) -> Result<ScheduledPost, rusqlite::Error> {
    Ok(ScheduledPost {
        id: PostId(row.get(0)?),
        content: parse_json(1, row.get::<_, String>(1)?)?,
        publish_at: parse_ts(2, row.get::<_, String>(2)?)?,
        delete_after_secs: row.get(3)?,
        status: parse_enum(4, row.get::<_, String>(4)?)?,
        created_at: parse_ts(5, row.get::<_, String>(5)?)?,
        sent_at: parse_opt_ts(6, row.get::<_, Option<String>>(6)?)?,
        deleted_at: parse_opt_ts(7, row.get::<_, Option<String>>(7)?)?,
        sent: parse_json(8, row.get::<_, String>(8)?)?,
        failed: parse_json(9, row.get::<_, String>(9)?)?,
        total_sent: row.get(10)?,
        total_failed: row.get(11)?,
        deleted_count: row.get(12)?,
        failed_deletions: parse_json(13, row.get::<_, String>(13)?)?,
    })
}

const POST_COLUMNS: &str = "id, content, publish_at, delete_after_secs, status, created_at, \
                            sent_at, deleted_at, sent_outcomes, failed_outcomes, total_sent, \
                            total_failed, deleted_count, failed_deletions";

pub async fn insert_post(db: &Database, post: &ScheduledPost) -> HubcastResult<()> {
    let post = post.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO posts (id, content, publish_at, delete_after_secs, status, \
                 created_at, sent_at, deleted_at, sent_outcomes, failed_outcomes, total_sent, \
                 total_failed, deleted_count, failed_deletions)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    post.id.0,
                    to_json(&post.content)?,
                    post.publish_at.to_rfc3339(),
                    post.delete_after_secs,
                    post.status.to_string(),
                    post.created_at.to_rfc3339(),
                    post.sent_at.map(|t| t.to_rfc3339()),
                    post.deleted_at.map(|t| t.to_rfc3339()),
                    to_json(&post.sent)?,
                    to_json(&post.failed)?,
                    post.total_sent,
                    post.total_failed,
                    post.deleted_count,
                    to_json(&post.failed_deletions)?,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_post(db: &Database, id: &PostId) -> HubcastResult<Option<ScheduledPost>> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<ScheduledPost>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_post);
            match result {
                Ok(post) => Ok(Some(post)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Posts still awaiting distribution, oldest publish time first.
pub async fn scheduled_posts(db: &Database) -> HubcastResult<Vec<ScheduledPost>> {
    let status = PostStatus::Scheduled.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<ScheduledPost>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE status = ?1 ORDER BY publish_at ASC"
            ))?;
            let rows = stmt.query_map(params![status], row_to_post)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Persist the outcome of a distribution run. The outcome lists become
/// append-only historical facts; they are written once and never recomputed.
pub async fn mark_sent(
    db: &Database,
    id: &PostId,
    sent_at: DateTime<Utc>,
    sent: &[SendOutcome],
    failed: &[SendFailure],
) -> HubcastResult<()> {
    let id = id.0.clone();
    let sent = sent.to_vec();
    let failed = failed.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE posts SET status = ?2, sent_at = ?3, sent_outcomes = ?4, \
                 failed_outcomes = ?5, total_sent = ?6, total_failed = ?7 WHERE id = ?1",
                params![
                    id,
                    PostStatus::Sent.to_string(),
                    sent_at.to_rfc3339(),
                    to_json(&sent)?,
                    to_json(&failed)?,
                    sent.len() as i64,
                    failed.len() as i64,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Persist the outcome of a deletion run.
pub async fn mark_deleted(
    db: &Database,
    id: &PostId,
    deleted_at: DateTime<Utc>,
    deleted_count: i64,
    failed_deletions: &[SendFailure],
) -> HubcastResult<()> {
    let id = id.0.clone();
    let failed_deletions = failed_deletions.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE posts SET status = ?2, deleted_at = ?3, deleted_count = ?4, \
                 failed_deletions = ?5 WHERE id = ?1",
                params![
                    id,
                    PostStatus::Deleted.to_string(),
                    deleted_at.to_rfc3339(),
                    deleted_count,
                    to_json(&failed_deletions)?,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
