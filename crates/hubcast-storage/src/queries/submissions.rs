// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending submission persistence.
//!
//! Submission ids are derived from requester + source message, so re-storing
//! the same inbound message is an idempotent upsert rather than an error.

use hubcast_core::types::{ChatId, MessageRef, Submission, SubmissionId, SubmissionStatus, UserId};
use hubcast_core::HubcastResult;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{parse_enum, parse_ts};

fn row_to_submission(row: &rusqlite::Row<'_>) -> Result<Submission, rusqlite::Error> {
    Ok(Submission {
        id: SubmissionId(row.get(0)?),
        requester: UserId(row.get(1)?),
        requester_name: row.get(2)?,
        category: parse_enum(3, row.get::<_, String>(3)?)?,
        channel_name: row.get(4)?,
        handle: row.get(5)?,
        channel_id: row.get(6)?,
        link: row.get(7)?,
        origin_chat: ChatId(row.get(8)?),
        origin_message: MessageRef(row.get(9)?),
        status: SubmissionStatus::Pending,
        created_at: parse_ts(10, row.get::<_, String>(10)?)?,
    })
}

pub async fn insert_submission(db: &Database, submission: &Submission) -> HubcastResult<()> {
    let s = submission.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO submissions (id, requester, requester_name, category, \
                 channel_name, handle, channel_id, link, origin_chat, origin_message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    s.id.0,
                    s.requester.0,
                    s.requester_name,
                    s.category.to_string(),
                    s.channel_name,
                    s.handle,
                    s.channel_id,
                    s.link,
                    s.origin_chat.0,
                    s.origin_message.0,
                    s.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_submission(db: &Database, id: &SubmissionId) -> HubcastResult<bool> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM submissions WHERE id = ?1", params![id])
        })
        .await
        .map(|n| n > 0)
        .map_err(map_tr_err)
}

/// All pending submissions, for startup reconciliation of the in-memory index.
pub async fn pending_submissions(db: &Database) -> HubcastResult<Vec<Submission>> {
    db.connection()
        .call(move |conn| -> Result<Vec<Submission>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, requester, requester_name, category, channel_name, handle, \
                 channel_id, link, origin_chat, origin_message, created_at
                 FROM submissions ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map([], row_to_submission)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
