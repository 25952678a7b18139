// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel registry CRUD operations.

use chrono::Utc;
use hubcast_core::types::{Category, ChannelEntry, UserId};
use hubcast_core::{HubcastError, HubcastResult};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{parse_enum, parse_ts};

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<ChannelEntry, rusqlite::Error> {
    Ok(ChannelEntry {
        channel_id: row.get(0)?,
        name: row.get(1)?,
        handle: row.get(2)?,
        category: parse_enum(3, row.get::<_, String>(3)?)?,
        added_by: UserId(row.get(4)?),
        link: row.get(5)?,
        subscribers: row.get(6)?,
        created_at: parse_ts(7, row.get::<_, String>(7)?)?,
        updated_at: parse_ts(8, row.get::<_, String>(8)?)?,
    })
}

const ENTRY_COLUMNS: &str = "channel_id, name, handle, category, added_by, link, subscribers, \
                             created_at, updated_at";

/// Insert a new registry entry. Returns the category of an existing entry
/// with the same handle instead of inserting, so the caller can surface a
/// typed duplicate error.
pub async fn insert_entry(db: &Database, entry: &ChannelEntry) -> HubcastResult<()> {
    let entry = entry.clone();
    let handle = entry.handle.clone();
    let existing = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            let found: Option<String> = conn
                .query_row(
                    "SELECT category FROM registry WHERE handle = ?1",
                    params![entry.handle],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            if found.is_some() {
                return Ok(found);
            }
            conn.execute(
                "INSERT INTO registry (channel_id, name, handle, category, added_by, link, \
                 subscribers, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    entry.channel_id,
                    entry.name,
                    entry.handle,
                    entry.category.to_string(),
                    entry.added_by.0,
                    entry.link,
                    entry.subscribers,
                    entry.created_at.to_rfc3339(),
                    entry.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(None)
        })
        .await
        .map_err(map_tr_err)?;

    match existing {
        Some(category) => Err(HubcastError::Duplicate { handle, category }),
        None => Ok(()),
    }
}

pub async fn entry_by_handle(db: &Database, handle: &str) -> HubcastResult<Option<ChannelEntry>> {
    let handle = handle.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ChannelEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM registry WHERE handle = ?1"
            ))?;
            let result = stmt.query_row(params![handle], row_to_entry);
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Entries in one category, oldest first (the feed rendering order).
pub async fn entries_in_category(
    db: &Database,
    category: Category,
) -> HubcastResult<Vec<ChannelEntry>> {
    let category = category.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<ChannelEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM registry WHERE category = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![category], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn entries_by_requester(db: &Database, user: UserId) -> HubcastResult<Vec<ChannelEntry>> {
    db.connection()
        .call(move |conn| -> Result<Vec<ChannelEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM registry WHERE added_by = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![user.0], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_entry(db: &Database, handle: &str) -> HubcastResult<bool> {
    let handle = handle.to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM registry WHERE handle = ?1", params![handle])
        })
        .await
        .map(|n| n > 0)
        .map_err(map_tr_err)
}

pub async fn count_in_category(db: &Database, category: Category) -> HubcastResult<i64> {
    let category = category.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM registry WHERE category = ?1",
                params![category],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_subscribers(db: &Database, handle: &str, subscribers: i64) -> HubcastResult<()> {
    let handle = handle.to_string();
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE registry SET subscribers = ?2, updated_at = ?3 WHERE handle = ?1",
                params![handle, subscribers, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
