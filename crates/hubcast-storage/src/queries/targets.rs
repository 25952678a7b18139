// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out target operations: add/remove/deactivate plus the per-attempt
//! counter updates performed by the distribution engine.

use chrono::{DateTime, Utc};
use hubcast_core::types::AutoPostTarget;
use hubcast_core::{HubcastError, HubcastResult};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::parse_opt_ts;
use crate::queries::parse_ts;

fn row_to_target(row: &rusqlite::Row<'_>) -> Result<AutoPostTarget, rusqlite::Error> {
    Ok(AutoPostTarget {
        handle: row.get(0)?,
        active: row.get::<_, i64>(1)? != 0,
        added_at: parse_ts(2, row.get::<_, String>(2)?)?,
        last_post_at: parse_opt_ts(3, row.get::<_, Option<String>>(3)?)?,
        success_count: row.get(4)?,
        error_count: row.get(5)?,
    })
}

const TARGET_COLUMNS: &str =
    "handle, active, added_at, last_post_at, success_count, error_count";

/// Add a target, initially active. Surfaces a duplicate as a typed error.
pub async fn add_target(db: &Database, handle: &str, now: DateTime<Utc>) -> HubcastResult<()> {
    let handle = handle.to_string();
    let handle_for_error = handle.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM targets WHERE handle = ?1)",
                params![handle],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO targets (handle, active, added_at) VALUES (?1, 1, ?2)",
                params![handle, now.to_rfc3339()],
            )?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(HubcastError::Duplicate {
            handle: handle_for_error,
            category: "the auto-post target list".to_string(),
        })
    }
}

pub async fn remove_target(db: &Database, handle: &str) -> HubcastResult<bool> {
    let handle = handle.to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM targets WHERE handle = ?1", params![handle])
        })
        .await
        .map(|n| n > 0)
        .map_err(map_tr_err)
}

pub async fn set_target_active(db: &Database, handle: &str, active: bool) -> HubcastResult<bool> {
    let handle = handle.to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE targets SET active = ?2 WHERE handle = ?1",
                params![handle, active as i64],
            )
        })
        .await
        .map(|n| n > 0)
        .map_err(map_tr_err)
}

pub async fn list_targets(db: &Database, active_only: bool) -> HubcastResult<Vec<AutoPostTarget>> {
    db.connection()
        .call(move |conn| -> Result<Vec<AutoPostTarget>, rusqlite::Error> {
            let sql = if active_only {
                format!("SELECT {TARGET_COLUMNS} FROM targets WHERE active = 1 ORDER BY added_at ASC")
            } else {
                format!("SELECT {TARGET_COLUMNS} FROM targets ORDER BY added_at ASC")
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_target)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Bump the success counter and last-post timestamp after a delivery.
pub async fn record_success(db: &Database, handle: &str, at: DateTime<Utc>) -> HubcastResult<()> {
    let handle = handle.to_string();
    let at = at.to_rfc3339();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE targets SET success_count = success_count + 1, last_post_at = ?2
                 WHERE handle = ?1",
                params![handle, at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Bump the error counter after a failed delivery.
pub async fn record_failure(db: &Database, handle: &str) -> HubcastResult<()> {
    let handle = handle.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE targets SET error_count = error_count + 1 WHERE handle = ?1",
                params![handle],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
