// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure free-text submission parser.
//!
//! Turns a raw registration message into validated fields without touching
//! any store or transport, so it can be unit tested in isolation. The
//! expected shape is line-oriented:
//!
//! ```text
//! #Category
//! Channel Name
//! @channel_handle
//! ID -100xxxxxxxxxx
//! @admin bot added
//! ```

use std::sync::LazyLock;

use regex::Regex;

use hubcast_core::types::Category;
use hubcast_core::{HubcastError, HubcastResult};

static CATEGORY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([^\n]+)").unwrap());
static HANDLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)").unwrap());
static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+").unwrap());
static INVITE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://t\.me/\+[A-Za-z0-9_-]+").unwrap());

/// Usage hint returned whenever a required field cannot be extracted.
pub const USAGE_HINT: &str = "malformed submission, expected format:\n\n\
    #Category\n\
    Channel Name\n\
    @channel_handle\n\
    ID -100xxxxxxxxxx\n\
    @admin bot added";

/// Fields extracted from a raw submission message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubmission {
    pub category: Category,
    pub name: String,
    pub handle: String,
    pub channel_id: i64,
    /// Private-channel invite link, if one was supplied.
    pub link: Option<String>,
}

impl ParsedSubmission {
    /// The canonical link for the channel: the supplied invite link, or the
    /// public handle link otherwise.
    pub fn canonical_link(&self) -> String {
        self.link
            .clone()
            .unwrap_or_else(|| format!("https://t.me/{}", self.handle))
    }
}

/// Parses a raw registration message into its validated fields.
///
/// The category tag is matched case-insensitively as a substring against the
/// fixed category set, in declaration order, first match wins. The display
/// name is the line following the tag line. The handle is taken from the
/// first `@mention` on a line that does not mention an admin. The numeric id
/// comes from a line containing "id" in any case.
pub fn parse_submission(text: &str) -> HubcastResult<ParsedSubmission> {
    let tag = CATEGORY_TAG
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .ok_or_else(|| HubcastError::Validation(USAGE_HINT.to_string()))?;

    let category = Category::match_tag(&tag).ok_or_else(|| {
        HubcastError::Validation(format!(
            "unrecognized category \"{tag}\", use one of the listed categories"
        ))
    })?;

    let lines: Vec<&str> = text.lines().collect();
    let mut name = None;
    let mut handle = None;
    let mut channel_id = None;
    let mut link = None;

    for (i, line) in lines.iter().enumerate() {
        if line.contains('#') && i + 1 < lines.len() {
            let candidate = lines[i + 1].trim();
            if !candidate.is_empty() {
                name = Some(candidate.to_string());
            }
        }
        if line.contains('@') && !line.to_lowercase().contains("admin") {
            if let Some(m) = HANDLE.captures(line) {
                handle = Some(m[1].to_string());
            }
        }
        if line.to_lowercase().contains("id") {
            if let Some(m) = NUMERIC_ID.find(line) {
                channel_id = m.as_str().parse::<i64>().ok();
            }
        }
        if line.contains("https://t.me/") && line.contains('+') {
            if let Some(m) = INVITE_LINK.find(line) {
                link = Some(m.as_str().to_string());
            }
        }
    }

    match (name, handle, channel_id) {
        (Some(name), Some(handle), Some(channel_id)) => Ok(ParsedSubmission {
            category,
            name,
            handle,
            channel_id,
            link,
        }),
        _ => Err(HubcastError::Validation(USAGE_HINT.to_string())),
    }
}
