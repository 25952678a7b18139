// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category feed rendering.
//!
//! Each category has one public feed message listing every approved channel.
//! The feed is always rebuilt in full from registry state rather than patched
//! incrementally, so registry and feed cannot drift apart. Rendering is a
//! pure function of the entry list.

use hubcast_core::types::{Category, ChannelEntry};

/// Renders a category's feed message from its registry entries.
///
/// Output is the category header followed by one markdown link per entry in
/// add order, blank-line separated. An empty category renders as the bare
/// header.
pub fn render_feed(category: Category, entries: &[ChannelEntry]) -> String {
    let mut text = format!("{category}\n\n");
    for entry in entries {
        text.push_str(&format!("[{}]({})\n\n", entry.name, entry.link));
    }
    if !entries.is_empty() {
        text.truncate(text.trim_end_matches('\n').len());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hubcast_core::types::UserId;

    fn entry(name: &str, link: &str) -> ChannelEntry {
        let now = Utc::now();
        ChannelEntry {
            channel_id: 1,
            name: name.into(),
            handle: name.to_lowercase(),
            category: Category::Music,
            added_by: UserId(1),
            link: link.into(),
            subscribers: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_category_renders_the_bare_header() {
        assert_eq!(render_feed(Category::Music, &[]), "Music\n\n");
    }

    #[test]
    fn entries_render_as_linked_lines_in_order() {
        let entries = vec![
            entry("Loud Tunes", "https://t.me/loudtunes"),
            entry("Quiet Corner", "https://t.me/quietcorner"),
        ];
        assert_eq!(
            render_feed(Category::Music, &entries),
            "Music\n\n[Loud Tunes](https://t.me/loudtunes)\n\n[Quiet Corner](https://t.me/quietcorner)"
        );
    }

    #[test]
    fn rendering_is_idempotent_for_the_same_registry_state() {
        let entries = vec![entry("Loud Tunes", "https://t.me/loudtunes")];
        assert_eq!(
            render_feed(Category::Music, &entries),
            render_feed(Category::Music, &entries)
        );
    }
}
