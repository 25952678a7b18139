// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping between Hubcast keyboards and Telegram inline markup.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

use hubcast_core::types::{Button, ButtonAction, Keyboard};

/// Converts a [`Keyboard`] to Telegram inline markup. URL buttons whose URL
/// fails to parse are dropped with a warning rather than failing the send.
pub fn to_inline_keyboard(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .0
        .iter()
        .map(|row| row.iter().filter_map(to_button).collect())
        .filter(|row: &Vec<InlineKeyboardButton>| !row.is_empty())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn to_button(button: &Button) -> Option<InlineKeyboardButton> {
    match &button.action {
        ButtonAction::Url(url) => match reqwest::Url::parse(url) {
            Ok(parsed) => Some(InlineKeyboardButton::url(button.text.clone(), parsed)),
            Err(e) => {
                warn!(url, error = %e, "dropping button with unparseable url");
                None
            }
        },
        ButtonAction::Callback(data) => Some(InlineKeyboardButton::callback(
            button.text.clone(),
            data.clone(),
        )),
    }
}
