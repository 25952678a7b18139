// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory mute ledger.
//!
//! Records which users are currently muted and why. The authoritative
//! restriction lives on the platform side; this ledger only lets the bot
//! answer "is this user muted right now" without a network call. Expired
//! entries are cleared lazily on lookup, there is no background sweeper.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use hubcast_core::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuteEntry {
    pub until: DateTime<Utc>,
    pub reason: String,
}

#[derive(Default)]
pub struct MuteLedger {
    entries: Mutex<HashMap<UserId, MuteEntry>>,
}

impl MuteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mute for `user` lasting until `until`.
    pub fn mute(&self, user: UserId, until: DateTime<Utc>, reason: impl Into<String>) {
        self.entries
            .lock()
            .expect("mute lock poisoned")
            .insert(user, MuteEntry { until, reason: reason.into() });
    }

    /// True iff the user has an unexpired mute. An entry whose expiry has
    /// passed is removed as a side effect.
    pub fn is_muted(&self, user: UserId, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock().expect("mute lock poisoned");
        match entries.get(&user) {
            Some(entry) if entry.until > now => true,
            Some(_) => {
                entries.remove(&user);
                false
            }
            None => false,
        }
    }

    /// The active mute entry for a user, if any. Does not clear expired
    /// entries.
    pub fn entry(&self, user: UserId) -> Option<MuteEntry> {
        self.entries
            .lock()
            .expect("mute lock poisoned")
            .get(&user)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn active_mute_is_reported() {
        let ledger = MuteLedger::new();
        let now = Utc::now();
        ledger.mute(UserId(7), now + Duration::seconds(300), "abuse detected");

        assert!(ledger.is_muted(UserId(7), now));
        assert!(!ledger.is_muted(UserId(8), now));
        assert_eq!(ledger.entry(UserId(7)).unwrap().reason, "abuse detected");
    }

    #[test]
    fn expired_mute_is_cleared_on_lookup() {
        let ledger = MuteLedger::new();
        let now = Utc::now();
        ledger.mute(UserId(7), now + Duration::seconds(10), "abuse detected");

        assert!(!ledger.is_muted(UserId(7), now + Duration::seconds(11)));
        // Lazy clear removed the entry entirely.
        assert!(ledger.entry(UserId(7)).is_none());
    }
}
