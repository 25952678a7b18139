// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sliding-window abuse throttle.
//!
//! Counts per-user activity inside a rolling time window and reports when a
//! user exceeds the configured message limit. Pairs with an advisory
//! [`MuteLedger`] so handlers can skip work for users the bot has already
//! restricted. All state is in-memory and process-local; a restart forgets
//! both activity counts and mute records, which is acceptable because the
//! platform-side restriction outlives the process.

pub mod mute;
pub mod window;

pub use mute::{MuteEntry, MuteLedger};
pub use window::SlidingWindow;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::warn;

use hubcast_config::ThrottleConfig;
use hubcast_core::UserId;

pub const MUTE_REASON: &str = "abuse detected";

/// Combined throttle facade: sliding window plus mute ledger.
pub struct Throttle {
    window: SlidingWindow,
    ledger: MuteLedger,
    mute_secs: u64,
}

impl Throttle {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            window: SlidingWindow::new(
                chrono::Duration::seconds(config.window_secs as i64),
                config.message_limit,
            ),
            ledger: MuteLedger::new(),
            mute_secs: config.mute_secs,
        }
    }

    /// Records one inbound message from `user` and reports whether the user
    /// has tripped the limit. Callers exempt privileged users before calling.
    pub fn record_activity(&self, user: UserId, now: DateTime<Utc>) -> bool {
        let tripped = self.window.record(user, now);
        if tripped {
            counter!("hubcast_throttle_trips_total").increment(1);
            warn!(user = user.0, "user exceeded message limit");
        }
        tripped
    }

    /// True iff the user is currently muted. Expired records are cleared.
    pub fn is_muted(&self, user: UserId, now: DateTime<Utc>) -> bool {
        self.ledger.is_muted(user, now)
    }

    /// Records a local mute starting at `now`, clearing the user's activity
    /// window, and returns the expiry. The caller applies the matching
    /// platform-level restriction.
    pub fn mute(&self, user: UserId, now: DateTime<Utc>) -> DateTime<Utc> {
        let until = now + chrono::Duration::seconds(self.mute_secs as i64);
        self.ledger.mute(user, until, MUTE_REASON);
        self.window.reset(user);
        until
    }

    /// The configured restriction length, for the platform call.
    pub fn mute_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.mute_secs)
    }
}
