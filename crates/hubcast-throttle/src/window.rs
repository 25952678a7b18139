// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user sliding window over activity timestamps.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use hubcast_core::UserId;

/// In-memory sliding-window counter, one timestamp queue per user.
///
/// State is process-local and resets on restart. All access goes through a
/// single mutex; the critical section is a queue prune plus a push, so
/// contention is negligible at chat-message rates.
pub struct SlidingWindow {
    window: Duration,
    limit: usize,
    activity: Mutex<HashMap<UserId, VecDeque<DateTime<Utc>>>>,
}

impl SlidingWindow {
    pub fn new(window: Duration, limit: usize) -> Self {
        Self {
            window,
            limit,
            activity: Mutex::new(HashMap::new()),
        }
    }

    /// Records one activity event at `now` and reports whether the user has
    /// exceeded the limit within the window.
    ///
    /// Entries older than the window are pruned before counting, so the
    /// decision only ever considers the last `window` of activity. Returns
    /// `true` strictly when the retained count exceeds the limit, never at
    /// exactly the limit.
    pub fn record(&self, user: UserId, now: DateTime<Utc>) -> bool {
        let mut activity = self.activity.lock().expect("throttle lock poisoned");
        let queue = activity.entry(user).or_default();
        let cutoff = now - self.window;
        while let Some(front) = queue.front() {
            if *front <= cutoff {
                queue.pop_front();
            } else {
                break;
            }
        }
        queue.push_back(now);
        queue.len() > self.limit
    }

    /// Drops a user's recorded activity, e.g. after a mute has been applied.
    pub fn reset(&self, user: UserId) {
        self.activity
            .lock()
            .expect("throttle lock poisoned")
            .remove(&user);
    }
}
