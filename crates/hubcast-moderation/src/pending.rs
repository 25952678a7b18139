// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory index of pending submissions.
//!
//! Mirrors the durable submission store for fast lookups on callback
//! handling. The index and the store are always written together; on startup
//! the index is rebuilt from the store so a crash between the two can never
//! leave a divergence visible.

use std::collections::HashMap;
use std::sync::Mutex;

use hubcast_core::types::{Submission, SubmissionId};

#[derive(Default)]
pub struct PendingIndex {
    entries: Mutex<HashMap<SubmissionId, Submission>>,
}

impl PendingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from durable records, discarding current contents.
    pub fn reload(&self, submissions: Vec<Submission>) {
        let mut entries = self.entries.lock().expect("pending lock poisoned");
        entries.clear();
        for submission in submissions {
            entries.insert(submission.id.clone(), submission);
        }
    }

    pub fn insert(&self, submission: Submission) {
        self.entries
            .lock()
            .expect("pending lock poisoned")
            .insert(submission.id.clone(), submission);
    }

    pub fn get(&self, id: &SubmissionId) -> Option<Submission> {
        self.entries
            .lock()
            .expect("pending lock poisoned")
            .get(id)
            .cloned()
    }

    /// Removes and returns the submission, if present.
    pub fn remove(&self, id: &SubmissionId) -> Option<Submission> {
        self.entries
            .lock()
            .expect("pending lock poisoned")
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("pending lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hubcast_core::types::{Category, ChatId, MessageRef, SubmissionStatus, UserId};

    fn submission(user: i64, message: i64) -> Submission {
        Submission {
            id: SubmissionId::derive(UserId(user), MessageRef(message)),
            requester: UserId(user),
            requester_name: "Tester".into(),
            category: Category::Other,
            channel_name: "Chan".into(),
            handle: format!("chan{user}"),
            channel_id: -100,
            link: "https://t.me/chan".into(),
            origin_chat: ChatId(-1),
            origin_message: MessageRef(message),
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_get_remove_round_trip() {
        let index = PendingIndex::new();
        let s = submission(1, 10);
        index.insert(s.clone());

        assert_eq!(index.get(&s.id), Some(s.clone()));
        assert_eq!(index.remove(&s.id), Some(s.clone()));
        assert_eq!(index.get(&s.id), None);
        assert_eq!(index.remove(&s.id), None);
    }

    #[test]
    fn reload_replaces_contents() {
        let index = PendingIndex::new();
        index.insert(submission(1, 10));

        let fresh = vec![submission(2, 20), submission(3, 30)];
        index.reload(fresh);

        assert_eq!(index.len(), 2);
        assert!(index
            .get(&SubmissionId::derive(UserId(1), MessageRef(10)))
            .is_none());
    }
}
