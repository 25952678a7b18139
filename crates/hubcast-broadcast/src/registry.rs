// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of in-flight deferred tasks, keyed by post identity.
//!
//! Timers live only in process memory. A restart loses any not-yet-fired
//! task; the startup recovery sweep re-registers them from durable Scheduled
//! posts. Cancelling a task before it fires prevents the send entirely;
//! cancelling after it fires is a no-op. A deferred task must `claim` its
//! registration when it wakes, before doing any work: once claimed, the
//! registry no longer holds its handle and `cancel` cannot abort it mid-run.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tracing::debug;

use hubcast_core::types::PostId;

#[derive(Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<PostId, JoinHandle<()>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a deferred task for a post. A task already registered under
    /// the same identity is aborted first, keeping at most one live task per
    /// post.
    pub fn register(&self, id: PostId, handle: JoinHandle<()>) {
        self.register_with(id, move || handle);
    }

    /// Spawns and registers in one step, holding the registry lock across
    /// both. A task that wakes instantly blocks in `claim` until its
    /// registration is in place, so even a zero-delay timer finds it.
    pub fn register_with(&self, id: PostId, spawn: impl FnOnce() -> JoinHandle<()>) {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        let handle = spawn();
        if let Some(previous) = tasks.insert(id.clone(), handle) {
            previous.abort();
            debug!(post = %id, "replaced existing deferred task");
        }
    }

    /// Aborts and removes the task for a post. Returns whether a live task
    /// was actually cancelled.
    pub fn cancel(&self, id: &PostId) -> bool {
        let mut tasks = self.tasks.lock().expect("task registry lock poisoned");
        match tasks.remove(id) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            Some(_) => false,
            None => false,
        }
    }

    /// Removes the registration without aborting, called by the deferred
    /// task itself when its timer fires. Returns whether the registration
    /// was still held; `false` means a concurrent cancel won and the task
    /// must not proceed.
    pub fn claim(&self, id: &PostId) -> bool {
        self.tasks
            .lock()
            .expect("task registry lock poisoned")
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().expect("task registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
