//! Thread list mutations and the ordering rules they apply

use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{RawThread, ThreadRecord, ThreadStatus};

use super::ThreadRegistry;

/// Ordering rule applied after a mutation.
///
/// Every rule is a single stable sort, so threads that compare equal keep
/// their previous relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRule<'a> {
    /// Most recent activity first.
    Recency,
    /// The touched thread leads; everything else by recency.
    TouchedFirst(&'a str),
    /// Active threads before resolved ones, recency within each partition.
    /// On equal timestamps the touched thread goes to the front of its
    /// partition when active and to the back when resolved.
    Partitioned { touched: &'a str, status: ThreadStatus },
}

impl OrderRule<'_> {
    pub fn apply(&self, threads: &mut [ThreadRecord]) {
        match *self {
            OrderRule::Recency => {
                threads.sort_by_key(|t| Reverse(t.last_activity_at));
            }
            OrderRule::TouchedFirst(touched) => {
                threads.sort_by_key(|t| (t.id != touched, Reverse(t.last_activity_at)));
            }
            OrderRule::Partitioned { touched, status } => {
                let touched_tie = match status {
                    ThreadStatus::Active => 0u8,
                    ThreadStatus::Resolved => 2u8,
                };
                threads.sort_by_key(|t| {
                    let tie = if t.id == touched { touched_tie } else { 1 };
                    (t.status.partition_rank(), Reverse(t.last_activity_at), tie)
                });
            }
        }
    }
}

/// Normalize transport threads to ACTIVE records, keeping the first
/// occurrence of a duplicated id.
fn normalize(threads: Vec<RawThread>) -> Vec<ThreadRecord> {
    let mut seen = HashSet::new();
    threads
        .into_iter()
        .filter(|raw| {
            let fresh = seen.insert(raw.id.clone());
            if !fresh {
                tracing::debug!("Dropping duplicate thread {} from listing", raw.id);
            }
            fresh
        })
        .map(ThreadRecord::from_raw)
        .collect()
}

impl ThreadRegistry {
    /// Replace the full thread set (initial fetch).
    ///
    /// Every thread is normalized to ACTIVE and the list is sorted by recency.
    /// A selection that no longer exists is cleared; with nothing selected the
    /// first active thread (or the first thread) gets selected.
    pub fn load_all(&mut self, threads: Vec<RawThread>) {
        let mut records = normalize(threads);
        OrderRule::Recency.apply(&mut records);
        self.threads = records;
        tracing::debug!("Loaded {} threads", self.threads.len());
        self.publish_threads();

        if let Some(selected) = self.selected_thread_id.clone() {
            if !self.contains(&selected) {
                tracing::warn!("Selected thread {} vanished from listing", selected);
                self.selected_thread_id = None;
                self.publish_selected();
            }
        }
        self.auto_select_first_active();
    }

    /// Merge a fresh listing into the known set (refreshes after the initial
    /// load).
    ///
    /// New threads arrive ACTIVE; known threads keep their status and take the
    /// listed topic and the later of the two activity timestamps. Threads
    /// missing from the listing are kept. Returns the number of new threads.
    pub fn merge_threads(&mut self, threads: Vec<RawThread>) -> usize {
        let was_empty = self.threads.is_empty();
        let mut added = 0;

        for incoming in normalize(threads) {
            match self.threads.iter_mut().find(|t| t.id == incoming.id) {
                Some(existing) => {
                    existing.topic = incoming.topic;
                    if incoming.last_activity_at > existing.last_activity_at {
                        existing.last_activity_at = incoming.last_activity_at;
                    }
                }
                None => {
                    tracing::debug!("New thread {} discovered", incoming.id);
                    self.threads.push(incoming);
                    added += 1;
                }
            }
        }

        OrderRule::Recency.apply(&mut self.threads);
        self.publish_threads();

        if was_empty {
            self.auto_select_first_active();
        }
        added
    }

    /// Record a message received on a thread.
    ///
    /// The thread's activity time becomes `occurred_at` and it moves to the
    /// front; the rest is re-sorted by recency. A message from someone other
    /// than the agent reopens a resolved thread and clears the resolved
    /// notice if it pointed at it.
    pub fn record_incoming_message(
        &mut self,
        thread_id: &str,
        occurred_at: DateTime<Utc>,
        sender_is_self: bool,
    ) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            tracing::warn!("Message received for unknown thread {}", thread_id);
            return false;
        };

        thread.last_activity_at = occurred_at;
        let reactivated = !sender_is_self && thread.status == ThreadStatus::Resolved;
        if reactivated {
            thread.status = ThreadStatus::Active;
            tracing::info!("Thread {} reactivated by customer message", thread_id);
        }

        OrderRule::TouchedFirst(thread_id).apply(&mut self.threads);
        self.publish_threads();

        if reactivated && self.resolved_thread_id.as_deref() == Some(thread_id) {
            self.resolved_thread_id = None;
            self.publish_resolved();
        }
        true
    }

    /// Apply a status change locally.
    ///
    /// Resolving the selected thread advances the selection to the next
    /// active thread below it (in the order before the resolve), falling back
    /// to the first other active thread.
    pub fn set_status(&mut self, thread_id: &str, status: ThreadStatus) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            tracing::warn!("Cannot set status of unknown thread {}", thread_id);
            return false;
        };

        thread.status = status;

        // Successor is taken from the order the agent saw before the resolve
        let successor = (status == ThreadStatus::Resolved
            && self.selected_thread_id.as_deref() == Some(thread_id))
        .then(|| self.next_active_after(thread_id))
        .flatten();

        OrderRule::Partitioned {
            touched: thread_id,
            status,
        }
        .apply(&mut self.threads);
        tracing::debug!("Thread {} is now {}", thread_id, status);
        self.publish_threads();

        if let Some(next) = successor {
            tracing::debug!("Advancing selection from {} to {}", thread_id, next);
            self.selected_thread_id = Some(next);
            self.publish_selected();
        }
        true
    }
}
