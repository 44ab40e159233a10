//! Selection and resolved-notice pointers for ThreadRegistry

use crate::models::ThreadStatus;

use super::ThreadRegistry;

impl ThreadRegistry {
    /// Select a thread, or clear the selection with `None`.
    ///
    /// Selecting an unknown thread leaves the selection unchanged.
    pub fn select(&mut self, thread_id: Option<&str>) -> bool {
        if let Some(id) = thread_id {
            if !self.contains(id) {
                tracing::warn!("Thread {} not found in threads list", id);
                return false;
            }
        }

        self.selected_thread_id = thread_id.map(str::to_string);
        self.publish_selected();
        true
    }

    /// Set or clear the recently-resolved pointer driving the toast banner.
    pub fn set_resolved_notice(&mut self, thread_id: Option<&str>) {
        self.resolved_thread_id = thread_id.map(str::to_string);
        self.publish_resolved();
    }

    /// First active thread strictly after `thread_id` in display order,
    /// falling back to the first active thread anywhere else.
    pub fn next_active_after(&self, thread_id: &str) -> Option<String> {
        let following = self
            .position(thread_id)
            .and_then(|index| self.threads[index + 1..].iter().find(|t| t.is_active()));

        following
            .or_else(|| {
                self.threads
                    .iter()
                    .find(|t| t.id != thread_id && t.is_active())
            })
            .map(|t| t.id.clone())
    }

    /// With nothing selected, select the first active thread, else the first
    /// thread.
    pub(crate) fn auto_select_first_active(&mut self) {
        if self.selected_thread_id.is_some() {
            return;
        }

        let candidate = self
            .first_with_status(ThreadStatus::Active)
            .or_else(|| self.threads.first())
            .map(|t| t.id.clone());

        if let Some(id) = candidate {
            tracing::debug!("Auto-selecting thread {}", id);
            self.selected_thread_id = Some(id);
            self.publish_selected();
        }
    }
}
