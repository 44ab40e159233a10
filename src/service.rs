//! Threads service: drives the registry from the chat transport and the
//! work-item store.
//!
//! The registry sits behind a `std::sync::Mutex` that is only ever held for
//! a synchronous mutation, never across an `.await`. External calls are
//! awaited first and their outcome is applied afterwards, so a failed write
//! leaves local state untouched.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::DeskConfig;
use crate::error::{DeskError, DeskResult};
use crate::models::{ThreadStatus, WorkItem};
use crate::registry::{RegistryViews, ThreadRegistry};
use crate::traits::{ChatEvent, ChatTransport, WorkItemStore};

/// Marks a thread as having a status write in flight until dropped.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    thread_id: String,
}

impl InFlightGuard {
    /// Returns `None` if a write for `thread_id` is already pending.
    fn acquire(set: &Arc<Mutex<HashSet<String>>>, thread_id: &str) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(thread_id.to_string());
        inserted.then(|| Self {
            set: Arc::clone(set),
            thread_id: thread_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.thread_id);
    }
}

/// Keeps `is_loading` up while at least one fetch is running.
struct LoadingGuard<'a> {
    service: &'a ThreadsService,
}

impl<'a> LoadingGuard<'a> {
    fn start(service: &'a ThreadsService) -> Self {
        if service.pending_fetches.fetch_add(1, Ordering::SeqCst) == 0 {
            service.with_registry(|r| r.set_loading(true));
        }
        Self { service }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.service.pending_fetches.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.service.with_registry(|r| r.set_loading(false));
        }
    }
}

/// Owner of the thread registry and its collaborators.
///
/// Cheap to clone; clones share the registry, collaborators and background
/// tasks.
#[derive(Clone)]
pub struct ThreadsService {
    registry: Arc<Mutex<ThreadRegistry>>,
    transport: Arc<dyn ChatTransport>,
    work_items: Arc<dyn WorkItemStore>,
    config: DeskConfig,
    in_flight: Arc<Mutex<HashSet<String>>>,
    pending_fetches: Arc<AtomicUsize>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl ThreadsService {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        work_items: Arc<dyn WorkItemStore>,
        config: DeskConfig,
    ) -> Self {
        Self {
            registry: Arc::new(Mutex::new(ThreadRegistry::new())),
            transport,
            work_items,
            config,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            pending_fetches: Arc::new(AtomicUsize::new(0)),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run `f` against the registry under its lock.
    pub fn with_registry<R>(&self, f: impl FnOnce(&mut ThreadRegistry) -> R) -> R {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut registry)
    }

    /// Read-only projections of the registry.
    pub fn views(&self) -> RegistryViews {
        self.with_registry(|r| r.subscribe())
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Stop the event listener and the auto refresh.
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        tracing::debug!("Stopping {} background tasks", tasks.len());
        for task in tasks {
            task.abort();
        }
    }

    /// Start listening for chat events as `user_id`, then load the threads.
    ///
    /// The listener keeps running even if the initial fetch fails.
    pub async fn initialize(&self, user_id: &str) -> DeskResult<()> {
        tracing::info!("Initializing threads for {}", user_id);
        self.spawn_event_listener(user_id);
        self.fetch_threads(true).await
    }

    fn spawn_event_listener(&self, user_id: &str) {
        // Subscribe before spawning so no event published after this call is missed
        let mut events = self.transport.subscribe();
        let service = self.clone();
        let user_id = user_id.to_string();

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => service.handle_chat_event(event, &user_id).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} chat events, refreshing threads", skipped);
                        if let Err(e) = service.fetch_threads(false).await {
                            tracing::error!("Refresh after missed events failed: {}", e);
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Chat event stream closed");
                        break;
                    }
                }
            }
        });
        self.track(handle);
    }

    /// Fetch the thread listing.
    ///
    /// With `init` the listing replaces the registry contents, otherwise it
    /// is merged in. A failed listing leaves the registry as it was.
    pub async fn fetch_threads(&self, init: bool) -> DeskResult<()> {
        let _loading = LoadingGuard::start(self);

        let threads = match self.transport.list_threads().await {
            Ok(threads) => threads,
            Err(e) => {
                tracing::error!("Failed to fetch threads: {}", e);
                return Err(e.into());
            }
        };

        self.with_registry(|r| {
            if init {
                r.load_all(threads);
            } else {
                let added = r.merge_threads(threads);
                if added > 0 {
                    tracing::info!("{} new threads", added);
                }
            }
        });

        if self.config.enrich_statuses {
            match self.work_items.list_status_records().await {
                Ok(items) => {
                    self.apply_external_statuses(&items);
                }
                Err(e) => tracing::warn!("Failed to load work-item statuses: {}", e),
            }
        }
        Ok(())
    }

    /// React to a push event from the chat transport.
    pub async fn handle_chat_event(&self, event: ChatEvent, user_id: &str) {
        match event {
            ChatEvent::ThreadCreated { thread_id } => {
                tracing::debug!("Thread {} created", thread_id);
                if let Err(e) = self.fetch_threads(false).await {
                    tracing::error!("Refresh after thread creation failed: {}", e);
                }
            }
            ChatEvent::MessageReceived {
                thread_id,
                sender_id,
                occurred_at,
            } => {
                let sender_is_self = sender_id == user_id;
                self.with_registry(|r| {
                    r.record_incoming_message(&thread_id, occurred_at, sender_is_self)
                });
            }
        }
    }

    /// Persist a status change, then apply it locally.
    ///
    /// RESOLVED updates the existing work item, ACTIVE creates one. Only one
    /// write per thread may be pending; a second one is rejected.
    pub async fn update_thread_status_external(
        &self,
        thread_id: &str,
        status: ThreadStatus,
    ) -> DeskResult<()> {
        if !self.with_registry(|r| r.contains(thread_id)) {
            return Err(DeskError::ThreadNotFound(thread_id.to_string()));
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, thread_id)
            .ok_or_else(|| DeskError::StatusUpdateInFlight(thread_id.to_string()))?;

        let persisted = match status {
            ThreadStatus::Resolved => {
                self.work_items
                    .update_status_record(thread_id, status)
                    .await
            }
            ThreadStatus::Active => {
                self.work_items
                    .create_status_record(thread_id, status)
                    .await
            }
        };

        if let Err(source) = persisted {
            tracing::error!("Failed to persist status of thread {}: {}", thread_id, source);
            return Err(DeskError::ExternalPersist {
                thread_id: thread_id.to_string(),
                source,
            });
        }

        self.with_registry(|r| r.set_status(thread_id, status));
        tracing::info!("Thread {} marked {}", thread_id, status);
        Ok(())
    }

    /// Resolve a chat.
    ///
    /// When it was selected, the registry moves the selection on to the next
    /// active thread.
    pub async fn resolve_chat(&self, thread_id: &str) -> DeskResult<()> {
        self.update_thread_status_external(thread_id, ThreadStatus::Resolved)
            .await
    }

    /// Open a thread from the resolved notice.
    ///
    /// Returns the status tab the thread is listed under.
    pub fn view_thread(&self, thread_id: &str) -> DeskResult<ThreadStatus> {
        self.with_registry(|r| {
            if !r.select(Some(thread_id)) {
                return Err(DeskError::ThreadNotFound(thread_id.to_string()));
            }
            if r.resolved_thread_id() == Some(thread_id) {
                r.set_resolved_notice(None);
            }
            r.get(thread_id)
                .map(|t| t.status)
                .ok_or_else(|| DeskError::ThreadNotFound(thread_id.to_string()))
        })
    }

    /// Switch the status tab, selecting its first thread.
    ///
    /// Returns the newly selected thread, or `None` when the tab is empty
    /// and the selection was cleared.
    pub fn select_status_tab(&self, status: ThreadStatus) -> Option<String> {
        self.with_registry(|r| {
            let first = r.first_with_status(status).map(|t| t.id.clone());
            match &first {
                Some(id) => {
                    r.select(Some(id));
                }
                None => {
                    tracing::debug!("No threads with status {}", status);
                    r.select(None);
                }
            }
            first
        })
    }

    /// Apply statuses the work-item store reports for threads resolved
    /// elsewhere.
    ///
    /// Only ACTIVE threads reported RESOLVED change; threads with a local
    /// write in flight are skipped. Raises the resolved notice for the first
    /// changed thread and returns all changed ids.
    pub fn apply_external_statuses(&self, items: &[WorkItem]) -> Vec<String> {
        let in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let resolved: Vec<String> = self.with_registry(|r| {
            let mut resolved = Vec::new();
            for item in items {
                if item.status != ThreadStatus::Resolved || in_flight.contains(&item.id) {
                    continue;
                }
                let is_active = r.get(&item.id).is_some_and(|t| t.is_active());
                if is_active && r.set_status(&item.id, ThreadStatus::Resolved) {
                    resolved.push(item.id.clone());
                }
            }
            resolved
        });

        if let Some(first) = resolved.first() {
            tracing::info!("{} threads resolved externally", resolved.len());
            self.show_resolved_notice(first);
        }
        resolved
    }

    /// Point the resolved notice at `thread_id` and hide it after the
    /// configured delay, unless it was repointed meanwhile.
    pub fn show_resolved_notice(&self, thread_id: &str) -> JoinHandle<()> {
        self.with_registry(|r| r.set_resolved_notice(Some(thread_id)));

        let service = self.clone();
        let thread_id = thread_id.to_string();
        let delay = self.config.toast_auto_hide;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.with_registry(|r| {
                if r.resolved_thread_id() == Some(thread_id.as_str()) {
                    r.set_resolved_notice(None);
                }
            });
        })
    }

    /// Refresh the thread listing every `refresh_interval`.
    pub fn spawn_auto_refresh(&self) {
        let service = self.clone();
        let period = self.config.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                tracing::debug!("Auto-refreshing threads");
                if let Err(e) = service.fetch_threads(false).await {
                    tracing::warn!("Auto refresh failed: {}", e);
                }
            }
        });
        self.track(handle);
    }
}
