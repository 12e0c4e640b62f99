//! The shared modal registry
//!
//! Holds every tracked modal request in stacking order (last = topmost) and
//! drives each one through `open -> closing -> settled + removed`.
//!
//! Closing is two-phase: the entry flips to `visible = false` immediately so
//! the presentation layer can animate it out, and only after the configured
//! grace delay is its result settled and the entry dropped.

use crate::completion::{self, ModalHandle, Settler};
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::modal::{ModalContent, ModalEvent, ModalId, ModalView, SizeHint};
use crate::{log_debug, log_info, log_warn};

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

/// Snapshot of the tracked requests, bottom to top
pub type ModalSnapshot = Arc<[ModalView]>;

struct ModalEntry {
    id: ModalId,
    content: ModalContent,
    size_hint: SizeHint,
    visible: bool,
    settler: Settler,
}

impl ModalEntry {
    fn view(&self) -> ModalView {
        ModalView {
            id: self.id.clone(),
            content: self.content.clone(),
            visible: self.visible,
            size_hint: self.size_hint,
        }
    }
}

struct Shared {
    entries: Mutex<Vec<ModalEntry>>,
    snapshot_tx: watch::Sender<ModalSnapshot>,
    events_tx: broadcast::Sender<ModalEvent>,
    runtime: Handle,
    config: RegistryConfig,
}

impl Shared {
    /// Publish the new state and its change events. Called with `entries` locked
    /// so observers see mutations in the order they happened.
    fn publish(&self, entries: &[ModalEntry], events: impl IntoIterator<Item = ModalEvent>) {
        self.snapshot_tx
            .send_replace(entries.iter().map(ModalEntry::view).collect());
        for event in events {
            // No subscribers is fine
            let _ = self.events_tx.send(event);
        }
    }

    fn remove(&self, id: &ModalId) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| &entry.id != id);
        if entries.len() != before {
            self.publish(&entries, [ModalEvent::Removed(id.clone())]);
            log_debug!("Removed modal {}", id);
        }
    }

    /// Drop the batch in one step; ids already removed by their own close are skipped
    fn clear(&self, ids: &[ModalId]) {
        let batch: HashSet<&ModalId> = ids.iter().collect();
        let mut entries = self.entries.lock();
        let mut removed = Vec::new();
        entries.retain(|entry| {
            let keep = !batch.contains(&entry.id);
            if !keep {
                removed.push(entry.id.clone());
            }
            keep
        });
        if !removed.is_empty() {
            log_debug!("Cleared {} modal(s)", removed.len());
            self.publish(&entries, [ModalEvent::Cleared(removed)]);
        }
    }
}

/// Process-wide modal coordinator
///
/// Create one per application and clone it into every place that opens or
/// renders modals; clones share the same request sequence.
///
/// ```no_run
/// # async fn demo() -> Result<(), modal_registry::RegistryError> {
/// use modal_registry::{ModalContent, ModalRegistry, RegistryConfig, SizeHint};
///
/// let modals = ModalRegistry::new(RegistryConfig::default())?;
/// let handle = modals.open(
///     ModalContent::new("ConfirmDelete").with_prop("path", "notes.txt"),
///     SizeHint::Md,
/// );
/// let id = handle.id().clone();
///
/// // Somewhere in the presentation layer, once the user confirms:
/// modals.close_modal_with_success(&id, serde_json::json!({ "ok": true }));
///
/// let decision = handle.await;
/// # let _ = decision;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ModalRegistry {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ModalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalRegistry")
            .field("modals", &self.modals())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl ModalRegistry {
    /// Create a registry bound to the current Tokio runtime
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let runtime = Handle::try_current().map_err(|_| RegistryError::NoRuntime)?;
        Self::with_runtime(config, runtime)
    }

    /// Create a registry that schedules its close timers on `runtime`
    pub fn with_runtime(config: RegistryConfig, runtime: Handle) -> Result<Self, RegistryError> {
        config.validate()?;
        if config.grace_delay_ms == 0 {
            log_warn!("Modal grace delay is zero; closing modals will not animate out");
        }

        let (snapshot_tx, _) = watch::channel(ModalSnapshot::from(Vec::new()));
        let (events_tx, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(Vec::new()),
                snapshot_tx,
                events_tx,
                runtime,
                config,
            }),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.shared.config
    }

    /// Push a new modal on top of the stack and return its pending result
    ///
    /// The handle resolves only after a close operation targets this modal
    /// and the grace delay has elapsed.
    pub fn open(&self, content: ModalContent, size_hint: SizeHint) -> ModalHandle {
        let mut entries = self.shared.entries.lock();

        let mut id = ModalId::generate();
        while entries.iter().any(|entry| entry.id == id) {
            id = ModalId::generate();
        }

        let (settler, handle) = completion::channel(id.clone());
        log_debug!(
            "Opening modal {} ({}, size {})",
            id,
            content.component,
            size_hint
        );
        entries.push(ModalEntry {
            id: id.clone(),
            content,
            size_hint,
            visible: true,
            settler,
        });
        self.shared.publish(&entries, [ModalEvent::Opened(id)]);

        handle
    }

    /// [`open`](Self::open) with the configured default size hint
    pub fn open_default(&self, content: ModalContent) -> ModalHandle {
        self.open(content, self.shared.config.default_size)
    }

    /// Dismiss a modal; its handle resolves to `Value::Null`
    ///
    /// Unknown or already-closing ids are ignored.
    pub fn close_modal(&self, id: &ModalId) {
        self.begin_close(id, Value::Null);
    }

    /// Confirm a modal; its handle resolves to `data`
    ///
    /// Unknown or already-closing ids are ignored.
    pub fn close_modal_with_success(&self, id: &ModalId, data: Value) {
        self.begin_close(id, data);
    }

    /// Dismiss every tracked modal and drop them together after the grace delay
    ///
    /// Modals opened after this call are left alone. A modal that was already
    /// closing keeps the result of its earlier close.
    pub fn close_all_modals(&self) {
        let mut entries = self.shared.entries.lock();
        if entries.is_empty() {
            return;
        }

        let mut ids = Vec::with_capacity(entries.len());
        let mut settlers = Vec::new();
        let mut closing = Vec::new();
        for entry in entries.iter_mut() {
            // Entries already closing settle through their own pending close
            if std::mem::replace(&mut entry.visible, false) {
                closing.push(ModalEvent::Closing(entry.id.clone()));
                settlers.push(entry.settler.clone());
            }
            ids.push(entry.id.clone());
        }
        self.shared.publish(&entries, closing);
        drop(entries);

        log_info!("Closing all {} modal(s)", ids.len());

        let shared = Arc::clone(&self.shared);
        self.shared.runtime.spawn(async move {
            tokio::time::sleep(shared.config.grace_delay()).await;
            // Removed before settling so an awaiter never sees its own entry
            shared.clear(&ids);
            for settler in &settlers {
                settler.settle(Value::Null);
            }
        });
    }

    fn begin_close(&self, id: &ModalId, payload: Value) {
        let mut entries = self.shared.entries.lock();
        let Some(entry) = entries
            .iter_mut()
            .find(|entry| &entry.id == id && entry.visible)
        else {
            log_debug!("Ignoring close for unknown or closing modal {}", id);
            return;
        };

        entry.visible = false;
        let settler = entry.settler.clone();
        self.shared.publish(&entries, [ModalEvent::Closing(id.clone())]);
        drop(entries);

        log_debug!("Closing modal {}", id);

        let shared = Arc::clone(&self.shared);
        let id = id.clone();
        self.shared.runtime.spawn(async move {
            tokio::time::sleep(shared.config.grace_delay()).await;
            shared.remove(&id);
            if settler.settle(payload) {
                log_debug!("Settled modal {}", id);
            }
        });
    }

    /// Current snapshot of tracked modals, bottom to top
    pub fn modals(&self) -> ModalSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Watch the tracked modals; the receiver sees a new snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<ModalSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Receive structural change events
    pub fn events(&self) -> broadcast::Receiver<ModalEvent> {
        self.shared.events_tx.subscribe()
    }

    /// Number of tracked modals, including ones still animating out
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.lock().is_empty()
    }

    pub fn get(&self, id: &ModalId) -> Option<ModalView> {
        self.shared
            .entries
            .lock()
            .iter()
            .find(|entry| &entry.id == id)
            .map(ModalEntry::view)
    }

    /// Whether `id` is tracked and has not been asked to close
    pub fn is_open(&self, id: &ModalId) -> bool {
        self.shared
            .entries
            .lock()
            .iter()
            .any(|entry| &entry.id == id && entry.visible)
    }

    /// Topmost modal that is still visible
    pub fn top(&self) -> Option<ModalView> {
        self.shared
            .entries
            .lock()
            .iter()
            .rev()
            .find(|entry| entry.visible)
            .map(ModalEntry::view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_a_runtime() {
        let result = ModalRegistry::new(RegistryConfig::default());
        assert!(matches!(result, Err(RegistryError::NoRuntime)));
    }

    #[test]
    fn with_runtime_rejects_invalid_config() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        let config = RegistryConfig {
            event_capacity: 0,
            ..RegistryConfig::default()
        };

        let result = ModalRegistry::with_runtime(config, runtime.handle().clone());
        assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn open_never_settles_synchronously() {
        let registry = ModalRegistry::new(RegistryConfig::default()).expect("registry");
        let mut handle = registry.open_default(ModalContent::new("Sync"));

        assert!(futures::FutureExt::now_or_never(&mut handle).is_none());
        let entries = registry.shared.entries.lock();
        assert_eq!(entries.len(), 1);
        assert!(!entries.iter().any(|entry| entry.settler.is_settled()));
    }

    #[tokio::test(start_paused = true)]
    async fn settled_entries_are_never_tracked() {
        let registry = ModalRegistry::new(RegistryConfig::default()).expect("registry");
        let first = registry.open_default(ModalContent::new("A"));
        let _second = registry.open_default(ModalContent::new("B"));

        registry.close_modal(first.id());
        assert_eq!(first.await, Value::Null);

        let entries = registry.shared.entries.lock();
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().all(|entry| !entry.settler.is_settled()));
    }
}
