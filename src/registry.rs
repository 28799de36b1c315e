/*
 * Maps native handles back to the widget wrappers that own them. The registry
 * is the single source of truth for "is this widget still alive": the router
 * consults it before touching any widget state, and the ownership tree removes
 * entries during teardown.
 *
 * A miss is never an error. The host may deliver notifications for a handle
 * whose construction has not finished yet, or for one that is already gone.
 */
use crate::types::{NativeHandle, WidgetId};

use std::collections::HashMap;

/// Result of removing a handle from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unregistered {
    /// The handle was not registered; nothing changed.
    NotPresent,
    /// The handle was removed and other widgets remain.
    Removed,
    /// The handle was removed and it was the last one.
    RemovedLast,
}

#[derive(Debug, Default)]
pub(crate) struct HandleRegistry {
    entries: HashMap<NativeHandle, WidgetId>,
}

impl HandleRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, handle: NativeHandle, widget: WidgetId) {
        if let Some(previous) = self.entries.insert(handle, widget)
            && previous != widget
        {
            log::warn!(
                "HandleRegistry: Handle {handle:?} re-registered from {previous:?} to {widget:?}."
            );
        }
        log::trace!("HandleRegistry: Registered {handle:?} -> {widget:?}.");
    }

    pub(crate) fn lookup(&self, handle: NativeHandle) -> Option<WidgetId> {
        self.entries.get(&handle).copied()
    }

    pub(crate) fn exists(&self, handle: NativeHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /*
     * Idempotent: removing a handle twice reports `NotPresent` the second time
     * and leaves the registry untouched. `RemovedLast` is reported only for the
     * removal that actually emptied the registry.
     */
    pub(crate) fn unregister(&mut self, handle: NativeHandle) -> Unregistered {
        match self.entries.remove(&handle) {
            None => Unregistered::NotPresent,
            Some(widget) => {
                log::trace!("HandleRegistry: Unregistered {handle:?} (was {widget:?}).");
                if self.entries.is_empty() {
                    Unregistered::RemovedLast
                } else {
                    Unregistered::Removed
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
