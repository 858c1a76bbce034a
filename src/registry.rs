//! Per-kind handler overrides and drained observers.

use crate::device::{Device, ScreenId};
use crate::event::{Event, EventKind};
use std::sync::{Arc, RwLock};

/// Replaces generic dispatch for one event kind.
///
/// A handler receives the screen the device is on, the event, and the device
/// it is addressed to. Slave events that are duplicated to a master reach the
/// handler twice: once for the slave, once for the master.
pub trait EventHandler: Send + Sync {
    /// Called instead of the device's input pipeline.
    fn handle_event(&self, screen: ScreenId, event: &Event, device: &Device);
}

/// Implement EventHandler for closures.
impl<F> EventHandler for F
where
    F: Fn(ScreenId, &Event, &Device) + Send + Sync,
{
    fn handle_event(&self, screen: ScreenId, event: &Event, device: &Device) {
        self(screen, event, device);
    }
}

/// Notified every time the queue has been drained empty.
pub trait DrainObserver: Send + Sync {
    /// Called once at the end of each drain.
    fn queue_drained(&self);
}

/// Implement DrainObserver for closures.
impl<F> DrainObserver for F
where
    F: Fn() + Send + Sync,
{
    fn queue_drained(&self) {
        self();
    }
}

pub(crate) struct HandlerTable {
    handlers: RwLock<[Option<Arc<dyn EventHandler>>; EventKind::COUNT]>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(std::array::from_fn(|_| None)),
        }
    }

    pub fn get(&self, kind: EventKind) -> Option<Arc<dyn EventHandler>> {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers[kind.index()].clone()
    }

    /// Install or remove a handler, returning the one it replaces.
    pub fn set(
        &self,
        kind: EventKind,
        handler: Option<Arc<dyn EventHandler>>,
    ) -> Option<Arc<dyn EventHandler>> {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        let slot = &mut handlers[kind.index()];
        if handler.is_some() && slot.is_some() {
            log::warn!("event queue: overriding existing handler for {:?} events", kind);
        }
        std::mem::replace(slot, handler)
    }

    pub fn clear(&self) {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.iter_mut().for_each(|h| *h = None);
    }
}

pub(crate) struct ObserverList {
    observers: RwLock<Vec<Arc<dyn DrainObserver>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, observer: Arc<dyn DrainObserver>) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    /// Remove the first registration of `observer`.
    pub fn remove(&self, observer: &Arc<dyn DrainObserver>) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        match observers.iter().position(|o| Arc::ptr_eq(o, observer)) {
            Some(idx) => {
                observers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Call every observer in registration order, with no lock held.
    pub fn notify(&self) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in observers {
            observer.queue_drained();
        }
    }
}
