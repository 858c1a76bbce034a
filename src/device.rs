//! Device handles and screen attribution.
//!
//! The device hierarchy itself (attachments, enabled state, button maps) is
//! owned by the server and reached through [`InputHost`](crate::InputHost).
//! What the queue needs from a device on the producer side is only its id and
//! the screen its events are currently attributed to, so that is all a
//! [`Device`] handle carries.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identifier of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u16);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScreenId(pub u16);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which master a slave event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterKind {
    /// The master pointer of the slave's master pair.
    Pointer,
    /// The master keyboard of the slave's master pair.
    Keyboard,
    /// Whatever master the slave is directly attached to.
    Attached,
}

const NO_SCREEN: u32 = u32::MAX;

fn load_screen(slot: &AtomicU32) -> Option<ScreenId> {
    match slot.load(Ordering::Acquire) {
        NO_SCREEN => None,
        n => Some(ScreenId(n as u16)),
    }
}

fn store_screen(slot: &AtomicU32, screen: Option<ScreenId>) {
    slot.store(screen.map_or(NO_SCREEN, |s| s.0 as u32), Ordering::Release);
}

struct DeviceInner {
    id: DeviceId,
    name: String,
    enqueue_screen: AtomicU32,
    dequeue_screen: AtomicU32,
}

/// Cheaply clonable handle to an input device.
///
/// Clones share screen attribution. Producers read the enqueue screen when
/// they queue an event; the consumer reads and updates the dequeue screen
/// while dispatching.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("enqueue_screen", &self.enqueue_screen())
            .field("dequeue_screen", &self.dequeue_screen())
            .finish()
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Device {}

impl Device {
    /// Create a device with no screen attribution.
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(DeviceInner {
                id,
                name: name.into(),
                enqueue_screen: AtomicU32::new(NO_SCREEN),
                dequeue_screen: AtomicU32::new(NO_SCREEN),
            }),
        }
    }

    /// Create a device whose events start out attributed to `screen`.
    pub fn on_screen(id: DeviceId, name: impl Into<String>, screen: ScreenId) -> Self {
        let device = Self::new(id, name);
        device.switch_screen(screen, true);
        device
    }

    /// The device id.
    pub fn id(&self) -> DeviceId {
        self.inner.id
    }

    /// The device name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Screen newly queued events are attributed to.
    pub fn enqueue_screen(&self) -> Option<ScreenId> {
        load_screen(&self.inner.enqueue_screen)
    }

    /// Screen the consumer last resolved this device's events on.
    pub fn dequeue_screen(&self) -> Option<ScreenId> {
        load_screen(&self.inner.dequeue_screen)
    }

    /// Move the device to another screen.
    ///
    /// Events queued from now on are attributed to `screen`. With
    /// `set_dequeue` the consumer-side screen is moved too, which is what a
    /// warp does; a pointer crossing a screen edge leaves it alone and lets
    /// dispatch catch up when the event is dequeued.
    pub fn switch_screen(&self, screen: ScreenId, set_dequeue: bool) {
        store_screen(&self.inner.enqueue_screen, Some(screen));
        if set_dequeue {
            store_screen(&self.inner.dequeue_screen, Some(screen));
        }
    }

    pub(crate) fn set_dequeue_screen(&self, screen: ScreenId) {
        store_screen(&self.inner.dequeue_screen, Some(screen));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_screen() {
        let dev = Device::new(DeviceId(6), "touchpad");
        assert_eq!(dev.enqueue_screen(), None);
        assert_eq!(dev.dequeue_screen(), None);

        dev.switch_screen(ScreenId(1), false);
        assert_eq!(dev.enqueue_screen(), Some(ScreenId(1)));
        assert_eq!(dev.dequeue_screen(), None);

        dev.switch_screen(ScreenId(0), true);
        assert_eq!(dev.enqueue_screen(), Some(ScreenId(0)));
        assert_eq!(dev.dequeue_screen(), Some(ScreenId(0)));
    }

    #[test]
    fn test_clones_share_attribution() {
        let dev = Device::on_screen(DeviceId(2), "pointer", ScreenId(0));
        let clone = dev.clone();
        clone.switch_screen(ScreenId(3), true);

        assert_eq!(dev.enqueue_screen(), Some(ScreenId(3)));
        assert_eq!(dev, clone);
        assert_ne!(dev, Device::new(DeviceId(2), "pointer"));
    }
}
