//! The interface between the queue and the rest of the server.
//!
//! The queue does not own the device hierarchy, the per-device input
//! pipelines, the cursor or the screen saver. It reaches all of them through
//! an [`InputHost`] passed to [`EventQueue::drain`](crate::EventQueue::drain),
//! which makes the consumer the only party touching hierarchy state.

use crate::device::{Device, DeviceId, MasterKind, ScreenId};
use crate::event::Event;
use crate::queue::EventQueue;

/// Collaborators the consumer side of the queue calls into.
pub trait InputHost {
    /// Check whether the device is enabled. Events from disabled devices are
    /// discarded at dispatch.
    fn is_enabled(&self, device: DeviceId) -> bool;

    /// Check whether the device is a master device.
    fn is_master(&self, device: DeviceId) -> bool;

    /// The master of `kind` for a slave, or `None` for masters and floating
    /// slaves.
    fn master(&self, device: DeviceId, kind: MasterKind) -> Option<Device>;

    /// Check whether the device is a slave with no master.
    fn is_floating(&self, device: DeviceId) -> bool {
        !self.is_master(device) && self.master(device, MasterKind::Attached).is_none()
    }

    /// Map a physical button number through the device's button map.
    fn map_button(&self, _device: DeviceId, button: u32) -> u32 {
        button
    }

    /// Remember which slave most recently sent events through `master`.
    fn set_last_slave(&mut self, master: DeviceId, slave: DeviceId);

    /// Run the device's input pipeline on an event.
    ///
    /// `queue` is the queue being drained; the pipeline may enqueue follow-up
    /// events on it, which are dispatched later in the same drain.
    fn process_event(&mut self, queue: &EventQueue, device: &Device, event: &Event);

    /// The device's events moved to another screen; reposition the pointer
    /// there at `(x, y)`.
    fn switch_screen(&mut self, device: &Device, screen: ScreenId, x: f64, y: f64);

    /// Redraw the cursor sprite after the device moved.
    fn update_sprite(&mut self, device: &Device);

    /// Called for every dequeued event before it is dispatched, so the host
    /// can wake a saved screen or a powered-down display.
    fn activity(&mut self) {}
}
