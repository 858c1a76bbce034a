//! # xeq
//!
//! The input event queue of an X11 display server.
//!
//! Every physical input event passes through this queue on its way from the
//! device drivers to the server's input pipelines. Drivers (producers, on any
//! thread) [`enqueue`](EventQueue::enqueue) events; the server's main loop
//! (the single consumer) [`drain`](EventQueue::drain)s them in order, routing
//! each one to the device that produced it and, for physical "slave" devices
//! attached to a logical "master", a readdressed copy to that master.
//!
//! ## Features
//!
//! - Growable ring storage with no per-event allocation
//! - Motion coalescing per device under high-frequency pointer input
//! - Drop-and-count backpressure with rate-limited overflow reports
//! - Backward clock skew clamping
//! - Master/slave duplication with button remapping
//! - Per-kind handler overrides and drained observers
//!
//! ## Quick Start
//!
//! ```no_run
//! use xeq::{Device, DeviceId, Event, EventQueue, InputHost, MasterKind, QueueConfig, ScreenId};
//!
//! struct Server;
//!
//! impl InputHost for Server {
//!     fn is_enabled(&self, _: DeviceId) -> bool { true }
//!     fn is_master(&self, _: DeviceId) -> bool { false }
//!     fn master(&self, _: DeviceId, _: MasterKind) -> Option<Device> { None }
//!     fn set_last_slave(&mut self, _: DeviceId, _: DeviceId) {}
//!     fn process_event(&mut self, _: &EventQueue, device: &Device, event: &Event) {
//!         println!("{}: {:?}", device.name(), event.kind());
//!     }
//!     fn switch_screen(&mut self, _: &Device, _: ScreenId, _: f64, _: f64) {}
//!     fn update_sprite(&mut self, _: &Device) {}
//! }
//!
//! let queue = EventQueue::new(QueueConfig::default()).expect("Failed to create queue");
//! let mouse = Device::on_screen(DeviceId(6), "mouse", ScreenId(0));
//!
//! queue.enqueue(&mouse, Event::motion(mouse.id(), 1, 10.0, 20.0));
//! queue.enqueue(&mouse, Event::button_press(mouse.id(), 2, 1));
//!
//! let mut server = Server;
//! queue.drain(&mut server);
//! ```
//!
//! ## Architecture
//!
//! The queue is an explicit object rather than a global: create one per
//! display. The server's device hierarchy stays outside the crate and is
//! reached through the [`InputHost`] trait, which only the consumer calls.
//! Producers need nothing but a [`Device`] handle, whose screen attribution
//! is shared with the consumer through atomics.

pub mod config;
pub mod device;
mod dispatch;
pub mod error;
pub mod event;
pub mod host;
pub mod queue;
pub mod registry;
#[cfg(feature = "statistics")]
pub mod statistics;

mod storage;
#[cfg(test)]
mod testing;

// Re-exports
pub use config::QueueConfig;
pub use device::{Device, DeviceId, MasterKind, ScreenId};
pub use error::{Error, Result};
pub use event::{
    BarrierEvent, BarrierEventKind, DeviceChangedEvent, DeviceEvent, DeviceEventKind, Event,
    EventKind, GestureEvent, GestureEventKind, RawEvent, RawEventKind, Time, TouchOwnershipEvent,
    Valuators, VendorEvent,
};
pub use host::InputHost;
pub use queue::EventQueue;
pub use registry::{DrainObserver, EventHandler};
#[cfg(feature = "statistics")]
pub use statistics::QueueStatistics;
