//! Delivery of one event to its device and, for attached slaves, its master.

use crate::device::{Device, MasterKind, ScreenId};
use crate::event::{Event, EventKind};
use crate::host::InputHost;
use crate::queue::EventQueue;

/// Which master of a slave an event of `kind` goes to.
fn master_kind_for(kind: EventKind) -> MasterKind {
    if kind.is_key() {
        MasterKind::Keyboard
    } else if kind.is_pointer() {
        MasterKind::Pointer
    } else {
        MasterKind::Attached
    }
}

/// Build the copy of a slave event that its master sees.
///
/// Returns `None` for masters, floating slaves, and kinds that cannot be
/// readdressed.
fn master_event<H: InputHost + ?Sized>(
    host: &H,
    slave: &Device,
    event: &Event,
) -> Option<(Device, Event)> {
    if host.is_master(slave.id()) {
        return None;
    }
    let master = host.master(slave.id(), master_kind_for(event.kind()))?;

    let mut copy = *event;
    if let Err(err) = copy.set_device_id(master.id()) {
        log::error!("event queue: {}", err);
        return None;
    }
    // The master sees the logical button, so chained button maps compose.
    if event.kind().is_button()
        && let Event::Device(ev) = &mut copy
    {
        ev.detail = host.map_button(slave.id(), ev.detail);
    }
    Some((master, copy))
}

/// Track a device whose events now resolve on another screen.
fn follow_screen<H: InputHost + ?Sized>(
    host: &mut H,
    device: &Device,
    event: &Event,
    screen: Option<ScreenId>,
) {
    let Some(screen) = screen else {
        return;
    };
    if device.dequeue_screen() == Some(screen) {
        return;
    }
    device.set_dequeue_screen(screen);
    let (x, y) = event.root_position().unwrap_or_default();
    log::trace!(
        "event queue: device {} moved to screen {} at ({}, {})",
        device.name(),
        screen,
        x,
        y
    );
    host.switch_screen(device, screen, x, y);
}

impl EventQueue {
    /// Deliver one event from `device`, attributed to `screen`.
    ///
    /// This is what [`EventQueue::drain`] does for each queued event. Input
    /// pipelines that synthesize events which must not wait in the queue call
    /// it directly, usually with `screen` set to `None`.
    ///
    /// Events from disabled devices are discarded. A handler registered for
    /// the event's kind replaces the device pipelines entirely.
    pub fn dispatch<H: InputHost + ?Sized>(
        &self,
        host: &mut H,
        device: &Device,
        event: &Event,
        screen: Option<ScreenId>,
    ) {
        if !host.is_enabled(device.id()) {
            log::trace!(
                "event queue: discarding {:?} from disabled device {}",
                event.kind(),
                device.name()
            );
            return;
        }

        let handler = self.handlers.get(event.kind());
        if handler.is_none() && event.is_position_bearing() {
            follow_screen(host, device, event, screen);
        }

        let duplicate = master_event(host, device, event);
        if let Some((master, _)) = &duplicate {
            host.set_last_slave(master.id(), device.id());
        }

        match handler {
            Some(handler) => {
                let screen = device.dequeue_screen().or(screen).unwrap_or_default();
                handler.handle_event(screen, event, device);
                // The handler may have detached the slave.
                if let Some((master, master_event)) = &duplicate
                    && !host.is_floating(device.id())
                {
                    handler.handle_event(screen, master_event, master);
                }
            }
            None => {
                host.process_event(self, device, event);
                if let Some((master, master_event)) = &duplicate
                    && !host.is_floating(device.id())
                {
                    host.process_event(self, master, master_event);
                    #[cfg(feature = "statistics")]
                    {
                        self.lock().stats.duplicated += 1;
                    }
                }
            }
        }
    }
}
