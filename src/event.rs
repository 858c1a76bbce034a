//! Event records carried through the queue.
//!
//! An [`Event`] is a plain value: its size is that of the largest variant, so
//! a queue slot can hold any event without a per-event allocation. Copying an
//! event copies exactly one record; the only variable-length payload (the
//! vendor event) is reachable solely through [`VendorEvent::data`], which
//! never exposes bytes past the declared length.

use crate::device::DeviceId;
use crate::error::{Error, Result};
use std::mem;

/// Server timestamp in milliseconds.
pub type Time = u64;

/// Maximum number of valuator axes a device event can carry.
pub const MAX_VALUATORS: usize = 36;

/// Maximum payload size of a vendor event, in bytes.
pub const VENDOR_PAYLOAD_MAX: usize = 64;

/// The touch sequence is emulating a pointer.
pub const TOUCH_POINTER_EMULATED: u32 = 1 << 5;

/// The event was generated by pointer emulation of another event.
pub const POINTER_EMULATED: u32 = 1 << 4;

/// Every kind of event the queue can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Motion,
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    ProximityIn,
    ProximityOut,
    TouchBegin,
    TouchUpdate,
    TouchEnd,
    TouchOwnership,
    DeviceChanged,
    RawKeyPress,
    RawKeyRelease,
    RawButtonPress,
    RawButtonRelease,
    RawMotion,
    RawTouchBegin,
    RawTouchUpdate,
    RawTouchEnd,
    BarrierHit,
    BarrierLeave,
    GesturePinchBegin,
    GesturePinchUpdate,
    GesturePinchEnd,
    GestureSwipeBegin,
    GestureSwipeUpdate,
    GestureSwipeEnd,
    /// Opaque event owned by a platform extension.
    Vendor,
}

impl EventKind {
    /// Number of distinct kinds.
    pub const COUNT: usize = 29;

    /// All kinds, in declaration order.
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Motion,
        EventKind::KeyPress,
        EventKind::KeyRelease,
        EventKind::ButtonPress,
        EventKind::ButtonRelease,
        EventKind::ProximityIn,
        EventKind::ProximityOut,
        EventKind::TouchBegin,
        EventKind::TouchUpdate,
        EventKind::TouchEnd,
        EventKind::TouchOwnership,
        EventKind::DeviceChanged,
        EventKind::RawKeyPress,
        EventKind::RawKeyRelease,
        EventKind::RawButtonPress,
        EventKind::RawButtonRelease,
        EventKind::RawMotion,
        EventKind::RawTouchBegin,
        EventKind::RawTouchUpdate,
        EventKind::RawTouchEnd,
        EventKind::BarrierHit,
        EventKind::BarrierLeave,
        EventKind::GesturePinchBegin,
        EventKind::GesturePinchUpdate,
        EventKind::GesturePinchEnd,
        EventKind::GestureSwipeBegin,
        EventKind::GestureSwipeUpdate,
        EventKind::GestureSwipeEnd,
        EventKind::Vendor,
    ];

    /// Position of this kind in [`EventKind::ALL`], used to index per-kind tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Check if this is a key press or release.
    pub fn is_key(self) -> bool {
        matches!(self, EventKind::KeyPress | EventKind::KeyRelease)
    }

    /// Check if this is a button press or release.
    pub fn is_button(self) -> bool {
        matches!(self, EventKind::ButtonPress | EventKind::ButtonRelease)
    }

    /// Check if this is a touch begin, update or end.
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            EventKind::TouchBegin | EventKind::TouchUpdate | EventKind::TouchEnd
        )
    }

    /// Check if this event is routed through a master pointer.
    pub fn is_pointer(self) -> bool {
        matches!(
            self,
            EventKind::Motion
                | EventKind::ButtonPress
                | EventKind::ButtonRelease
                | EventKind::ProximityIn
                | EventKind::ProximityOut
        )
    }
}

/// A set of valuator (axis) values with a presence mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuators {
    mask: u64,
    values: [f64; MAX_VALUATORS],
}

impl Default for Valuators {
    fn default() -> Self {
        Self::new()
    }
}

impl Valuators {
    /// Create an empty valuator set.
    pub const fn new() -> Self {
        Self {
            mask: 0,
            values: [0.0; MAX_VALUATORS],
        }
    }

    /// Set an axis value. Returns `false` if `axis` is out of range.
    pub fn set(&mut self, axis: usize, value: f64) -> bool {
        if axis >= MAX_VALUATORS {
            return false;
        }
        self.mask |= 1 << axis;
        self.values[axis] = value;
        true
    }

    /// Remove an axis from the set.
    pub fn unset(&mut self, axis: usize) {
        if axis < MAX_VALUATORS {
            self.mask &= !(1 << axis);
            self.values[axis] = 0.0;
        }
    }

    /// Get an axis value if present.
    pub fn get(&self, axis: usize) -> Option<f64> {
        self.is_set(axis).then(|| self.values[axis])
    }

    /// Check whether an axis is present.
    pub fn is_set(&self, axis: usize) -> bool {
        axis < MAX_VALUATORS && self.mask & (1 << axis) != 0
    }

    /// Number of axes present.
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Check whether no axis is present.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Iterate over present axes as `(axis, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..MAX_VALUATORS).filter_map(move |axis| self.get(axis).map(|v| (axis, v)))
    }
}

/// Sub-kinds of [`DeviceEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceEventKind {
    Motion,
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    ProximityIn,
    ProximityOut,
    TouchBegin,
    TouchUpdate,
    TouchEnd,
}

/// Pointer, keyboard, proximity and touch events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceEvent {
    pub kind: DeviceEventKind,
    /// Device the event is addressed to.
    pub device_id: DeviceId,
    /// Physical device that produced the event.
    pub source_id: DeviceId,
    pub time: Time,
    /// Button number, key code, or touch id depending on `kind`.
    pub detail: u32,
    /// Position in root window coordinates.
    pub root_x: f64,
    pub root_y: f64,
    pub valuators: Valuators,
    pub flags: u32,
}

impl DeviceEvent {
    /// Create an event from `device` with all payload fields zeroed.
    pub fn new(kind: DeviceEventKind, device: DeviceId, time: Time) -> Self {
        Self {
            kind,
            device_id: device,
            source_id: device,
            time,
            detail: 0,
            root_x: 0.0,
            root_y: 0.0,
            valuators: Valuators::new(),
            flags: 0,
        }
    }

    /// Set the detail field.
    pub fn with_detail(mut self, detail: u32) -> Self {
        self.detail = detail;
        self
    }

    /// Set the root position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.root_x = x;
        self.root_y = y;
        self
    }

    /// Add flag bits.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    /// Set one valuator axis; out-of-range axes are ignored.
    pub fn with_valuator(mut self, axis: usize, value: f64) -> Self {
        self.valuators.set(axis, value);
        self
    }
}

/// Ownership change of a touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchOwnershipEvent {
    pub device_id: DeviceId,
    pub source_id: DeviceId,
    pub time: Time,
    pub touch_id: u32,
    /// Client resource the ownership moved to.
    pub resource: u32,
    pub reason: u32,
    pub flags: u32,
}

/// A device's classes changed (buttons, keys or axes were reconfigured).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceChangedEvent {
    pub device_id: DeviceId,
    pub source_id: DeviceId,
    pub time: Time,
    pub flags: u32,
    pub num_buttons: u16,
    pub num_valuators: u16,
    pub min_keycode: u8,
    pub max_keycode: u8,
}

/// Sub-kinds of [`RawEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    Motion,
    TouchBegin,
    TouchUpdate,
    TouchEnd,
}

/// Unaccelerated device data as delivered by the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub device_id: DeviceId,
    pub source_id: DeviceId,
    pub time: Time,
    pub detail: u32,
    /// Valuators after acceleration.
    pub valuators: Valuators,
    /// Valuators as reported by the hardware.
    pub raw_valuators: Valuators,
    pub flags: u32,
}

/// Sub-kinds of [`BarrierEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierEventKind {
    Hit,
    Leave,
}

/// The pointer was constrained by, or released from, a pointer barrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierEvent {
    pub kind: BarrierEventKind,
    pub device_id: DeviceId,
    pub source_id: DeviceId,
    pub time: Time,
    pub barrier_id: u32,
    pub event_id: u32,
    pub window: u32,
    pub root_x: f64,
    pub root_y: f64,
    pub dx: f64,
    pub dy: f64,
    /// Milliseconds since the previous barrier event.
    pub dt: u32,
    pub flags: u32,
}

/// Sub-kinds of [`GestureEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureEventKind {
    PinchBegin,
    PinchUpdate,
    PinchEnd,
    SwipeBegin,
    SwipeUpdate,
    SwipeEnd,
}

/// Touchpad pinch and swipe gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureEventKind,
    pub device_id: DeviceId,
    pub source_id: DeviceId,
    pub time: Time,
    pub num_touches: u32,
    pub root_x: f64,
    pub root_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_unaccel_x: f64,
    pub delta_unaccel_y: f64,
    /// Pinch only.
    pub scale: f64,
    /// Pinch only.
    pub delta_angle: f64,
    pub flags: u32,
}

/// Opaque platform event. Carries no device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorEvent {
    pub code: u8,
    pub time: Time,
    len: u8,
    data: [u8; VENDOR_PAYLOAD_MAX],
}

impl VendorEvent {
    /// Create a vendor event. Returns `None` if `payload` exceeds
    /// [`VENDOR_PAYLOAD_MAX`] bytes.
    pub fn new(code: u8, time: Time, payload: &[u8]) -> Option<Self> {
        if payload.len() > VENDOR_PAYLOAD_MAX {
            return None;
        }
        let mut data = [0u8; VENDOR_PAYLOAD_MAX];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            code,
            time,
            len: payload.len() as u8,
            data,
        })
    }

    /// The declared payload.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// One input occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Device(DeviceEvent),
    TouchOwnership(TouchOwnershipEvent),
    DeviceChanged(DeviceChangedEvent),
    Raw(RawEvent),
    Barrier(BarrierEvent),
    Gesture(GestureEvent),
    Vendor(VendorEvent),
}

impl From<DeviceEvent> for Event {
    fn from(ev: DeviceEvent) -> Self {
        Event::Device(ev)
    }
}

impl Event {
    /// Create a pointer motion event.
    pub fn motion(device: DeviceId, time: Time, x: f64, y: f64) -> Self {
        DeviceEvent::new(DeviceEventKind::Motion, device, time)
            .at(x, y)
            .into()
    }

    /// Create a key press event.
    pub fn key_press(device: DeviceId, time: Time, keycode: u32) -> Self {
        DeviceEvent::new(DeviceEventKind::KeyPress, device, time)
            .with_detail(keycode)
            .into()
    }

    /// Create a key release event.
    pub fn key_release(device: DeviceId, time: Time, keycode: u32) -> Self {
        DeviceEvent::new(DeviceEventKind::KeyRelease, device, time)
            .with_detail(keycode)
            .into()
    }

    /// Create a button press event.
    pub fn button_press(device: DeviceId, time: Time, button: u32) -> Self {
        DeviceEvent::new(DeviceEventKind::ButtonPress, device, time)
            .with_detail(button)
            .into()
    }

    /// Create a button release event.
    pub fn button_release(device: DeviceId, time: Time, button: u32) -> Self {
        DeviceEvent::new(DeviceEventKind::ButtonRelease, device, time)
            .with_detail(button)
            .into()
    }

    /// Create a touch event. `kind` must be one of the touch kinds.
    pub fn touch(
        kind: DeviceEventKind,
        device: DeviceId,
        time: Time,
        touch_id: u32,
        x: f64,
        y: f64,
    ) -> Self {
        DeviceEvent::new(kind, device, time)
            .with_detail(touch_id)
            .at(x, y)
            .into()
    }

    /// The kind tag.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Device(ev) => match ev.kind {
                DeviceEventKind::Motion => EventKind::Motion,
                DeviceEventKind::KeyPress => EventKind::KeyPress,
                DeviceEventKind::KeyRelease => EventKind::KeyRelease,
                DeviceEventKind::ButtonPress => EventKind::ButtonPress,
                DeviceEventKind::ButtonRelease => EventKind::ButtonRelease,
                DeviceEventKind::ProximityIn => EventKind::ProximityIn,
                DeviceEventKind::ProximityOut => EventKind::ProximityOut,
                DeviceEventKind::TouchBegin => EventKind::TouchBegin,
                DeviceEventKind::TouchUpdate => EventKind::TouchUpdate,
                DeviceEventKind::TouchEnd => EventKind::TouchEnd,
            },
            Event::TouchOwnership(_) => EventKind::TouchOwnership,
            Event::DeviceChanged(_) => EventKind::DeviceChanged,
            Event::Raw(ev) => match ev.kind {
                RawEventKind::KeyPress => EventKind::RawKeyPress,
                RawEventKind::KeyRelease => EventKind::RawKeyRelease,
                RawEventKind::ButtonPress => EventKind::RawButtonPress,
                RawEventKind::ButtonRelease => EventKind::RawButtonRelease,
                RawEventKind::Motion => EventKind::RawMotion,
                RawEventKind::TouchBegin => EventKind::RawTouchBegin,
                RawEventKind::TouchUpdate => EventKind::RawTouchUpdate,
                RawEventKind::TouchEnd => EventKind::RawTouchEnd,
            },
            Event::Barrier(ev) => match ev.kind {
                BarrierEventKind::Hit => EventKind::BarrierHit,
                BarrierEventKind::Leave => EventKind::BarrierLeave,
            },
            Event::Gesture(ev) => match ev.kind {
                GestureEventKind::PinchBegin => EventKind::GesturePinchBegin,
                GestureEventKind::PinchUpdate => EventKind::GesturePinchUpdate,
                GestureEventKind::PinchEnd => EventKind::GesturePinchEnd,
                GestureEventKind::SwipeBegin => EventKind::GestureSwipeBegin,
                GestureEventKind::SwipeUpdate => EventKind::GestureSwipeUpdate,
                GestureEventKind::SwipeEnd => EventKind::GestureSwipeEnd,
            },
            Event::Vendor(_) => EventKind::Vendor,
        }
    }

    /// Size in bytes of the record this event declares.
    pub fn length(&self) -> usize {
        match self {
            Event::Device(_) => mem::size_of::<DeviceEvent>(),
            Event::TouchOwnership(_) => mem::size_of::<TouchOwnershipEvent>(),
            Event::DeviceChanged(_) => mem::size_of::<DeviceChangedEvent>(),
            Event::Raw(_) => mem::size_of::<RawEvent>(),
            Event::Barrier(_) => mem::size_of::<BarrierEvent>(),
            Event::Gesture(_) => mem::size_of::<GestureEvent>(),
            Event::Vendor(ev) => {
                mem::size_of::<VendorEvent>() - VENDOR_PAYLOAD_MAX + ev.data().len()
            }
        }
    }

    /// Event timestamp.
    pub fn time(&self) -> Time {
        match self {
            Event::Device(ev) => ev.time,
            Event::TouchOwnership(ev) => ev.time,
            Event::DeviceChanged(ev) => ev.time,
            Event::Raw(ev) => ev.time,
            Event::Barrier(ev) => ev.time,
            Event::Gesture(ev) => ev.time,
            Event::Vendor(ev) => ev.time,
        }
    }

    /// Overwrite the timestamp.
    pub fn set_time(&mut self, time: Time) {
        match self {
            Event::Device(ev) => ev.time = time,
            Event::TouchOwnership(ev) => ev.time = time,
            Event::DeviceChanged(ev) => ev.time = time,
            Event::Raw(ev) => ev.time = time,
            Event::Barrier(ev) => ev.time = time,
            Event::Gesture(ev) => ev.time = time,
            Event::Vendor(ev) => ev.time = time,
        }
    }

    /// The device the event is addressed to, if the kind carries one.
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            Event::Device(ev) => Some(ev.device_id),
            Event::TouchOwnership(ev) => Some(ev.device_id),
            Event::DeviceChanged(ev) => Some(ev.device_id),
            Event::Raw(ev) => Some(ev.device_id),
            Event::Barrier(ev) => Some(ev.device_id),
            Event::Gesture(ev) => Some(ev.device_id),
            Event::Vendor(_) => None,
        }
    }

    /// Readdress the event to another device.
    ///
    /// Fails with [`Error::NoDeviceField`] for kinds without a device id.
    pub fn set_device_id(&mut self, id: DeviceId) -> Result<()> {
        match self {
            Event::Device(ev) => ev.device_id = id,
            Event::TouchOwnership(ev) => ev.device_id = id,
            Event::DeviceChanged(ev) => ev.device_id = id,
            Event::Raw(ev) => ev.device_id = id,
            Event::Barrier(ev) => ev.device_id = id,
            Event::Gesture(ev) => ev.device_id = id,
            Event::Vendor(_) => return Err(Error::NoDeviceField(EventKind::Vendor)),
        }
        Ok(())
    }

    /// The button number of a button press or release.
    pub fn button(&self) -> Option<u32> {
        match self {
            Event::Device(ev) if self.kind().is_button() => Some(ev.detail),
            _ => None,
        }
    }

    /// Root position of pointer, key, button and touch events.
    pub fn root_position(&self) -> Option<(f64, f64)> {
        match self {
            Event::Device(ev) => Some((ev.root_x, ev.root_y)),
            Event::Barrier(ev) => Some((ev.root_x, ev.root_y)),
            Event::Gesture(ev) => Some((ev.root_x, ev.root_y)),
            _ => None,
        }
    }

    /// Check if this is a plain pointer motion event.
    pub fn is_motion(&self) -> bool {
        self.kind() == EventKind::Motion
    }

    /// Check if this is a touch event that also drives the pointer.
    pub fn is_pointer_emulating_touch(&self) -> bool {
        match self {
            Event::Device(ev) => {
                self.kind().is_touch() && ev.flags & TOUCH_POINTER_EMULATED != 0
            }
            _ => false,
        }
    }

    /// Check if the event carries a position that may move the device to
    /// another screen.
    pub fn is_position_bearing(&self) -> bool {
        let kind = self.kind();
        kind == EventKind::Motion
            || kind.is_key()
            || kind.is_button()
            || self.is_pointer_emulating_touch()
    }

    /// Check if dispatching this event moves the cursor sprite.
    pub fn moves_sprite(&self) -> bool {
        match self.kind() {
            EventKind::Motion => true,
            EventKind::TouchBegin | EventKind::TouchUpdate => self.is_pointer_emulating_touch(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_table_matches_index() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(EventKind::Vendor.index(), EventKind::COUNT - 1);
    }

    #[test]
    fn test_valuators() {
        let mut v = Valuators::new();
        assert!(v.is_empty());
        assert!(v.set(0, 10.0));
        assert!(v.set(35, -1.5));
        assert!(!v.set(MAX_VALUATORS, 1.0));
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(0), Some(10.0));
        assert_eq!(v.get(1), None);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, 10.0), (35, -1.5)]);

        v.unset(0);
        assert_eq!(v.get(0), None);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_vendor_payload_is_bounded() {
        let ev = VendorEvent::new(7, 100, &[1, 2, 3]).unwrap();
        assert_eq!(ev.data(), &[1, 2, 3]);
        assert!(VendorEvent::new(7, 100, &[0; VENDOR_PAYLOAD_MAX + 1]).is_none());

        let short = Event::Vendor(ev);
        let long = Event::Vendor(VendorEvent::new(7, 100, &[0; 10]).unwrap());
        assert_eq!(long.length() - short.length(), 7);
    }

    #[test]
    fn test_set_device_id() {
        let mut ev = Event::button_press(DeviceId(4), 0, 1);
        ev.set_device_id(DeviceId(2)).unwrap();
        assert_eq!(ev.device_id(), Some(DeviceId(2)));
        match ev {
            Event::Device(d) => assert_eq!(d.source_id, DeviceId(4)),
            _ => unreachable!(),
        }

        let mut vendor = Event::Vendor(VendorEvent::new(1, 0, &[]).unwrap());
        assert!(matches!(
            vendor.set_device_id(DeviceId(2)),
            Err(Error::NoDeviceField(EventKind::Vendor))
        ));
    }

    #[test]
    fn test_sprite_and_screen_classification() {
        let motion = Event::motion(DeviceId(2), 0, 1.0, 1.0);
        assert!(motion.moves_sprite());
        assert!(motion.is_position_bearing());

        let key = Event::key_press(DeviceId(3), 0, 38);
        assert!(!key.moves_sprite());
        assert!(key.is_position_bearing());

        let touch = Event::touch(DeviceEventKind::TouchUpdate, DeviceId(5), 0, 1, 0.0, 0.0);
        assert!(!touch.moves_sprite());
        assert!(!touch.is_position_bearing());

        let emulated = match touch {
            Event::Device(d) => Event::Device(d.with_flags(TOUCH_POINTER_EMULATED)),
            _ => unreachable!(),
        };
        assert!(emulated.moves_sprite());
        assert!(emulated.is_position_bearing());

        let end = Event::Device(
            DeviceEvent::new(DeviceEventKind::TouchEnd, DeviceId(5), 0)
                .with_flags(TOUCH_POINTER_EMULATED),
        );
        assert!(!end.moves_sprite());
        assert!(end.is_position_bearing());
    }

    #[test]
    fn test_time_and_button_accessors() {
        let mut ev = Event::key_release(DeviceId(3), 5, 9);
        ev.set_time(42);
        assert_eq!(ev.time(), 42);
        assert_eq!(ev.kind(), EventKind::KeyRelease);
        assert_eq!(ev.button(), None);
        assert_eq!(Event::button_release(DeviceId(3), 0, 2).button(), Some(2));
    }
}
