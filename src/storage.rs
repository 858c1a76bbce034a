//! Circular slot storage backing the event queue.
//!
//! The ring never fills completely: one slot is kept free so that
//! `head == tail` always means empty. Growth swaps in a freshly allocated
//! slot array, so no queued event can alias the old storage.

use crate::device::{Device, ScreenId};
use crate::error::{Error, Result};
use crate::event::Event;
use std::mem;

/// One queued event with its provenance.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub event: Event,
    pub screen: Option<ScreenId>,
    pub device: Device,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<Entry>,
}

#[derive(Debug)]
pub(crate) struct Ring {
    slots: Vec<Slot>,
    head: usize,
    tail: usize,
}

fn allocate(capacity: usize) -> Result<Vec<Slot>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| Error::AllocationFailure {
            requested: capacity,
        })?;
    Ok(slots)
}

impl Ring {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = allocate(capacity)?;
        slots.resize_with(capacity, Slot::default);
        Ok(Self {
            slots,
            head: 0,
            tail: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.tail + self.capacity() - self.head) % self.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Check whether one more push would consume the reserved slot.
    #[inline]
    pub fn needs_growth(&self) -> bool {
        self.len() + 1 == self.capacity()
    }

    /// The most recently pushed, not yet consumed entry.
    pub fn last_mut(&mut self) -> Option<&mut Entry> {
        if self.is_empty() {
            return None;
        }
        let last = (self.tail + self.capacity() - 1) % self.capacity();
        self.slots[last].entry.as_mut()
    }

    /// Append an entry. The caller must have made room with [`Ring::grow`]
    /// when [`Ring::needs_growth`] said so.
    pub fn push(&mut self, entry: Entry) {
        debug_assert!(!self.needs_growth(), "push into a full ring");
        self.slots[self.tail].entry = Some(entry);
        self.tail = (self.tail + 1) % self.capacity();
    }

    /// Take the entry at the head out of its slot.
    pub fn pop(&mut self) -> Option<Entry> {
        if self.is_empty() {
            return None;
        }
        let entry = self.slots[self.head].entry.take();
        self.head = (self.head + 1) % self.capacity();
        entry
    }

    /// Move the live entries into a new array of `new_capacity` slots.
    ///
    /// On failure the ring is left exactly as it was.
    pub fn grow(&mut self, new_capacity: usize) -> Result<()> {
        let current = self.capacity();
        if new_capacity <= current {
            return Err(Error::InvalidCapacity {
                current,
                requested: new_capacity,
            });
        }

        let mut slots = allocate(new_capacity)?;
        let live = self.len();
        for i in 0..live {
            let idx = (self.head + i) % current;
            slots.push(mem::take(&mut self.slots[idx]));
        }
        slots.resize_with(new_capacity, Slot::default);

        self.slots = slots;
        self.head = 0;
        self.tail = live;
        Ok(())
    }

    /// Drop all entries and shrink back to `capacity` slots.
    pub fn reset(&mut self, capacity: usize) -> Result<()> {
        *self = Self::with_capacity(capacity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceId;

    fn entry(device: &Device, time: u64) -> Entry {
        Entry {
            event: Event::key_press(device.id(), time, 38),
            screen: None,
            device: device.clone(),
        }
    }

    fn times(ring: &mut Ring) -> Vec<u64> {
        std::iter::from_fn(|| ring.pop())
            .map(|e| e.event.time())
            .collect()
    }

    #[test]
    fn test_one_slot_reserved() {
        let dev = Device::new(DeviceId(3), "keyboard");
        let mut ring = Ring::with_capacity(4).unwrap();
        for t in 0..3 {
            assert!(!ring.needs_growth());
            ring.push(entry(&dev, t));
        }
        assert_eq!(ring.len(), 3);
        assert!(ring.needs_growth());
    }

    #[test]
    fn test_grow_preserves_order_across_wrap() {
        let dev = Device::new(DeviceId(3), "keyboard");
        let mut ring = Ring::with_capacity(4).unwrap();

        // Advance head so live entries wrap around the end of the array.
        ring.push(entry(&dev, 0));
        ring.push(entry(&dev, 1));
        ring.pop();
        ring.pop();
        for t in 2..5 {
            ring.push(entry(&dev, t));
        }
        assert_eq!(ring.len(), 3);

        ring.grow(8).unwrap();
        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.len(), 3);
        ring.push(entry(&dev, 5));
        assert_eq!(times(&mut ring), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_grow_rejects_shrinking() {
        let mut ring = Ring::with_capacity(8).unwrap();
        assert!(matches!(
            ring.grow(8),
            Err(Error::InvalidCapacity {
                current: 8,
                requested: 8
            })
        ));
        assert_eq!(ring.capacity(), 8);
    }

    #[test]
    fn test_last_mut_only_sees_unconsumed() {
        let dev = Device::new(DeviceId(2), "pointer");
        let mut ring = Ring::with_capacity(4).unwrap();
        assert!(ring.last_mut().is_none());

        ring.push(entry(&dev, 7));
        assert_eq!(ring.last_mut().map(|e| e.event.time()), Some(7));

        ring.pop();
        assert!(ring.last_mut().is_none());
    }

    #[test]
    fn test_reset() {
        let dev = Device::new(DeviceId(2), "pointer");
        let mut ring = Ring::with_capacity(4).unwrap();
        ring.push(entry(&dev, 1));
        ring.grow(16).unwrap();
        ring.reset(4).unwrap();
        assert_eq!(ring.capacity(), 4);
        assert!(ring.is_empty());
    }
}
