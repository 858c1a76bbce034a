//! Test support: an in-memory device hierarchy that records every call.

use crate::device::{Device, DeviceId, MasterKind, ScreenId};
use crate::event::Event;
use crate::host::InputHost;
use crate::queue::EventQueue;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Process { device: DeviceId, event: Event },
    SwitchScreen {
        device: DeviceId,
        screen: ScreenId,
        x: f64,
        y: f64,
    },
    UpdateSprite(DeviceId),
    LastSlave { master: DeviceId, slave: DeviceId },
    Activity,
}

#[derive(Default)]
pub struct Hierarchy {
    /// Master devices, with whether each one is a pointer or a keyboard.
    masters: HashMap<DeviceId, (Device, MasterKind)>,
    /// Master pointer <-> master keyboard.
    pairs: HashMap<DeviceId, Device>,
    /// Slave -> the master it is directly attached to.
    attached: HashMap<DeviceId, DeviceId>,
    disabled: HashSet<DeviceId>,
    last_slave: HashMap<DeviceId, DeviceId>,
    button_maps: HashMap<DeviceId, HashMap<u32, u32>>,
}

impl Hierarchy {
    pub fn disable(&mut self, device: DeviceId) {
        self.disabled.insert(device);
    }

    pub fn detach(&mut self, slave: DeviceId) {
        self.attached.remove(&slave);
    }

    pub fn map_button(&mut self, device: DeviceId, physical: u32, logical: u32) {
        self.button_maps
            .entry(device)
            .or_default()
            .insert(physical, logical);
    }

    pub fn last_slave(&self, master: DeviceId) -> Option<DeviceId> {
        self.last_slave.get(&master).copied()
    }

    fn master(&self, slave: DeviceId, kind: MasterKind) -> Option<Device> {
        let direct = self.attached.get(&slave)?;
        let (device, direct_kind) = self.masters.get(direct)?;
        if kind == MasterKind::Attached || kind == *direct_kind {
            Some(device.clone())
        } else {
            self.pairs.get(direct).cloned()
        }
    }
}

type ProcessHook = Box<dyn FnMut(&mut Hierarchy, &EventQueue, &Device, &Event)>;

pub struct RecordingHost {
    pub hierarchy: Hierarchy,
    pub calls: Vec<Call>,
    hook: Option<ProcessHook>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            hierarchy: Hierarchy::default(),
            calls: Vec::new(),
            hook: None,
        }
    }

    pub fn add_master_pair(&mut self, pointer: DeviceId, keyboard: DeviceId) -> (Device, Device) {
        let ptr = Device::new(pointer, "Virtual core pointer");
        let kbd = Device::new(keyboard, "Virtual core keyboard");
        let h = &mut self.hierarchy;
        h.masters.insert(pointer, (ptr.clone(), MasterKind::Pointer));
        h.masters.insert(keyboard, (kbd.clone(), MasterKind::Keyboard));
        h.pairs.insert(pointer, kbd.clone());
        h.pairs.insert(keyboard, ptr.clone());
        (ptr, kbd)
    }

    pub fn add_slave(&mut self, id: DeviceId, name: &str, master: &Device) -> Device {
        self.hierarchy.attached.insert(id, master.id());
        Device::new(id, name)
    }

    pub fn add_floating(&mut self, id: DeviceId, name: &str) -> Device {
        Device::new(id, name)
    }

    /// Run `hook` after recording every `process_event` call.
    pub fn on_process<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Hierarchy, &EventQueue, &Device, &Event) + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    /// Every event that reached an input pipeline, with its device.
    pub fn processed(&self) -> Vec<(DeviceId, Event)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Process { device, event } => Some((*device, *event)),
                _ => None,
            })
            .collect()
    }
}

impl InputHost for RecordingHost {
    fn is_enabled(&self, device: DeviceId) -> bool {
        !self.hierarchy.disabled.contains(&device)
    }

    fn is_master(&self, device: DeviceId) -> bool {
        self.hierarchy.masters.contains_key(&device)
    }

    fn master(&self, device: DeviceId, kind: MasterKind) -> Option<Device> {
        self.hierarchy.master(device, kind)
    }

    fn map_button(&self, device: DeviceId, button: u32) -> u32 {
        self.hierarchy
            .button_maps
            .get(&device)
            .and_then(|map| map.get(&button))
            .copied()
            .unwrap_or(button)
    }

    fn set_last_slave(&mut self, master: DeviceId, slave: DeviceId) {
        self.hierarchy.last_slave.insert(master, slave);
        self.calls.push(Call::LastSlave { master, slave });
    }

    fn process_event(&mut self, queue: &EventQueue, device: &Device, event: &Event) {
        self.calls.push(Call::Process {
            device: device.id(),
            event: *event,
        });
        if let Some(hook) = self.hook.as_mut() {
            hook(&mut self.hierarchy, queue, device, event);
        }
    }

    fn switch_screen(&mut self, device: &Device, screen: ScreenId, x: f64, y: f64) {
        self.calls.push(Call::SwitchScreen {
            device: device.id(),
            screen,
            x,
            y,
        });
    }

    fn update_sprite(&mut self, device: &Device) {
        self.calls.push(Call::UpdateSprite(device.id()));
    }

    fn activity(&mut self) {
        self.calls.push(Call::Activity);
    }
}
