//! Threaded producers feeding a main loop.
//!
//! Run with: cargo run --example producers
//!
//! Two driver threads generate pointer motion and key presses as fast as
//! they can while the main loop drains the queue ten times a second. Watch
//! motion coalescing keep the queue small. Press Ctrl+C to exit.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use xeq::{Device, DeviceId, Event, EventQueue, InputHost, MasterKind, QueueConfig, ScreenId};

/// A minimal server: one master pair with a mouse and a keyboard attached.
struct Server {
    pointer: Device,
    keyboard: Device,
    delivered: HashMap<DeviceId, u64>,
}

impl InputHost for Server {
    fn is_enabled(&self, _device: DeviceId) -> bool {
        true
    }

    fn is_master(&self, device: DeviceId) -> bool {
        device == self.pointer.id() || device == self.keyboard.id()
    }

    fn master(&self, device: DeviceId, kind: MasterKind) -> Option<Device> {
        if self.is_master(device) {
            return None;
        }
        match kind {
            MasterKind::Keyboard => Some(self.keyboard.clone()),
            MasterKind::Pointer | MasterKind::Attached => Some(self.pointer.clone()),
        }
    }

    fn set_last_slave(&mut self, _master: DeviceId, _slave: DeviceId) {}

    fn process_event(&mut self, _queue: &EventQueue, device: &Device, _event: &Event) {
        *self.delivered.entry(device.id()).or_insert(0) += 1;
    }

    fn switch_screen(&mut self, device: &Device, screen: ScreenId, x: f64, y: f64) {
        println!("{} crossed to screen {} at ({:.0}, {:.0})", device.name(), screen, x, y);
    }

    fn update_sprite(&mut self, _device: &Device) {}
}

fn main() {
    println!("xeq producers example");
    println!("=====================\n");
    println!("Press Ctrl+C to exit.\n");

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .expect("Failed to set Ctrl+C handler");
    }

    let queue = Arc::new(
        EventQueue::new(QueueConfig::default().with_initial_capacity(64))
            .expect("Failed to create queue"),
    );
    let start = Instant::now();
    let now = move || start.elapsed().as_millis() as u64;

    let mouse = Device::on_screen(DeviceId(6), "USB mouse", ScreenId(0));
    let keyboard = Device::on_screen(DeviceId(7), "AT keyboard", ScreenId(0));

    let mouse_thread = {
        let (queue, running, mouse) = (queue.clone(), running.clone(), mouse.clone());
        thread::spawn(move || {
            let mut x = 0.0;
            while running.load(Ordering::SeqCst) {
                x = (x + 1.0) % 3840.0;
                // Cross into the second screen halfway across.
                mouse.switch_screen(ScreenId(if x < 1920.0 { 0 } else { 1 }), false);
                queue.enqueue(&mouse, Event::motion(mouse.id(), now(), x, 540.0));
                thread::sleep(Duration::from_micros(200));
            }
        })
    };

    let keyboard_thread = {
        let (queue, running, keyboard) = (queue.clone(), running.clone(), keyboard.clone());
        thread::spawn(move || {
            let mut code = 9;
            while running.load(Ordering::SeqCst) {
                queue.enqueue(&keyboard, Event::key_press(keyboard.id(), now(), code));
                queue.enqueue(&keyboard, Event::key_release(keyboard.id(), now(), code));
                code = if code >= 96 { 9 } else { code + 1 };
                thread::sleep(Duration::from_millis(50));
            }
        })
    };

    let mut server = Server {
        pointer: Device::on_screen(DeviceId(2), "Virtual core pointer", ScreenId(0)),
        keyboard: Device::on_screen(DeviceId(3), "Virtual core keyboard", ScreenId(0)),
        delivered: HashMap::new(),
    };

    let mut passes = 0u64;
    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
        let pending = queue.len();
        let dispatched = queue.drain(&mut server);
        passes += 1;
        if passes % 10 == 0 {
            println!(
                "[{}] pending {} dispatched {} (capacity {})",
                passes,
                pending,
                dispatched,
                queue.capacity()
            );
        }
    }

    let _ = mouse_thread.join();
    let _ = keyboard_thread.join();
    queue.drain(&mut server);

    println!("\nDelivered per device:");
    let mut delivered: Vec<_> = server.delivered.into_iter().collect();
    delivered.sort();
    for (device, count) in delivered {
        println!("  device {}: {}", device, count);
    }
}
