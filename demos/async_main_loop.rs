//! Async main loop with Tokio.
//!
//! Run with: cargo run --example async_main_loop --features tokio
//!
//! The main loop sleeps until input arrives instead of polling, and prints
//! every event it dispatches. A background task plays the driver.

use std::sync::Arc;
use std::time::Duration;
use xeq::{Device, DeviceId, Event, EventQueue, InputHost, MasterKind, QueueConfig, ScreenId};

struct Printer;

impl InputHost for Printer {
    fn is_enabled(&self, _device: DeviceId) -> bool {
        true
    }

    fn is_master(&self, _device: DeviceId) -> bool {
        false
    }

    fn master(&self, _device: DeviceId, _kind: MasterKind) -> Option<Device> {
        None
    }

    fn set_last_slave(&mut self, _master: DeviceId, _slave: DeviceId) {}

    fn process_event(&mut self, _queue: &EventQueue, device: &Device, event: &Event) {
        println!("[{:>6}] {}: {:?}", event.time(), device.name(), event.kind());
    }

    fn switch_screen(&mut self, _device: &Device, _screen: ScreenId, _x: f64, _y: f64) {}

    fn update_sprite(&mut self, _device: &Device) {}
}

#[tokio::main]
async fn main() {
    println!("xeq async main loop example");
    println!("===========================\n");

    let queue = Arc::new(EventQueue::new(QueueConfig::default()).expect("Failed to create queue"));
    let keyboard = Device::on_screen(DeviceId(7), "AT keyboard", ScreenId(0));

    let driver = {
        let queue = queue.clone();
        tokio::spawn(async move {
            for (i, code) in [43u32, 26, 46, 46, 32].into_iter().enumerate() {
                let time = (i as u64 + 1) * 120;
                queue.enqueue(&keyboard, Event::key_press(keyboard.id(), time, code));
                queue.enqueue(&keyboard, Event::key_release(keyboard.id(), time + 40, code));
                tokio::time::sleep(Duration::from_millis(120)).await;
            }
        })
    };

    let mut printer = Printer;
    let mut total = 0;
    while total < 10 {
        queue.wait_for_input().await;
        total += queue.drain(&mut printer);
    }

    driver.await.expect("driver task failed");
    println!("\nDispatched {} events.", total);
}
