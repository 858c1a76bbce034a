//! The event queue: producer-side enqueue and consumer-side drain.
//!
//! Any number of producers call [`EventQueue::enqueue`]; one consumer, the
//! server's main loop, calls [`EventQueue::drain`] once per iteration. All
//! ring mutation happens under a single mutex. The drain loop drops that
//! mutex around every dispatch, so input pipelines may enqueue follow-up
//! events and slow dispatch never stalls producers.
//!
//! # Example
//!
//! ```ignore
//! let queue = EventQueue::new(QueueConfig::default())?;
//!
//! // producer thread
//! queue.enqueue(&pointer, Event::motion(pointer.id(), now, x, y));
//!
//! // main loop
//! loop {
//!     wait_for_something();
//!     queue.drain(&mut server);
//! }
//! ```

use crate::config::QueueConfig;
use crate::device::{Device, DeviceId};
use crate::error::{Error, Result};
use crate::event::{Event, EventKind, Time};
use crate::host::InputHost;
use crate::registry::{DrainObserver, EventHandler, HandlerTable, ObserverList};
use crate::storage::{Entry, Ring};
use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "statistics")]
use crate::statistics::QueueStatistics;

pub(crate) struct QueueState {
    ring: Ring,
    last_event_time: Time,
    /// Device of the last queued event if it was a motion event.
    last_motion: Option<DeviceId>,
    dropped: u64,
    #[cfg(feature = "statistics")]
    pub(crate) stats: QueueStatistics,
}

impl QueueState {
    fn new(config: &QueueConfig) -> Result<Self> {
        Ok(Self {
            ring: Ring::with_capacity(config.initial_capacity)?,
            last_event_time: 0,
            last_motion: None,
            dropped: 0,
            #[cfg(feature = "statistics")]
            stats: QueueStatistics::default(),
        })
    }

    /// Make room for one more event, growing up to the ceiling.
    fn reserve(&mut self, config: &QueueConfig) -> Result<()> {
        if !self.ring.needs_growth() {
            return Ok(());
        }
        let capacity = self.ring.capacity();
        if capacity >= config.max_capacity {
            return Err(Error::QueueOverflow { capacity });
        }
        let new_capacity = capacity.saturating_mul(2).min(config.max_capacity);
        self.ring.grow(new_capacity)?;
        log::debug!(
            "event queue: grew from {} to {} slots",
            capacity,
            new_capacity
        );
        #[cfg(feature = "statistics")]
        {
            self.stats.grown += 1;
        }
        Ok(())
    }

    fn push(&mut self, config: &QueueConfig, device: &Device, mut event: Event) -> Result<()> {
        let is_motion = event.is_motion();
        let coalesce =
            is_motion && self.last_motion == Some(device.id()) && !self.ring.is_empty();

        if !coalesce {
            self.reserve(config)?;
        }

        let time = event.time();
        if time < self.last_event_time
            && self.last_event_time - time < config.clock_skew_tolerance
        {
            event.set_time(self.last_event_time);
            #[cfg(feature = "statistics")]
            {
                self.stats.clamped += 1;
            }
        }
        self.last_event_time = event.time();

        let entry = Entry {
            event,
            screen: device.enqueue_screen(),
            device: device.clone(),
        };
        if coalesce && let Some(last) = self.ring.last_mut() {
            *last = entry;
        } else {
            self.ring.push(entry);
        }
        self.last_motion = is_motion.then(|| device.id());

        #[cfg(feature = "statistics")]
        {
            self.stats.enqueued += 1;
            if coalesce {
                self.stats.coalesced += 1;
            }
            self.stats.peak_len = self.stats.peak_len.max(self.ring.len());
        }
        Ok(())
    }
}

/// What to log for a dropped event, decided under the lock.
#[derive(Debug, PartialEq, Eq)]
enum DropReport {
    First,
    Continuing { last: bool },
    Silent,
}

impl DropReport {
    fn for_count(dropped: u64, config: &QueueConfig) -> Self {
        if dropped == 1 {
            return DropReport::First;
        }
        if dropped % config.drop_report_frequency != 0 {
            return DropReport::Silent;
        }
        let reports = dropped / config.drop_report_frequency;
        if reports > config.drop_report_max {
            return DropReport::Silent;
        }
        DropReport::Continuing {
            last: reports == config.drop_report_max,
        }
    }
}

/// The input event queue.
pub struct EventQueue {
    config: QueueConfig,
    state: Mutex<QueueState>,
    pub(crate) handlers: HandlerTable,
    observers: ObserverList,
    drain_depth: AtomicUsize,
    #[cfg(feature = "tokio")]
    input_ready: tokio::sync::Notify,
}

/// Decrements the drain depth when a drain ends, including by unwinding.
struct DrainGuard<'a>(&'a AtomicUsize);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EventQueue {
    /// Create a queue with `config.initial_capacity` slots.
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;
        let state = QueueState::new(&config)?;
        Ok(Self {
            config,
            state: Mutex::new(state),
            handlers: HandlerTable::new(),
            observers: ObserverList::new(),
            drain_depth: AtomicUsize::new(0),
            #[cfg(feature = "tokio")]
            input_ready: tokio::sync::Notify::new(),
        })
    }

    /// The policy this queue was created with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A producer that panicked mid-enqueue leaves the ring consistent:
        // every mutation is a single slot write followed by an index update.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue an event from `device`.
    ///
    /// Never fails: if the queue is at its ceiling or cannot grow, the event
    /// is dropped and counted, and the overflow is reported to the log.
    pub fn enqueue(&self, device: &Device, event: Event) {
        let overflow = {
            let mut state = self.lock();
            match state.push(&self.config, device, event) {
                Ok(()) => None,
                Err(err) => {
                    state.dropped += 1;
                    #[cfg(feature = "statistics")]
                    {
                        state.stats.dropped += 1;
                    }
                    Some((err, state.dropped))
                }
            }
        };

        match overflow {
            None => {
                #[cfg(feature = "tokio")]
                self.input_ready.notify_one();
            }
            Some((err, dropped)) => self.report_drop(&err, dropped),
        }
    }

    fn report_drop(&self, err: &Error, dropped: u64) {
        match DropReport::for_count(dropped, &self.config) {
            DropReport::First => {
                log::error!(
                    "event queue: {}. Additional events will be discarded until existing events are processed.",
                    err
                );
                log::error!(
                    "event queue: backtrace of the enqueue that overflowed:\n{}",
                    Backtrace::force_capture()
                );
                log::error!(
                    "event queue: the backtrace shows the producer that hit the full queue, which is not necessarily the cause of the stall"
                );
            }
            DropReport::Continuing { last } => {
                log::error!(
                    "event queue: overflow continuing, {} events have been dropped",
                    dropped
                );
                if last {
                    log::error!(
                        "event queue: no further overflow reports until the queue is drained"
                    );
                }
                log::error!("{}", Backtrace::force_capture());
            }
            DropReport::Silent => {}
        }
    }

    /// Dispatch every queued event, then notify drain observers.
    ///
    /// Events enqueued while dispatching are dispatched in the same call.
    /// Returns the number of events dispatched.
    pub fn drain<H: InputHost + ?Sized>(&self, host: &mut H) -> usize {
        let depth = self.drain_depth.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = DrainGuard(&self.drain_depth);
        if depth > 1 {
            log::error!("event queue: {}", Error::ReentrantDrain { depth });
        }

        let mut dispatched = 0;
        let mut state = self.lock();
        if state.dropped > 0 {
            log::error!(
                "event queue: processing resumed after {} dropped events",
                state.dropped
            );
            log::error!(
                "event queue: this may be caused by a misbehaving driver monopolizing the server's resources"
            );
            state.dropped = 0;
        }

        while let Some(entry) = state.ring.pop() {
            drop(state);

            host.activity();
            self.dispatch(host, &entry.device, &entry.event, entry.screen);
            if entry.event.moves_sprite() {
                host.update_sprite(&entry.device);
            }
            dispatched += 1;

            state = self.lock();
            #[cfg(feature = "statistics")]
            {
                state.stats.dispatched += 1;
            }
        }
        drop(state);

        self.observers.notify();
        dispatched
    }

    /// Number of events waiting to be drained.
    pub fn len(&self) -> usize {
        self.lock().ring.len()
    }

    /// Check whether there is no pending input.
    pub fn is_empty(&self) -> bool {
        self.lock().ring.is_empty()
    }

    /// Current number of slots, including the reserved one.
    pub fn capacity(&self) -> usize {
        self.lock().ring.capacity()
    }

    /// Events dropped since the last drain started.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    /// Install a handler that replaces generic dispatch for `kind`, or remove
    /// it with `None`. Returns the previous handler.
    ///
    /// Installing over an existing handler is allowed and logs a warning.
    pub fn set_handler(
        &self,
        kind: EventKind,
        handler: Option<Arc<dyn EventHandler>>,
    ) -> Option<Arc<dyn EventHandler>> {
        self.handlers.set(kind, handler)
    }

    /// Register an observer called after every drain.
    pub fn add_drain_observer(&self, observer: Arc<dyn DrainObserver>) {
        self.observers.add(observer);
    }

    /// Unregister an observer. Returns `false` if it was not registered.
    pub fn remove_drain_observer(&self, observer: &Arc<dyn DrainObserver>) -> bool {
        self.observers.remove(observer)
    }

    /// Discard all queued events and handlers and shrink back to the initial
    /// capacity, as on server regeneration. Drain observers stay registered.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock();
        *state = QueueState::new(&self.config)?;
        drop(state);
        self.handlers.clear();
        Ok(())
    }

    /// Snapshot of the queue counters.
    #[cfg(feature = "statistics")]
    pub fn statistics(&self) -> QueueStatistics {
        self.lock().stats.clone()
    }

    /// Wait until there is input to drain.
    ///
    /// May return spuriously when input that triggered the wakeup was
    /// already drained.
    #[cfg(feature = "tokio")]
    pub async fn wait_for_input(&self) {
        let notified = self.input_ready.notified();
        if !self.is_empty() {
            return;
        }
        notified.await;
    }
}
