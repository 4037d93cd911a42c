//! Ticker Actor: Dedicated thread for pacing drive-loop batches.
//!
//! Each tick is the engine's cue to run another batch of decoder steps.
//! Keeping the cadence on its own thread lets the main loop wait on input
//! and ticks together without ever sleeping on the byte stream.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest the ticker sleeps before re-checking its shutdown flag.
const MAX_NAP: Duration = Duration::from_millis(5);

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Tick number, counting every interval elapsed (including dropped ticks).
    pub seq: u64,
    /// Time elapsed since the ticker was started.
    pub elapsed: Duration,
}

/// Ticker actor that generates regular timing events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a new ticker actor with the given interval.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between ticks (e.g., 1ms to drain the stream promptly).
    pub fn spawn(interval: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        // One slot: a slow consumer sees a single pending tick, never a backlog.
        let (tick_tx, tick_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name("blockview-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval.max(Duration::from_micros(100)));
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
        })
    }

    /// Get a reference to the tick receiver.
    ///
    /// Use this with `select!` next to the input channel:
    ///
    /// ```ignore
    /// select! {
    ///     recv(input_rx) -> event => handle_input(event),
    ///     recv(ticker.receiver()) -> _ => { drive.run_batch(budget); }
    /// }
    /// ```
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut seq = 0u64;
        let mut due = start + interval;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < due {
                thread::sleep((due - now).min(MAX_NAP));
                continue;
            }

            let tick = Tick {
                seq,
                elapsed: now - start,
            };
            if let Err(TrySendError::Disconnected(_)) = tick_tx.try_send(tick) {
                break;
            }

            seq += 1;
            due += interval;
            // Fell behind: restart the cadence from now instead of bursting.
            if due < now {
                due = now + interval;
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
