//! Background presence polling
//!
//! One thread per polling run. The coordinator stops a run through its stop
//! signal, which also cuts the current wait short; a presence query already
//! under way runs to completion first. Every event carries the epoch of the
//! run that produced it so the coordinator can drop events that straddle a
//! suspension.

use std::io;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::ports::PresenceProbe;

/// One presence observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceEvent {
    pub epoch: u64,
    pub present: bool,
}

/// Running flag of one polling run, with a wakeup for the waiting thread.
#[derive(Debug)]
struct StopSignal {
    running: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            running: Mutex::new(true),
            wake: Condvar::new(),
        }
    }

    fn is_running(&self) -> bool {
        self.running.lock().map(|running| *running).unwrap_or(false)
    }

    fn stop(&self) {
        if let Ok(mut running) = self.running.lock() {
            *running = false;
        }
        self.wake.notify_all();
    }

    /// Wait one interval. Returns false as soon as the run is stopped.
    fn wait(&self, interval: Duration) -> bool {
        let Ok(running) = self.running.lock() else {
            return false;
        };
        match self
            .wake
            .wait_timeout_while(running, interval, |running| *running)
        {
            Ok((running, _)) => *running,
            Err(_) => false,
        }
    }
}

/// Handle to a running poller thread
#[derive(Debug)]
pub struct PresencePoller {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
    epoch: u64,
}

impl PresencePoller {
    /// Start polling `card` every `interval`, tagging events with `epoch`.
    pub fn spawn<P>(
        card: Arc<P>,
        interval: Duration,
        epoch: u64,
        events: Sender<PresenceEvent>,
    ) -> io::Result<Self>
    where
        P: PresenceProbe + ?Sized + 'static,
    {
        let signal = Arc::new(StopSignal::new());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(format!("presence-poller-{}", epoch))
            .spawn(move || poll_loop(card.as_ref(), interval, epoch, &thread_signal, &events))?;

        debug!(epoch, ?interval, "Presence poller started");
        Ok(Self {
            signal,
            handle: Some(handle),
            epoch,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.signal.is_running()
    }

    /// Ask the thread to stop without waiting for it.
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// Stop and wait for the thread to exit. Returns once any presence query
    /// in flight has finished.
    pub fn stop_and_join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!(epoch = self.epoch, "Presence poller thread panicked");
            }
        }
    }
}

impl Drop for PresencePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop<P>(
    card: &P,
    interval: Duration,
    epoch: u64,
    signal: &StopSignal,
    events: &Sender<PresenceEvent>,
) where
    P: PresenceProbe + ?Sized,
{
    while signal.wait(interval) {
        let present = match card.is_present() {
            Ok(present) => present,
            Err(error) => {
                debug!(epoch, %error, "Presence query failed, reporting absent");
                false
            }
        };

        if events.send(PresenceEvent { epoch, present }).is_err() {
            debug!(epoch, "Presence receiver gone");
            break;
        }
    }
    debug!(epoch, "Presence poller stopped");
}
