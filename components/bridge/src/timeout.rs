//! Wall-clock budget of top-level evaluations.

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use interpreter::InterruptHandle;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Watchdog that interrupts the engine once its budget elapses.
///
/// Dropping the canceller stops the watchdog and waits for its thread.
#[derive(Debug)]
pub struct Canceller {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl Canceller {
    /// Starts watching. `handle` is interrupted after `budget` unless the
    /// canceller is dropped first.
    pub fn start(handle: InterruptHandle, budget: Duration) -> Self {
        let (stop, stopped) = bounded::<()>(0);
        let worker = thread::Builder::new()
            .name("bridge-canceller".to_string())
            .spawn(move || match stopped.recv_timeout(budget) {
                Err(RecvTimeoutError::Timeout) => {
                    debug!(?budget, "evaluation budget exhausted, interrupting");
                    handle.interrupt();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            });
        let worker = match worker {
            Ok(worker) => Some(worker),
            Err(err) => {
                warn!(%err, "could not start canceller, running without a time limit");
                None
            }
        };
        Self {
            stop: Some(stop),
            worker,
        }
    }
}

impl Drop for Canceller {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("canceller thread panicked");
            }
        }
    }
}
