//! Trailing-edge debounce for rapidly changing values
//!
//! A worker task holds the latest value and a resettable deadline; every
//! update restarts the quiescence window, and only when the window elapses
//! with no further update is the latest value emitted. Nothing is ever
//! emitted on the leading edge.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::trace;

enum Control<T> {
    Update(T),
    Cancel,
}

/// Debounces a stream of values, emitting the latest one on `output_tx`
/// after `window` of quiescence. At most one emission is pending at a time.
pub struct Debouncer<T> {
    control_tx: mpsc::UnboundedSender<Control<T>>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the worker task. Emitted values are sent on `output_tx`; the
    /// worker stops when the receiving side is closed.
    pub fn spawn(window: Duration, output_tx: mpsc::UnboundedSender<T>) -> Self {
        let (control_tx, mut control_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let timer = sleep(window);
            tokio::pin!(timer);

            loop {
                tokio::select! {
                    control = control_rx.recv() => match control {
                        Some(Control::Update(value)) => {
                            pending = Some(value);
                            timer.as_mut().reset(Instant::now() + window);
                        }
                        Some(Control::Cancel) => {
                            pending = None;
                        }
                        None => break,
                    },
                    _ = timer.as_mut(), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            trace!("debounce window elapsed, emitting stabilized value");
                            if output_tx.send(value).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { control_tx, worker }
    }

    /// Feed a new value, restarting the quiescence window.
    pub fn update(&self, value: T) {
        let _ = self.control_tx.send(Control::Update(value));
    }

    /// Drop any pending value without emitting it.
    pub fn cancel(&self) {
        let _ = self.control_tx.send(Control::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
