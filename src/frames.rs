//! Frame pacing for live camera embeddings.
//!
//! Capture loops run faster than analysis. [`AnalysisWorker`] analyzes on
//! its own thread and is fed through a [`FrameSlot`] that holds at most one
//! pending frame: offering while the slot is full drops the new frame
//! instead of blocking the capture loop. [`AnalysisThrottle`] additionally
//! spaces analyses out in time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Outcome of [`FrameSlot::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// A frame was already pending; this one was discarded.
    Dropped,
    /// The worker has stopped.
    Closed,
}

/// Sending half of a capacity-one frame handoff. Cheap to clone.
#[derive(Debug)]
pub struct FrameSlot<F> {
    tx: SyncSender<F>,
    dropped: Arc<AtomicU64>,
}

impl<F> Clone for FrameSlot<F> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }
}

impl<F> FrameSlot<F> {
    /// Hand a frame to the worker without blocking.
    pub fn offer(&self, frame: F) -> Offer {
        match self.tx.try_send(frame) {
            Ok(()) => Offer::Accepted,
            Err(TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(dropped = total, "analysis busy, frame dropped");
                Offer::Dropped
            }
            Err(TrySendError::Disconnected(_)) => Offer::Closed,
        }
    }

    /// Frames discarded so far across all clones of this slot.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A single analysis thread fed with the most recent frame.
pub struct AnalysisWorker<F, R> {
    slot: FrameSlot<F>,
    results: Receiver<R>,
    handle: JoinHandle<()>,
}

impl<F, R> AnalysisWorker<F, R>
where
    F: Send + 'static,
    R: Send + 'static,
{
    /// Start the worker thread. `analyze` runs once per frame taken from
    /// the slot and its output is published on the results channel.
    pub fn spawn<A>(mut analyze: A) -> Self
    where
        A: FnMut(F) -> R + Send + 'static,
    {
        let (frame_tx, frame_rx) = mpsc::sync_channel::<F>(1);
        let (result_tx, results) = mpsc::channel::<R>();

        let handle = thread::spawn(move || {
            debug!("analysis worker started");
            while let Ok(mut frame) = frame_rx.recv() {
                // Skip to the newest frame if more arrived meanwhile.
                while let Ok(newer) = frame_rx.try_recv() {
                    frame = newer;
                }
                if result_tx.send(analyze(frame)).is_err() {
                    break;
                }
            }
            debug!("analysis worker stopped");
        });

        Self {
            slot: FrameSlot {
                tx: frame_tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            results,
            handle,
        }
    }

    pub fn offer(&self, frame: F) -> Offer {
        self.slot.offer(frame)
    }

    /// Another handle on the worker's input, e.g. for a capture thread.
    pub fn slot(&self) -> FrameSlot<F> {
        self.slot.clone()
    }

    pub fn dropped(&self) -> u64 {
        self.slot.dropped()
    }

    /// Latest published result, if any is waiting. Older ones are discarded.
    pub fn latest(&self) -> Option<R> {
        self.results.try_iter().last()
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<R> {
        match self.results.recv_timeout(timeout) {
            Ok(r) => Some(r),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Close the input and wait for the thread to finish its current frame.
    ///
    /// Blocks until every [`FrameSlot`] clone handed out by [`slot`](Self::slot)
    /// has been dropped.
    pub fn shutdown(self) {
        let AnalysisWorker { slot, results, handle } = self;
        drop(slot);
        drop(results);
        if handle.join().is_err() {
            debug!("analysis worker panicked");
        }
    }
}

/// Minimum spacing between analyses.
#[derive(Debug, Clone)]
pub struct AnalysisThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl AnalysisThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether an analysis may start at `now`. A `true` answer counts as
    /// the start of one.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        let due = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }
}

impl Default for AnalysisThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
