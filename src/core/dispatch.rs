//! Per-logger delivery queue
//!
//! Every logger owns one [`Dispatcher`]. An event that passes the level gate
//! takes a [`Ticket`] right away; lines reach the sink in ticket order, however
//! long each caller then spends building its message. Lines that arrive early
//! wait in a reorder buffer until the lines ahead of them have been delivered.
//!
//! In synchronous mode whichever caller closes a gap delivers everything that
//! was waiting behind it. In asynchronous mode rendered lines go through a
//! bounded channel to a dedicated worker thread that does the same. Loggers
//! never share a queue.
//!
//! Nothing is dropped: a full queue blocks the caller until the worker catches
//! up, and there is no delivery timeout.

use super::{
    error::{LoggerError, Result},
    metrics::LoggerMetrics,
    sink::{RenderedLine, Sink},
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default time to wait for the worker when a dispatcher is dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const BATCH_SIZE: usize = 64;

/// A line on its way through the channel, with its ticket number
type Queued = (u64, RenderedLine);

/// Place in a logger's delivery order, taken when an event passes the gate
///
/// Dropping a ticket without submitting a line gives up its place, so a
/// message closure that panics never holds back later lines.
#[must_use = "a ticket holds back every later line until it is submitted or dropped"]
pub struct Ticket {
    seq: u64,
    delivery: Option<Arc<Delivery>>,
}

impl Ticket {
    /// A ticket outside any delivery order, for propagators that keep none
    pub fn unordered() -> Self {
        Self {
            seq: 0,
            delivery: None,
        }
    }

    /// Position in the delivery order, `None` for unordered tickets
    pub fn seq(&self) -> Option<u64> {
        self.delivery.as_ref().map(|_| self.seq)
    }

    fn belongs_to(&self, delivery: &Arc<Delivery>) -> bool {
        self.delivery
            .as_ref()
            .is_some_and(|own| Arc::ptr_eq(own, delivery))
    }

    /// Take the number; the caller now owes the delivery a release for it
    fn redeem(mut self) -> u64 {
        self.delivery = None;
        self.seq
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if let Some(delivery) = self.delivery.take() {
            delivery.release(self.seq, None);
        }
    }
}

impl std::fmt::Debug for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticket").field("seq", &self.seq()).finish()
    }
}

/// Sink plus reorder buffer; only touched under `Delivery::state`
struct Ordered {
    sink: Box<dyn Sink>,
    /// Next ticket allowed to reach the sink
    next: u64,
    /// Early arrivals by ticket; `None` marks a given-up place
    pending: BTreeMap<u64, Option<RenderedLine>>,
}

impl Ordered {
    /// Park `slot` under `seq`, then deliver every line whose turn has come.
    /// Returns how many lines went to the sink.
    fn park(&mut self, seq: u64, slot: Option<RenderedLine>, metrics: &LoggerMetrics) -> usize {
        self.pending.insert(seq, slot);

        let mut delivered = 0;
        while let Some(slot) = self.pending.remove(&self.next) {
            self.next += 1;
            if let Some(line) = slot {
                deliver_one(&mut *self.sink, &line, metrics);
                delivered += 1;
            }
        }
        delivered
    }
}

/// Ticket counter and ordered sink shared by callers and the worker
struct Delivery {
    issued: AtomicU64,
    state: Mutex<Ordered>,
    /// Signalled whenever `Ordered::next` advances
    turn: Condvar,
    metrics: LoggerMetrics,
}

impl Delivery {
    fn issue(self: &Arc<Self>) -> Ticket {
        Ticket {
            seq: self.issued.fetch_add(1, Ordering::SeqCst),
            delivery: Some(Arc::clone(self)),
        }
    }

    fn release(&self, seq: u64, slot: Option<RenderedLine>) {
        let mut state = self.state.lock();
        state.park(seq, slot, &self.metrics);
        drop(state);
        self.turn.notify_all();
    }

    /// Release a worker batch under one lock, then flush once
    fn release_batch(&self, batch: &mut Vec<Queued>) {
        let mut state = self.state.lock();
        let mut delivered = 0;
        for (seq, line) in batch.drain(..) {
            delivered += state.park(seq, Some(line), &self.metrics);
        }

        if delivered > 0 {
            if let Err(e) = flush_one(&mut *state.sink) {
                eprintln!("[LOGGER ERROR] {}", e);
            }
        }
        drop(state);
        self.turn.notify_all();
    }

    /// Block until every ticket below `upto` has been released, then flush
    fn flush_through(&self, upto: u64) -> Result<()> {
        let mut state = self.state.lock();
        while state.next < upto {
            self.turn.wait(&mut state);
        }
        flush_one(&mut *state.sink)
    }
}

struct Queue {
    sender: Sender<Queued>,
    worker: thread::JoinHandle<()>,
    capacity: usize,
}

pub struct Dispatcher {
    delivery: Arc<Delivery>,
    queue: RwLock<Option<Queue>>,
    /// Worker that missed a shutdown deadline and is still draining
    draining: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Dispatcher {
    /// Deliver on the calling threads
    pub fn synchronous(sink: Box<dyn Sink>) -> Self {
        Self {
            delivery: Arc::new(Delivery {
                issued: AtomicU64::new(0),
                state: Mutex::new(Ordered {
                    sink,
                    next: 0,
                    pending: BTreeMap::new(),
                }),
                turn: Condvar::new(),
                metrics: LoggerMetrics::new(),
            }),
            queue: RwLock::new(None),
            draining: Mutex::new(None),
        }
    }

    /// Deliver from a worker thread fed by a queue of `capacity` lines
    ///
    /// Falls back to synchronous delivery if the worker cannot be spawned.
    pub fn asynchronous(sink: Box<dyn Sink>, capacity: usize, worker_name: &str) -> Self {
        let dispatcher = Self::synchronous(sink);
        let (sender, receiver) = bounded(capacity);
        let delivery = Arc::clone(&dispatcher.delivery);

        let spawned = thread::Builder::new()
            .name(worker_name.to_string())
            .spawn(move || Self::run_worker(receiver, delivery));

        match spawned {
            Ok(worker) => {
                *dispatcher.queue.write() = Some(Queue {
                    sender,
                    worker,
                    capacity,
                });
            }
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Could not start delivery worker '{}': {}. \
                     Delivering synchronously.",
                    worker_name, e
                );
            }
        }

        dispatcher
    }

    fn run_worker(receiver: Receiver<Queued>, delivery: Arc<Delivery>) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        // recv fails once every sender is gone and the channel is drained
        while let Ok(queued) = receiver.recv() {
            batch.push(queued);

            while batch.len() < BATCH_SIZE {
                match receiver.try_recv() {
                    Ok(queued) => batch.push(queued),
                    Err(_) => break,
                }
            }

            delivery.release_batch(&mut batch);
        }
    }

    /// Take the next place in delivery order
    ///
    /// Call this as soon as an event passes the gate, before building the
    /// message.
    pub fn reserve(&self) -> Ticket {
        self.delivery.issue()
    }

    /// Hand over the line for `ticket`
    ///
    /// The line reaches the sink once every earlier ticket has been submitted
    /// or dropped. A ticket from another dispatcher is treated as a fresh
    /// reservation.
    pub fn submit(&self, ticket: Ticket, line: RenderedLine) {
        let ticket = if ticket.belongs_to(&self.delivery) {
            ticket
        } else {
            drop(ticket);
            self.reserve()
        };
        let seq = ticket.redeem();
        self.delivery.metrics.record_accepted();

        let guard = self.queue.read();
        let direct = match &*guard {
            Some(queue) => match queue.sender.try_send((seq, line)) {
                Ok(()) => None,
                Err(TrySendError::Full(queued)) => {
                    self.delivery.metrics.record_block();
                    queue.sender.send(queued).err().map(|e| e.into_inner())
                }
                Err(TrySendError::Disconnected(queued)) => Some(queued),
            },
            None => Some((seq, line)),
        };
        drop(guard);

        if let Some((seq, line)) = direct {
            self.delivery.release(seq, Some(line));
        }
    }

    /// Reserve and submit in one step
    pub fn submit_next(&self, line: RenderedLine) {
        let ticket = self.reserve();
        self.submit(ticket, line);
    }

    /// Wait until every line reserved so far has been delivered, then flush the sink
    ///
    /// Must not be called from a message closure of the same logger: the
    /// closure's own ticket is among those being waited for.
    pub fn flush(&self) -> Result<()> {
        let upto = self.delivery.issued.load(Ordering::SeqCst);
        self.delivery.flush_through(upto)
    }

    /// Drain the queue, stop the worker and continue synchronously
    ///
    /// Returns `false` if the worker did not finish within `timeout` or
    /// panicked. A late worker keeps draining; lines logged meanwhile still
    /// wait for the older lines ahead of them, and the next `shutdown` joins
    /// it.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        let worker = match self.queue.write().take() {
            Some(queue) => {
                // closing the channel lets the worker drain and exit
                drop(queue.sender);
                Some(queue.worker)
            }
            None => self.draining.lock().take(),
        };

        if let Some(worker) = worker {
            loop {
                if worker.is_finished() {
                    if let Err(e) = worker.join() {
                        eprintln!(
                            "[LOGGER ERROR] Delivery worker panicked during shutdown: {:?}",
                            e
                        );
                        return false;
                    }
                    break;
                }

                if Instant::now() >= deadline {
                    eprintln!(
                        "[LOGGER WARNING] Delivery worker did not finish within {:?}. \
                         Some lines may be delivered late.",
                        timeout
                    );
                    *self.draining.lock() = Some(worker);
                    return false;
                }

                thread::sleep(Duration::from_millis(5));
            }
        }

        self.flush_after_shutdown()
    }

    fn flush_after_shutdown(&self) -> bool {
        let mut state = self.delivery.state.lock();
        if let Err(e) = flush_one(&mut *state.sink) {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }
        true
    }

    pub fn is_async(&self) -> bool {
        self.queue.read().is_some()
    }

    /// Queue capacity in async mode
    pub fn capacity(&self) -> Option<usize> {
        (*self.queue.read()).as_ref().map(|q| q.capacity)
    }

    pub fn sink_name(&self) -> String {
        self.delivery.state.lock().sink.name().to_string()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.delivery.metrics
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let failed = self.metrics().failed_count();
        if failed > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} failed deliveries (failure rate: {:.2}%)",
                failed,
                self.metrics().failure_rate()
            );
        }
    }
}

/// Hand one line to the sink, containing errors and panics
fn deliver_one(sink: &mut dyn Sink, line: &RenderedLine, metrics: &LoggerMetrics) {
    match catch_unwind(AssertUnwindSafe(|| sink.accept(line))) {
        Ok(Ok(())) => {
            metrics.record_delivered();
        }
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
            metrics.record_failed();
        }
        Err(panic_info) => {
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                 Later lines are still delivered.",
                sink.name(),
                panic_message(panic_info.as_ref())
            );
            metrics.record_failed();
        }
    }
}

fn flush_one(sink: &mut dyn Sink) -> Result<()> {
    match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::sink(
            sink.name(),
            format!("panicked during flush: {}", panic_message(panic_info.as_ref())),
        )),
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
