use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::buffer::Shard;
use crate::error::{Result, UwcError};
use crate::words::{WordSet, tokenize_into};

/// One unit of work for a worker thread.
enum Task {
    /// Tokenize the shard into the worker's own word set.
    Tokenize { shard: Shard },
    /// Absorb a sibling worker's drained set into this worker's own set.
    Absorb(WordSet),
}

/// A worker fault is a programming-contract violation, never a recoverable
/// condition; poisoned locks and dead channels abort the process.
const SLOT_POISONED: &str = "worker word set poisoned";
const KNOWN_POISONED: &str = "shared exclusion set poisoned";
const INBOX_GONE: &str = "worker inbox disconnected";
const BARRIER_GONE: &str = "completion channel disconnected";

/// Fixed set of long-lived worker threads driven by per-worker inboxes.
///
/// Each worker owns a bounded(1) inbox of [`Task`]s and a word-set slot.
/// Dispatching sends one task; the worker executes it to completion (no
/// cancellation mid-unit), drops its shard, and signals the shared
/// completion channel exactly once. The coordinator calls [`await_units`]
/// with the number of units it actually dispatched — "dispatch N, wait for
/// all N" without any spinning.
///
/// A slot is locked by its worker only while running a unit and by the
/// coordinator only after the barrier, so every lock acquisition is
/// uncontended in practice.
///
/// Dropping the pool closes all inboxes and joins every thread; shutdown is
/// observed between units, so no in-flight unit is ever aborted.
///
/// [`await_units`]: WorkerPool::await_units
pub struct WorkerPool {
    inboxes: Vec<Sender<Task>>,
    done_rx: Receiver<()>,
    slots: Vec<Arc<Mutex<WordSet>>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads. `known` is the shared read-only exclusion
    /// set: words already present there are not collected again. It is
    /// read-locked by workers for the duration of each tokenize unit, so the
    /// coordinator may only write it while no unit is in flight.
    pub fn new(workers: usize, known: Arc<RwLock<WordSet>>) -> Result<Self> {
        if workers == 0 {
            return Err(UwcError::Config(
                "worker count must be greater than 0".into(),
            ));
        }

        let (done_tx, done_rx) = bounded(workers);
        let mut inboxes = Vec::with_capacity(workers);
        let mut slots = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let (task_tx, task_rx) = bounded::<Task>(1);
            let slot = Arc::new(Mutex::new(WordSet::new()));
            let worker_slot = Arc::clone(&slot);
            let worker_known = Arc::clone(&known);
            let worker_done = done_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("uwc-worker-{}", id))
                .spawn(move || worker_loop(task_rx, worker_done, worker_slot, worker_known))?;

            inboxes.push(task_tx);
            slots.push(slot);
            handles.push(handle);
        }

        Ok(Self {
            inboxes,
            done_rx,
            slots,
            handles,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.inboxes.len()
    }

    /// Hand a tokenize unit to worker `index`. With `clear` set the worker's
    /// accumulated set is discarded first (immediate strategies reset every
    /// round). An empty shard short-circuits without waking the thread;
    /// the return value says whether a unit was actually dispatched and so
    /// whether it must be counted when awaiting the barrier.
    pub fn dispatch(&self, index: usize, shard: Shard, clear: bool) -> bool {
        if clear {
            self.slots[index].lock().expect(SLOT_POISONED).clear();
        }
        if shard.is_empty() {
            return false;
        }
        self.inboxes[index]
            .send(Task::Tokenize { shard })
            .expect(INBOX_GONE);
        true
    }

    /// Drain worker `from`'s set and hand it to worker `into` to absorb on
    /// its own thread. Counts as one unit toward the barrier.
    pub fn delegate_merge(&self, into: usize, from: usize) {
        let taken = self.slots[from].lock().expect(SLOT_POISONED).take();
        self.inboxes[into].send(Task::Absorb(taken)).expect(INBOX_GONE);
    }

    /// Block until `units` completion signals arrived, one per finished
    /// dispatch/merge unit.
    pub fn await_units(&self, units: usize) {
        for _ in 0..units {
            self.done_rx.recv().expect(BARRIER_GONE);
        }
    }

    /// Drain worker `index`'s accumulated set. Only valid while no unit is
    /// pending for that worker.
    pub fn take_words(&self, index: usize) -> WordSet {
        self.slots[index].lock().expect(SLOT_POISONED).take()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the inboxes is the shutdown request; each worker observes
        // it on its next recv, strictly between units.
        self.inboxes.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    inbox: Receiver<Task>,
    done: Sender<()>,
    slot: Arc<Mutex<WordSet>>,
    known: Arc<RwLock<WordSet>>,
) {
    while let Ok(task) = inbox.recv() {
        match task {
            Task::Tokenize { shard } => {
                {
                    let known = known.read().expect(KNOWN_POISONED);
                    let mut words = slot.lock().expect(SLOT_POISONED);
                    tokenize_into(shard.bytes(), Some(&known), &mut words);
                }
                // The shard must be gone before the coordinator may mutate
                // the buffer again; completion is signaled strictly after.
                drop(shard);
            }
            Task::Absorb(mut incoming) => {
                slot.lock().expect(SLOT_POISONED).merge(&mut incoming);
            }
        }
        done.send(()).expect(BARRIER_GONE);
    }
}
