use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::io::storage::{Storage, StorageError};
use crate::model::snapshot::SnapshotPatch;

/// Debounced writer: schedules coalesce into one pending patch, and the
/// save fires once the quiet period elapses without another schedule.
///
/// Dropping the saver flushes whatever is still pending.
pub struct AutoSaver {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    storage: Arc<Storage>,
    delay: Duration,
    state: Mutex<State>,
    wake: Condvar,
    /// Serializes every `storage.save`, worker and flush alike. Held from
    /// before the pending patch is taken until the write completes, so a
    /// background save can never land after a newer flushed one.
    save_gate: Mutex<()>,
}

#[derive(Default)]
struct State {
    pending: Option<SnapshotPatch>,
    deadline: Option<Instant>,
    shutdown: bool,
}

impl AutoSaver {
    pub fn new(storage: Arc<Storage>, delay: Duration) -> Self {
        let shared = Arc::new(Shared {
            storage,
            delay,
            state: Mutex::new(State::default()),
            wake: Condvar::new(),
            save_gate: Mutex::new(()),
        });
        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("sprig-autosave".to_string())
                .spawn(move || shared.run())
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("warning: could not start auto-save worker: {}", e);
                None
            }
        };
        AutoSaver {
            shared,
            worker,
        }
    }

    /// Queue a patch and restart the quiet-period timer. A patch scheduled
    /// while one is already pending merges into it, later fields winning.
    pub fn schedule(&self, patch: SnapshotPatch) {
        let mut state = self.shared.state.lock().unwrap();
        match state.pending.as_mut() {
            Some(pending) => pending.merge(patch),
            None => state.pending = Some(patch),
        }
        state.deadline = Some(Instant::now() + self.shared.delay);
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Write any pending patch immediately, bypassing the timer. Unlike the
    /// background save this surfaces the write error to the caller.
    pub fn flush(&self) -> Result<(), StorageError> {
        // Taking the gate first orders this write after any background save
        // already in flight
        let _gate = self.shared.save_gate.lock().unwrap();
        let pending = {
            let mut state = self.shared.state.lock().unwrap();
            state.deadline = None;
            state.pending.take()
        };
        match pending {
            Some(patch) => self.shared.storage.save(patch).map(|_| ()),
            None => Ok(()),
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.shutdown = true;
        }
        self.shared.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                eprintln!("warning: auto-save worker panicked");
            }
        }
    }
}

impl Shared {
    fn run(&self) {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.shutdown {
                break;
            }
            match state.deadline {
                None => {
                    state = self.wake.wait(state).unwrap();
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now < deadline {
                        let (next, _) = self
                            .wake
                            .wait_timeout(state, deadline - now)
                            .unwrap();
                        state = next;
                        continue;
                    }
                    // Quiet period elapsed. Take the patch under the gate,
                    // outside the state lock, so schedule() never blocks on
                    // a slow disk and a concurrent flush cannot interleave
                    // with this save
                    drop(state);
                    let gate = self.save_gate.lock().unwrap();
                    let patch = {
                        let mut st = self.state.lock().unwrap();
                        // A schedule that arrived while waiting for the gate
                        // restarts the quiet period
                        if st.deadline.is_some_and(|d| Instant::now() < d) {
                            None
                        } else {
                            st.deadline = None;
                            st.pending.take()
                        }
                    };
                    if let Some(patch) = patch {
                        if let Err(e) = self.storage.save(patch) {
                            eprintln!("warning: auto-save failed: {}", e);
                        }
                    }
                    drop(gate);
                    state = self.state.lock().unwrap();
                }
            }
        }
        // Flush whatever a shutdown interrupted
        drop(state);
        let _gate = self.save_gate.lock().unwrap();
        let patch = self.state.lock().unwrap().pending.take();
        if let Some(patch) = patch {
            if let Err(e) = self.storage.save(patch) {
                eprintln!("warning: final auto-save failed: {}", e);
            }
        }
    }
}
