use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard},
    thread::{self, JoinHandle},
};

use log::{trace, warn};
use smol::channel::{self, Receiver, Sender, TrySendError};

use holosync_shared::{PacketSink, SendError, ViewerId};

/// Frames queued per worker before `dispatch` starts rejecting frames
pub const WORKER_QUEUE_CAPACITY: usize = 1024;

enum Job {
    Send(ViewerId, Box<[u8]>),
    Flush(Sender<()>),
}

enum Mode {
    Inline,
    Workers {
        queues: Vec<Sender<Job>>,
        handles: Vec<JoinHandle<()>>,
    },
}

/// Viewers a worker could not deliver to, waiting to be collected
#[derive(Clone, Default)]
struct FailedViewers(Arc<Mutex<BTreeSet<ViewerId>>>);

impl FailedViewers {
    fn lock(&self) -> MutexGuard<'_, BTreeSet<ViewerId>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Hands encoded frames to a [`PacketSink`].
///
/// With no worker threads frames are sent on the caller. Otherwise every
/// viewer is pinned to one worker by id, so frames for a viewer are always
/// delivered in the order they were dispatched.
///
/// Dispatch never blocks on a worker: when a worker's queue is full the
/// frame is rejected and the caller sends it again later.
pub struct PacketDispatcher {
    sink: Arc<dyn PacketSink>,
    mode: Mode,
    failed: FailedViewers,
}

impl PacketDispatcher {
    pub fn new(sink: Arc<dyn PacketSink>, worker_threads: usize) -> Self {
        let failed = FailedViewers::default();
        if worker_threads == 0 {
            return Self {
                sink,
                mode: Mode::Inline,
                failed,
            };
        }

        let mut queues = Vec::with_capacity(worker_threads);
        let mut handles = Vec::with_capacity(worker_threads);
        for index in 0..worker_threads {
            let (sender, receiver) = channel::bounded(WORKER_QUEUE_CAPACITY);
            let worker_sink = sink.clone();
            let worker_failed = failed.clone();
            let spawned = thread::Builder::new()
                .name(format!("holosync-dispatch-{}", index))
                .spawn(move || run_worker(worker_sink, receiver, worker_failed));
            match spawned {
                Ok(handle) => {
                    queues.push(sender);
                    handles.push(handle);
                }
                Err(error) => {
                    warn!("PacketDispatcher: could not start worker {}: {}", index, error);
                }
            }
        }

        if queues.is_empty() {
            warn!("PacketDispatcher: no workers started, sending inline");
            return Self {
                sink,
                mode: Mode::Inline,
                failed,
            };
        }

        Self {
            sink,
            mode: Mode::Workers { queues, handles },
            failed,
        }
    }

    pub fn worker_count(&self) -> usize {
        match &self.mode {
            Mode::Inline => 0,
            Mode::Workers { queues, .. } => queues.len(),
        }
    }

    /// Sends a frame to one viewer. When workers are running, only a failure
    /// to queue is reported here; viewers the worker then fails to deliver to
    /// are collected by [`PacketDispatcher::take_failed`].
    pub fn dispatch(&self, viewer: ViewerId, frame: Box<[u8]>) -> Result<(), SendError> {
        match &self.mode {
            Mode::Inline => self.sink.send(viewer, &frame),
            Mode::Workers { queues, .. } => {
                let length = frame.len();
                let shard = (viewer.get() % queues.len() as u64) as usize;
                let reason = match queues[shard].try_send(Job::Send(viewer, frame)) {
                    Ok(()) => return Ok(()),
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            "PacketDispatcher: queue of worker {} is full, dropping {} bytes to {}",
                            shard, length, viewer
                        );
                        "dispatch queue is full"
                    }
                    Err(TrySendError::Closed(_)) => "dispatch worker has stopped",
                };
                Err(SendError::Rejected {
                    viewer,
                    length,
                    reason: reason.to_string(),
                })
            }
        }
    }

    /// Viewers a worker failed to deliver to since the last call.
    ///
    /// Always empty in inline mode, where `dispatch` returns the failure.
    pub fn take_failed(&self) -> Vec<ViewerId> {
        std::mem::take(&mut *self.failed.lock()).into_iter().collect()
    }

    /// Blocks until every frame dispatched so far has reached the sink
    pub fn flush(&self) {
        let Mode::Workers { queues, .. } = &self.mode else {
            return;
        };
        let mut pending = Vec::with_capacity(queues.len());
        for queue in queues {
            let (done_sender, done_receiver) = channel::bounded(1);
            if queue.send_blocking(Job::Flush(done_sender)).is_ok() {
                pending.push(done_receiver);
            }
        }
        for done in pending {
            let _ = done.recv_blocking();
        }
    }
}

impl Drop for PacketDispatcher {
    fn drop(&mut self) {
        if let Mode::Workers { queues, handles } = &mut self.mode {
            for queue in queues.drain(..) {
                queue.close();
            }
            for handle in handles.drain(..) {
                if handle.join().is_err() {
                    warn!("PacketDispatcher: a dispatch worker panicked");
                }
            }
        }
    }
}

fn run_worker(sink: Arc<dyn PacketSink>, receiver: Receiver<Job>, failed: FailedViewers) {
    while let Ok(job) = receiver.recv_blocking() {
        match job {
            Job::Send(viewer, frame) => {
                trace!("PacketDispatcher: {} bytes to {}", frame.len(), viewer);
                if let Err(error) = sink.send(viewer, &frame) {
                    warn!("PacketDispatcher: {}", error);
                    failed.lock().insert(viewer);
                }
            }
            Job::Flush(done) => {
                let _ = done.try_send(());
            }
        }
    }
}
