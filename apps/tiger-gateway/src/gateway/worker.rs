//! The single worker thread.
//!
//! Pops tasks in FIFO order and runs them on the [`GatewayCore`] it owns.
//! Schedules its own heartbeat. On stop it drains what was queued at that
//! moment, skipping heartbeats, then releases the broker handles.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, bounded};

use super::core::GatewayCore;
use super::task::{Task, TaskSender};
use crate::error::TaskError;
use crate::observability;

/// Worker timing.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTiming {
    /// Interval between self-scheduled heartbeats.
    pub heartbeat_interval: Duration,
    /// Wait on an empty queue before re-checking the stop flag.
    pub idle_poll: Duration,
}

/// Host-side handle of a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    done: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Ask the worker to drain and exit, waiting at most `timeout`.
    ///
    /// Returns false if the worker was still busy when the wait ran out; the
    /// thread is then left detached.
    pub fn shutdown(mut self, timeout: Duration) -> bool {
        self.stop.store(true, Ordering::SeqCst);

        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(thread) = self.thread.take() {
                    if thread.join().is_err() {
                        tracing::error!("Gateway worker exited by panic");
                    }
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// Returns true once the worker has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

/// Signals completion when dropped, including on unwind.
struct DoneGuard(Sender<()>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let _ = self.0.try_send(());
    }
}

/// Start the worker thread.
pub fn spawn_worker(
    name: &str,
    core: GatewayCore,
    queue: Receiver<Task>,
    tasks: TaskSender,
    timing: WorkerTiming,
) -> io::Result<WorkerHandle> {
    let stop = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = bounded(1);

    let worker_stop = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name(format!("{}-worker", name.to_ascii_lowercase()))
        .spawn(move || {
            let _done = DoneGuard(done_tx);
            run(core, &queue, &tasks, &worker_stop, timing);
        })?;

    Ok(WorkerHandle {
        stop,
        done: done_rx,
        thread: Some(thread),
    })
}

/// Worker loop. Returns after the stop flag is set and the queue drained.
pub fn run(
    mut core: GatewayCore,
    queue: &Receiver<Task>,
    tasks: &TaskSender,
    stop: &AtomicBool,
    timing: WorkerTiming,
) {
    tracing::info!(gateway = core.emitter().gateway_name(), "Gateway worker started");
    let mut next_heartbeat = Instant::now() + timing.heartbeat_interval;

    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= next_heartbeat {
            if tasks.send(Task::Heartbeat).is_err() {
                break;
            }
            next_heartbeat = now + timing.heartbeat_interval;
        }

        match queue.recv_timeout(timing.idle_poll) {
            Ok(task) => {
                execute(&mut core, task);
                observability::set_queue_depth(core.emitter().gateway_name(), queue.len());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let pending = queue.len();
    tracing::info!(pending, "Gateway worker draining");
    for task in queue.try_iter().take(pending) {
        if !task.is_heartbeat() {
            execute(&mut core, task);
        }
    }

    core.teardown();
    tracing::info!(gateway = core.emitter().gateway_name(), "Gateway worker stopped");
}

/// Run one task, containing errors and panics.
pub fn execute(core: &mut GatewayCore, task: Task) {
    let name = task.name();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| core.handle(task)));
    let gateway = core.emitter().gateway_name().to_string();

    match outcome {
        Ok(Ok(())) => {
            tracing::trace!(task = name, "Task complete");
            observability::record_task(&gateway, name, "ok");
        }
        Ok(Err(e)) => {
            observability::record_task(&gateway, name, "error");
            let message = match &e {
                TaskError::Broker { .. } => e.to_string(),
                _ => format!("Task {name} failed: {e}"),
            };
            core.emitter().log_failure(message);
        }
        Err(payload) => {
            observability::record_task(&gateway, name, "panic");
            let error = TaskError::Panicked {
                task: name,
                message: panic_message(payload.as_ref()),
            };
            tracing::error!(task = name, error = %error, "Task panicked");
            core.emitter().log_failure(error.to_string());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
