//! Fixed-size task pool
//!
//! A set of worker threads consuming one shared FIFO queue of zero-argument work
//! items. Used to shard the rows of a single file across threads.
//!
//! ## Semantics
//!
//! - `enqueue` appends to the tail of the queue and wakes one parked worker
//! - Idle workers block on the queue, they never spin
//! - Dropping the pool closes the queue: everything already queued still runs,
//!   then every worker is joined
//! - Each work item runs inside its own panic boundary, so a failing item is logged
//!   and the worker moves on to the next one

use crossbeam_channel::{unbounded, Sender};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{debug, error};

use crate::error::{ProfileError, Result};

type WorkItem = Box<dyn FnOnce() + Send + 'static>;

pub struct TaskPool {
    workers: Vec<thread::JoinHandle<()>>,
    queue: Option<Sender<WorkItem>>,
}

impl TaskPool {
    /// Spawn `thread_count` workers immediately.
    pub fn new(thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(ProfileError::InvalidConfig(
                "Cannot create TaskPool with 0 threads".to_string(),
            ));
        }

        let (queue, tasks) = unbounded::<WorkItem>();

        // Built in place so an early spawn failure still joins the workers started so far.
        let mut pool = Self {
            workers: Vec::with_capacity(thread_count),
            queue: Some(queue),
        };

        for worker_id in 0..thread_count {
            let tasks = tasks.clone();
            let handle = thread::Builder::new()
                .name(format!("region-worker-{}", worker_id))
                .spawn(move || {
                    // Ends once the queue is closed and drained.
                    for work in tasks.iter() {
                        work();
                    }
                })?;
            pool.workers.push(handle);
        }

        debug!("TaskPool started with {} threads", thread_count);
        Ok(pool)
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue `work` behind everything already submitted.
    pub fn enqueue<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guarded: WorkItem = Box::new(move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
                let current = thread::current();
                error!(
                    "Task panicked on {}: {}",
                    current.name().unwrap_or("unnamed"),
                    panic_message(&*payload)
                );
            }
        });

        match &self.queue {
            Some(queue) => {
                if queue.send(guarded).is_err() {
                    error!("TaskPool queue closed, task dropped");
                }
            }
            None => error!("TaskPool already stopped, task dropped"),
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // Closing the queue is the stop signal
        self.queue.take();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("TaskPool worker exited abnormally");
            }
        }
    }
}

impl fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPool")
            .field("thread_count", &self.workers.len())
            .field("stopped", &self.queue.is_none())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
