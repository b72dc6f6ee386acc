//! Delayed re-enqueue scheduler for the delivery queue.
//!
//! One scheduler task owns a min-heap of delayed jobs. It sleeps until
//! the earliest deadline, or until a new job is scheduled in front of it,
//! then releases every due job back onto the delivery queue. Ready-now
//! jobs never pass through the heap, so their FIFO order is preserved.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::warn;

use crate::queue::DeliveryJob;

struct DelayedJob {
    due: Instant,
    seq: u64,
    job: DeliveryJob,
}

impl PartialEq for DelayedJob {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for DelayedJob {}

impl PartialOrd for DelayedJob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedJob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

pub(crate) struct RetryScheduler {
    heap: Mutex<BinaryHeap<Reverse<DelayedJob>>>,
    notify: Notify,
    seq: AtomicU64,
    output: async_channel::Sender<DeliveryJob>,
}

impl RetryScheduler {
    /// Create a scheduler that releases due jobs onto `output`, and spawn
    /// its timer task. The returned handle aborts the task when the queue
    /// shuts down.
    pub(crate) fn start(
        output: async_channel::Sender<DeliveryJob>,
    ) -> (Arc<Self>, tokio::task::JoinHandle<()>) {
        let scheduler = Arc::new(Self {
            heap: Mutex::new(BinaryHeap::new()),
            notify: Notify::new(),
            seq: AtomicU64::new(0),
            output,
        });
        let task = Arc::clone(&scheduler);
        let handle = tokio::spawn(async move { task.run().await });
        (scheduler, handle)
    }

    /// Schedule a job to be re-enqueued after `delay`.
    pub(crate) fn schedule(&self, delay: Duration, job: DeliveryJob) {
        let entry = DelayedJob {
            due: Instant::now() + delay,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            job,
        };
        self.heap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Reverse(entry));
        self.notify.notify_one();
    }

    async fn run(&self) {
        loop {
            let next_due = self
                .heap
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .peek()
                .map(|entry| entry.0.due);

            match next_due {
                None => self.notify.notified().await,
                Some(due) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(due.into()) => self.release_due(),
                        _ = self.notify.notified() => {}
                    }
                }
            }
        }
    }

    fn release_due(&self) {
        let now = Instant::now();
        let mut due_jobs = Vec::new();
        {
            let mut heap = self.heap.lock().unwrap_or_else(PoisonError::into_inner);
            while heap.peek().is_some_and(|entry| entry.0.due <= now) {
                if let Some(Reverse(entry)) = heap.pop() {
                    due_jobs.push(entry.job);
                }
            }
        }
        for job in due_jobs {
            if self.output.try_send(job).is_err() {
                warn!("delivery queue closed; dropping rescheduled message");
            }
        }
    }
}
