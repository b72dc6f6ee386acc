//! Bounded worker pools backed by MPMC channels.

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

/// A fixed set of tasks draining one unbounded FIFO. Jobs submitted while
/// all workers are busy queue up; there are no ordering guarantees
/// between jobs handled by different workers.
pub(crate) struct WorkerPool<T> {
    sender: async_channel::Sender<T>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `workers` tasks running `handler` for every job. Must be
    /// called within a Tokio runtime.
    pub(crate) fn start<F, Fut>(workers: usize, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = async_channel::unbounded::<T>();
        let handler = Arc::new(handler);
        let mut tasks = Vec::with_capacity(workers.max(1));
        for _ in 0..workers.max(1) {
            let receiver = receiver.clone();
            let handler = Arc::clone(&handler);
            tasks.push(tokio::spawn(async move {
                while let Ok(job) = receiver.recv().await {
                    handler(job).await;
                }
            }));
        }
        Self { sender, tasks }
    }

    /// Queue a job for the next free worker.
    pub(crate) fn submit(&self, label: &'static str, job: T) {
        if self.sender.try_send(job).is_err() {
            warn!(pool = label, "worker pool closed, dropping job");
        }
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.sender.close();
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_all_jobs_are_handled() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = {
            let counter = Arc::clone(&counter);
            WorkerPool::start(4, move |n: usize| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(n, Ordering::SeqCst);
                }
            })
        };
        for n in 1..=10 {
            pool.submit("test", n);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 55);
    }

    #[tokio::test]
    async fn test_jobs_run_concurrently() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let pool = {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            WorkerPool::start(4, move |_: ()| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
        };
        for _ in 0..4 {
            pool.submit("test", ());
        }
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(peak.load(Ordering::SeqCst) > 1);
    }
}
