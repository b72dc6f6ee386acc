//! The fire-and-retry delivery queue.
//!
//! `enqueue` pushes onto an unbounded FIFO drained by a fixed set of
//! worker tasks (spawned lazily on first use). A failed attempt is
//! rescheduled with exponential backoff through the
//! [`RetryScheduler`](crate::scheduler::RetryScheduler); once the attempt
//! budget is exhausted the message is logged and dropped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use uftp_messages::UftpMessage;

use crate::client::ClientInner;
use crate::scheduler::RetryScheduler;

/// Invoked with the response once a queued message has been delivered.
pub type DeliveryCallback = Box<dyn FnOnce(Option<UftpMessage>) + Send + 'static>;

pub(crate) struct DeliveryJob {
    pub(crate) message: UftpMessage,
    pub(crate) callback: Option<DeliveryCallback>,
    pub(crate) attempt: u32,
}

pub(crate) struct DeliveryQueue {
    jobs: async_channel::Sender<DeliveryJob>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl DeliveryQueue {
    /// Spawn the worker pool and the retry scheduler.
    pub(crate) fn start(client: Arc<ClientInner>) -> Self {
        let (sender, receiver) = async_channel::unbounded::<DeliveryJob>();
        let (scheduler, scheduler_task) = RetryScheduler::start(sender.clone());

        let mut tasks = vec![scheduler_task];
        for _ in 0..client.config().num_outgoing_workers.max(1) {
            let client = Arc::clone(&client);
            let receiver = receiver.clone();
            let scheduler = Arc::clone(&scheduler);
            tasks.push(tokio::spawn(async move {
                worker(client, receiver, scheduler).await;
            }));
        }

        Self {
            jobs: sender,
            tasks,
        }
    }

    pub(crate) fn push(&self, message: UftpMessage, callback: DeliveryCallback) {
        let job = DeliveryJob {
            message,
            callback: Some(callback),
            attempt: 1,
        };
        if self.jobs.try_send(job).is_err() {
            warn!("delivery queue closed; dropping message");
        }
    }
}

impl Drop for DeliveryQueue {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn worker(
    client: Arc<ClientInner>,
    receiver: async_channel::Receiver<DeliveryJob>,
    scheduler: Arc<RetryScheduler>,
) {
    while let Ok(mut job) = receiver.recv().await {
        let kind = job.message.kind().name();
        match client.send(job.message.clone()).await {
            Ok(response) => {
                if let Some(callback) = job.callback.take() {
                    let outcome = std::panic::catch_unwind(AssertUnwindSafe(move || {
                        callback(response);
                    }));
                    if outcome.is_err() {
                        error!(kind, "delivery callback panicked");
                    }
                }
            }
            Err(err) => {
                let config = client.config();
                if job.attempt <= config.num_delivery_attempts {
                    let delay = config.exponential_retry_factor
                        * config.exponential_retry_base.powi(job.attempt as i32);
                    let (role, domain) = client.recipient_label();
                    warn!(
                        kind,
                        recipient = %domain,
                        recipient_role = %role,
                        attempt = job.attempt,
                        delay_seconds = delay,
                        error = %err,
                        "delivery failed, will retry"
                    );
                    job.attempt += 1;
                    scheduler.schedule(Duration::from_secs_f64(delay.max(0.0)), job);
                } else {
                    let (role, domain) = client.recipient_label();
                    error!(
                        kind,
                        recipient = %domain,
                        recipient_role = %role,
                        attempts = config.num_delivery_attempts,
                        error = %err,
                        "message could not be delivered, giving up"
                    );
                }
            }
        }
    }
}
