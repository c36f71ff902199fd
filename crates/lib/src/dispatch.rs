//! Execution contexts for snapshot publication.
//!
//! The service never publishes directly: it hands a [`Job`] to a
//! [`Dispatcher`], which decides where and when that job runs. Submission is
//! fire-and-forget, so a service operation may complete before its
//! publication has run.

use tokio::sync::{mpsc, oneshot};

/// A unit of work submitted to a dispatcher.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs inside the execution context observers require.
pub trait Dispatcher: Send + Sync {
    /// Schedule `job` to run. Must not block on the job completing.
    fn run(&self, job: Job);
}

/// Runs every job immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Dispatcher for Inline {
    fn run(&self, job: Job) {
        job();
    }
}

enum Message {
    Job(Job),
    Flush(oneshot::Sender<()>),
}

/// Runs jobs one at a time, in submission order, on a dedicated tokio task.
///
/// Must be created from within a tokio runtime. The worker task exits once
/// every `TaskQueue` handle has been dropped and the queue has drained.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Message>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Job(_) => f.write_str("Job"),
            Message::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl TaskQueue {
    /// Spawn the worker task and return a handle to its queue.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Job(job) => job(),
                    Message::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("dispatch queue closed");
        });
        Self { tx }
    }

    /// Wait until every job submitted before this call has run.
    ///
    /// Returns immediately if the worker has already stopped.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

impl Dispatcher for TaskQueue {
    fn run(&self, job: Job) {
        if self.tx.send(Message::Job(job)).is_err() {
            tracing::warn!("dispatch queue closed; dropping job");
        }
    }
}
