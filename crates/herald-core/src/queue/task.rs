//! Queued task: deferred work + the channel that settles the submitter's handle.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::domain::TaskId;
use crate::error::HeraldError;

/// A task owned by the queue.
///
/// Design intent:
/// - Queue owns the task from `add` until it is dequeued.
/// - Exactly one of `run` / `abandon` consumes it, so the handle settles at most once.
#[async_trait]
pub(crate) trait QueuedTask: Send {
    fn id(&self) -> TaskId;

    /// Execute the work, settle the handle, and report the outcome for accounting.
    async fn run(self: Box<Self>) -> Result<(), String>;

    /// Drop the work without running it; the handle observes `reason`.
    fn abandon(self: Box<Self>, reason: HeraldError);
}

pub(crate) struct Deferred<R, F> {
    id: TaskId,
    work: F,
    reply: oneshot::Sender<Result<R, HeraldError>>,
}

impl<R, F> Deferred<R, F> {
    pub(crate) fn new(id: TaskId, work: F) -> (Self, TaskHandle<R>) {
        let (reply, rx) = oneshot::channel();
        (Self { id, work, reply }, TaskHandle { id, rx })
    }
}

#[async_trait]
impl<R, F, Fut> QueuedTask for Deferred<R, F>
where
    R: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, HeraldError>> + Send + 'static,
{
    fn id(&self) -> TaskId {
        self.id
    }

    async fn run(self: Box<Self>) -> Result<(), String> {
        let Deferred { work, reply, .. } = *self;
        let result = work().await;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        };
        // ignore send error: the submitter may have dropped its handle
        let _ = reply.send(result);
        outcome
    }

    fn abandon(self: Box<Self>, reason: HeraldError) {
        let _ = self.reply.send(Err(reason));
    }
}

/// Caller-visible side of a queued task; resolves when the task settles.
///
/// Dropping the handle does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle<R> {
    id: TaskId,
    rx: oneshot::Receiver<Result<R, HeraldError>>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn rejected(id: TaskId, reason: HeraldError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(reason));
        Self { id, rx }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl<R> Future for TaskHandle<R> {
    type Output = Result<R, HeraldError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(HeraldError::Abandoned)))
    }
}
