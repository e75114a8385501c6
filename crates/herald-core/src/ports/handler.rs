//! ItemHandler port - per-item domain work driven by the dispatcher.

use std::future::Future;

use async_trait::async_trait;

use crate::error::HeraldError;

/// Handles one item of a batch (e.g. sends one recipient their message).
#[async_trait]
pub trait ItemHandler<T: Send + 'static>: Send + Sync {
    async fn handle(&self, item: T) -> Result<(), HeraldError>;
}

/// Adapter turning an async closure into an `ItemHandler`.
pub struct FnHandler<F> {
    f: F,
}

/// ```ignore
/// let handler = handler_fn(|r: Recipient| async move { notify(r).await });
/// dispatcher.process_batch(recipients, Arc::new(handler), options)?;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { f }
}

#[async_trait]
impl<T, F, Fut> ItemHandler<T> for FnHandler<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HeraldError>> + Send + 'static,
{
    async fn handle(&self, item: T) -> Result<(), HeraldError> {
        (self.f)(item).await
    }
}
