//! Cooperative cancellation for outbound calls

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::errors::RagChatError;
use crate::errors::Result;

/// Run `fut` unless `cancel` fires first.
///
/// An already-cancelled token short-circuits without polling `fut`.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(RagChatError::Cancelled);
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RagChatError::Cancelled),
        result = fut => result,
    }
}
