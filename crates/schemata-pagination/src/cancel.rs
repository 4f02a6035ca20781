//! Stage-level cancellation.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use schemata_core::{Error, Result};

/// Run one pipeline stage, aborting with `Error::Cancelled` if `token` fires.
///
/// A token that is already cancelled never starts the stage.
pub async fn run_stage<T, F>(token: &CancellationToken, stage: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        warn!(
            subsystem = "pagination",
            component = "paginator",
            stage,
            "Cancelled before stage started"
        );
        return Err(Error::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            warn!(
                subsystem = "pagination",
                component = "paginator",
                stage,
                "Cancelled during stage"
            );
            Err(Error::Cancelled)
        }
        result = fut => result,
    }
}
