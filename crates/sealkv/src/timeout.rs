//! Optional per-call deadline for vault, cipher, and map calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, StoreError};

pub(crate) async fn bounded<F: Future>(
    limit: Option<Duration>,
    operation: &'static str,
    fut: F,
) -> Result<F::Output> {
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| StoreError::Timeout { operation, after }),
        None => Ok(fut.await),
    }
}
