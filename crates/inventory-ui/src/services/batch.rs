//! Batched fetch helper for id sets larger than one request should carry.

use std::future::Future;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::error::BatchError;

/// Largest number of ids sent in one chunk.
pub const BATCH_CHUNK_SIZE: usize = 50;

/// Split `ids` into chunks of at most `chunk_size`, fetch them concurrently and
/// return the per-chunk results in chunk order.
///
/// Any failing chunk fails the whole batch; results of other chunks are dropped.
/// An empty id set returns immediately without calling `fetch`.
///
/// # Errors
/// Returns [`BatchError::Chunk`] naming the first chunk that failed.
pub async fn fetch_batched_inline<T, F, Fut>(
    fetch: F,
    ids: &[String],
    chunk_size: usize,
) -> Result<Vec<T>, BatchError>
where
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let chunk_size = chunk_size.max(1);
    let chunks = ids.len().div_ceil(chunk_size);
    debug!(ids = ids.len(), chunks, chunk_size, "issuing batched fetch");
    let requests = ids.chunks(chunk_size).enumerate().map(|(index, chunk)| {
        let request = fetch(chunk.to_vec());
        async move {
            request.await.map_err(|source| BatchError::Chunk {
                chunk: index + 1,
                chunks,
                source,
            })
        }
    });
    try_join_all(requests).await
}
