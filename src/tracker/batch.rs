use futures::future::join_all;
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

const DEFAULT_BATCH_SIZE: usize = 5;
const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_RETRY_DELAY_MS: u64 = 1500;
const DEFAULT_BATCH_DELAY_MS: u64 = 500;

/// Tuning knobs for the batch scheduler.
#[derive(Debug, Clone)]
pub struct BatchPolicy {
    /// Maximum number of in-flight fetches at any time
    pub batch_size: usize,
    /// Total attempts per fetch, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts of one fetch
    pub retry_delay: Duration,
    /// Courtesy pause between completed batches
    pub batch_delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }
}

/// Fetch every number through `fetch`, in bounded sequential batches.
///
/// Within a batch the calls run concurrently and results are reassembled in
/// the batch's slot order; batch k+1 never starts before batch k (and its
/// inter-batch delay) has completed. Duplicate numbers are fetched
/// redundantly. A fetch that exhausts its retry budget fails the whole
/// operation; there is no partial-success mode.
pub async fn fetch_all<F, Fut, T>(numbers: &[u64], policy: &BatchPolicy, fetch: F) -> Result<Vec<T>>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut results = Vec::with_capacity(numbers.len());
    let batches: Vec<&[u64]> = numbers.chunks(policy.batch_size).collect();
    let total = batches.len();

    for (index, batch) in batches.into_iter().enumerate() {
        debug!("Fetching batch {}/{} ({} items)", index + 1, total, batch.len());

        let calls = batch.iter().map(|&number| with_retry(policy, number, &fetch));
        for result in join_all(calls).await {
            results.push(result?);
        }

        if index + 1 < total {
            tokio::time::sleep(policy.batch_delay).await;
        }
    }

    Ok(results)
}

/// Run one fetch under the policy's bounded fixed-delay retry.
///
/// The last attempt's error is returned as-is once the budget is exhausted.
async fn with_retry<F, Fut, T>(policy: &BatchPolicy, number: u64, fetch: &F) -> Result<T>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match fetch(number).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts => {
                warn!(
                    "Fetch of #{number} failed ({e}), retrying in {}ms ({attempt}/{})",
                    policy.retry_delay.as_millis(),
                    policy.max_attempts
                );
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
