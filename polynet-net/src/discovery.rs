//! Concurrent address discovery across constituent networks.
//!
//! Every constituent is asked in parallel. The first success cancels the
//! shared token so the others can stop early, but the fan-out always waits
//! for every task before returning. The winner is the lowest-indexed
//! constituent that succeeded, not the fastest one, so ownership does not
//! depend on timing.
//!
//! Tasks live in a [`JoinSet`]: dropping the fan-out future aborts every
//! task still running, so no discovery outlives its caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use polynet_types::Addr;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{DiscoveryAttempt, DiscoveryFailure, NetworkError};
use crate::multi::Constituent;

/// Ask every constituent for an address matching `prefix`/`nbits`.
///
/// Returns the index of the selected constituent and the address it found.
/// The fan-out token is a child of `parent`, so cancelling `parent` reaches
/// every constituent. Dropping the returned future cancels the token and
/// aborts the tasks.
pub async fn find_first(
    constituents: &[Constituent],
    prefix: &[u8],
    nbits: usize,
    parent: &CancellationToken,
) -> Result<(usize, Addr), DiscoveryFailure> {
    let cancel = parent.child_token();
    let _guard = cancel.clone().drop_guard();

    debug!(
        prefix = %hex::encode(prefix),
        nbits,
        networks = constituents.len(),
        "starting discovery fan-out"
    );

    let mut tasks = JoinSet::new();
    for (index, constituent) in constituents.iter().enumerate() {
        let network = Arc::clone(&constituent.network);
        let prefix = prefix.to_vec();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let result = AssertUnwindSafe(network.find_addr(&prefix, nbits, &cancel))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(NetworkError::TaskFailed {
                        reason: panic_reason(payload),
                    })
                });
            if result.is_ok() {
                cancel.cancel();
            }
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<Addr, NetworkError>>> =
        constituents.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!(error = %e, "discovery task did not complete"),
        }
    }
    let results: Vec<Result<Addr, NetworkError>> = slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(NetworkError::TaskFailed {
                    reason: "discovery task aborted".to_string(),
                })
            })
        })
        .collect();

    if let Some((index, addr)) = results
        .iter()
        .enumerate()
        .find_map(|(i, result)| result.as_ref().ok().map(|addr| (i, *addr)))
    {
        debug!(network = %constituents[index].name, %addr, "discovery succeeded");
        return Ok((index, addr));
    }

    let attempts = constituents
        .iter()
        .zip(results)
        .filter_map(|(constituent, result)| {
            result.err().map(|error| DiscoveryAttempt {
                network: constituent.name.clone(),
                error,
            })
        })
        .collect();

    Err(DiscoveryFailure {
        prefix: prefix.to_vec(),
        nbits,
        attempts,
    })
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    format!("discovery panicked: {}", message)
}
