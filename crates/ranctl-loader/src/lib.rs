//! NetStore-style blob loader.
//!
//! Fetches a named object from an HTTP object store and pushes it, as a
//! [`ranctl_types::ControlMessage::DelegateControl`], to every currently
//! connected base station. Mirrors the shape the original NetStore
//! loader app used -- list, check, retrieve, push -- but as a plain
//! async function sequence instead of a tick-driven state machine, and
//! with a per-call buffer rather than the original's process-wide
//! static one.

use ranctl_rib::{send_message, Rib, RibError};
use ranctl_scheduler::{SchedulerError, SchedulerHandle};
use ranctl_types::ControlMessage;

/// Upper bound on a single fetched blob, matching the original loader's
/// fixed transfer buffer size.
pub const MAX_BLOB_BYTES: usize = 10_000_000;

/// Failure modes of a loader operation.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The HTTP request itself failed or returned a non-success status.
    #[error("fetch failed: {0}")]
    Http(String),
    /// The response exceeded [`MAX_BLOB_BYTES`].
    #[error("response of {actual} bytes exceeds the {limit} byte transfer limit")]
    TooLarge {
        /// The configured limit.
        limit: usize,
        /// The response's actual size.
        actual: usize,
    },
    /// The requested id was not present in the store's listing.
    #[error("object {0} is not present in the store listing")]
    NotListed(String),
    /// The scheduler thread could not be reached.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// A RIB operation failed while pushing the blob to a base station.
    #[error(transparent)]
    Rib(#[from] RibError),
}

/// Fetch `url`'s full body, rejecting responses over [`MAX_BLOB_BYTES`].
///
/// # Errors
///
/// Returns [`LoaderError::Http`] if the request fails or the server
/// does not reply with a success status, or [`LoaderError::TooLarge`]
/// if the body exceeds the transfer limit.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, LoaderError> {
    let response =
        client.get(url).send().await.map_err(|e| LoaderError::Http(e.to_string()))?;
    let response =
        response.error_for_status().map_err(|e| LoaderError::Http(e.to_string()))?;
    let bytes = response.bytes().await.map_err(|e| LoaderError::Http(e.to_string()))?;
    if bytes.len() > MAX_BLOB_BYTES {
        return Err(LoaderError::TooLarge { limit: MAX_BLOB_BYTES, actual: bytes.len() });
    }
    Ok(bytes.to_vec())
}

/// Whether a newline-separated store listing names `id`.
pub fn list_contains(listing: &str, id: &str) -> bool {
    listing.lines().any(|line| line == id)
}

/// Push `payload` under `name` to every currently registered base
/// station, skipping (and logging) any that reject the push rather
/// than aborting the whole sweep.
///
/// # Errors
///
/// Returns [`LoaderError::Scheduler`] if the scheduler thread cannot be
/// reached.
pub async fn push_to_all(
    handle: &SchedulerHandle,
    name: String,
    payload: Vec<u8>,
) -> Result<(), LoaderError> {
    handle
        .execute(move |rib, net, _bus| {
            let bs_ids: Vec<_> = rib.available_bs().collect();
            for bs_id in bs_ids {
                if let Err(e) = push_to_one(rib, net, bs_id, &name, &payload) {
                    tracing::warn!(%bs_id, %name, error = %e, "failed to push blob");
                }
            }
        })
        .await?;
    Ok(())
}

/// Push `payload` under `name` to a single base station.
///
/// # Errors
///
/// Returns [`LoaderError::Scheduler`] if the scheduler thread cannot be
/// reached, or [`LoaderError::Rib`] if the push itself is rejected (no
/// such BS, or no connected agent covers the required capability).
pub async fn push_to_bs(
    handle: &SchedulerHandle,
    bs_id: ranctl_types::BsId,
    name: String,
    payload: Vec<u8>,
) -> Result<(), LoaderError> {
    handle
        .execute(move |rib, net, _bus| push_to_one(rib, net, bs_id, &name, &payload))
        .await??;
    Ok(())
}

fn push_to_one(
    rib: &Rib,
    net: &ranctl_net::NetworkInterface,
    bs_id: ranctl_types::BsId,
    name: &str,
    payload: &[u8],
) -> Result<(), RibError> {
    send_message(
        rib,
        net,
        bs_id,
        ControlMessage::DelegateControl { name: name.to_string(), payload: payload.to_vec() },
    )
}

/// List, check, retrieve, and push: the full NetStore sequence for one
/// object id against a store reachable at `base_url` (e.g.
/// `http://localhost:8080`).
///
/// # Errors
///
/// Returns [`LoaderError::Http`]/[`LoaderError::TooLarge`] if either
/// HTTP leg fails, [`LoaderError::NotListed`] if the id is absent from
/// the listing, or [`LoaderError::Scheduler`] if the push cannot reach
/// the scheduler thread.
pub async fn retrieve_and_push(
    client: &reqwest::Client,
    base_url: &str,
    id: &str,
    handle: &SchedulerHandle,
) -> Result<(), LoaderError> {
    let listing = fetch(client, &format!("{base_url}/list")).await?;
    let listing = String::from_utf8_lossy(&listing);
    if !list_contains(&listing, id) {
        return Err(LoaderError::NotListed(id.to_string()));
    }
    let payload = fetch(client, &format!("{base_url}/retrieve/{id}")).await?;
    push_to_all(handle, id.to_string(), payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_contains_matches_whole_lines_only() {
        let listing = "alpha\nbeta\ngamma";
        assert!(list_contains(listing, "beta"));
        assert!(!list_contains(listing, "bet"));
        assert!(!list_contains(listing, "delta"));
    }

    #[test]
    fn list_contains_handles_empty_listing() {
        assert!(!list_contains("", "anything"));
    }
}
