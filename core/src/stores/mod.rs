//! Domain stores.
//!
//! Every store follows the same contract: an action marks the store busy,
//! talks to the backend, mutates the cache only on success and records a
//! display message on failure. Actions return `Result` and never panic.

mod children;
mod health;
mod pregnancy;
mod user;

pub use children::ChildrenStore;
pub use health::HealthStore;
pub use pregnancy::PregnancyStore;
pub use user::UserStore;

use serde::de::DeserializeOwned;

use crate::cache::{BucketCache, Record, RecordId, RequestState};
use crate::error::ApiError;
use crate::transport::Backend;

/// Run one backend call with busy/error bookkeeping around it.
fn track<T>(
    status: &mut RequestState,
    fallback: &str,
    call: impl FnOnce() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    status.begin();
    let result = call();
    status.finish(&result, fallback);
    result
}

/// Fetch-once for a per-owner bucket: served from cache when loaded,
/// otherwise fetched from `path` and stored under `owner`.
fn fetch_bucket<'a, R>(
    backend: &Backend,
    status: &mut RequestState,
    cache: &'a mut BucketCache<R>,
    owner: RecordId,
    path: &str,
    fallback: &str,
) -> Result<&'a [R], ApiError>
where
    R: Record + Clone + DeserializeOwned,
{
    if cache.is_loaded(owner) {
        return Ok(cache.get(owner));
    }
    cache.begin(owner);
    match track(status, fallback, || backend.get_json::<Vec<R>>(path)) {
        Ok(records) => {
            cache.store(owner, records);
            Ok(cache.get(owner))
        }
        Err(e) => {
            cache.abort(owner);
            Err(e)
        }
    }
}
