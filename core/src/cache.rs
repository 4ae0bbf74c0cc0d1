//! In-memory caches shared by every store.
//!
//! # Design
//! - `Collection` is an ordered list that is unique by id. Updates replace in
//!   place so positions are stable; pushes of an id already present replace
//!   rather than duplicate.
//! - `BucketCache` maps an owner id (child, pregnancy) to that owner's
//!   records. Each bucket carries an explicit `FetchStatus`, so "never
//!   fetched" and "fetched, empty" are distinct states and a bucket can be
//!   invalidated without losing the difference.
//! - `RequestState` is the busy flag plus last error shown by the UI.

use std::collections::{BTreeMap, HashMap};

/// Backend primary keys are integers.
pub type RecordId = i64;

/// Anything stored in a cache is addressed by its id.
pub trait Record {
    fn id(&self) -> RecordId;
}

/// Ordered records, unique by id.
#[derive(Debug, Clone)]
pub struct Collection<R> {
    items: Vec<R>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: Record> Collection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a fresh server listing.
    pub fn replace_all(&mut self, items: Vec<R>) {
        self.items = Vec::with_capacity(items.len());
        for item in items {
            self.push(item);
        }
    }

    /// Append `item`, or replace the record with the same id in place.
    pub fn push(&mut self, item: R) {
        self.upsert(item);
    }

    /// `push`, returning the stored record.
    pub fn upsert(&mut self, item: R) -> &R {
        let index = match self.position(item.id()) {
            Some(index) => {
                self.items[index] = item;
                index
            }
            None => {
                self.items.push(item);
                self.items.len() - 1
            }
        };
        &self.items[index]
    }

    /// Replace the record `id` in place. Returns false when it isn't cached.
    pub fn replace(&mut self, id: RecordId, item: &R) -> bool
    where
        R: Clone,
    {
        match self.position(id) {
            Some(index) => {
                self.items[index] = item.clone();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: RecordId) -> Option<R> {
        self.position(id).map(|index| self.items.remove(index))
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut R> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, R> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Where a bucket stands with respect to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    NotFetched,
    Loading,
    Loaded,
}

#[derive(Debug, Clone)]
struct Bucket<R> {
    status: FetchStatus,
    records: Collection<R>,
}

impl<R> Bucket<R> {
    fn new(status: FetchStatus) -> Self {
        Self {
            status,
            records: Collection::default(),
        }
    }
}

/// Per-owner record lists with explicit fetch status.
#[derive(Debug, Clone)]
pub struct BucketCache<R> {
    buckets: HashMap<RecordId, Bucket<R>>,
}

impl<R> Default for BucketCache<R> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<R: Record + Clone> BucketCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, owner: RecordId) -> FetchStatus {
        self.buckets
            .get(&owner)
            .map_or(FetchStatus::NotFetched, |bucket| bucket.status)
    }

    pub fn is_loaded(&self, owner: RecordId) -> bool {
        self.status(owner) == FetchStatus::Loaded
    }

    /// Whether anything is held for `owner`, fetched or not.
    pub fn contains(&self, owner: RecordId) -> bool {
        self.buckets.contains_key(&owner)
    }

    /// Records for `owner`; empty when nothing is cached.
    pub fn get(&self, owner: RecordId) -> &[R] {
        self.buckets
            .get(&owner)
            .map_or(&[], |bucket| bucket.records.as_slice())
    }

    pub fn find(&self, owner: RecordId, id: RecordId) -> Option<&R> {
        self.buckets.get(&owner)?.records.get(id)
    }

    /// Mark a fetch for `owner` as in flight.
    pub fn begin(&mut self, owner: RecordId) {
        self.buckets
            .entry(owner)
            .or_insert_with(|| Bucket::new(FetchStatus::NotFetched))
            .status = FetchStatus::Loading;
    }

    /// A fetch for `owner` failed. Locally created records survive; an
    /// otherwise empty bucket is dropped so absence again means "not fetched".
    pub fn abort(&mut self, owner: RecordId) {
        if let Some(bucket) = self.buckets.get_mut(&owner) {
            if bucket.records.is_empty() {
                self.buckets.remove(&owner);
            } else {
                bucket.status = FetchStatus::NotFetched;
            }
        }
    }

    /// Store a full server listing for `owner`.
    pub fn store(&mut self, owner: RecordId, records: Vec<R>) {
        let bucket = self
            .buckets
            .entry(owner)
            .or_insert_with(|| Bucket::new(FetchStatus::Loaded));
        bucket.records.replace_all(records);
        bucket.status = FetchStatus::Loaded;
    }

    /// Append a freshly created record, creating the bucket if absent.
    ///
    /// A bucket created here stays `NotFetched`: it holds only what this
    /// session created, not the server listing.
    pub fn push(&mut self, owner: RecordId, record: R) -> &R {
        self.buckets
            .entry(owner)
            .or_insert_with(|| Bucket::new(FetchStatus::NotFetched))
            .records
            .upsert(record)
    }

    /// Replace record `id` inside `owner`'s bucket, keeping its position.
    pub fn replace(&mut self, owner: RecordId, id: RecordId, record: &R) -> bool {
        self.buckets
            .get_mut(&owner)
            .is_some_and(|bucket| bucket.records.replace(id, record))
    }

    /// Apply a server-confirmed update to `owner`'s bucket. The cached record
    /// is replaced in place; one missing from a loaded bucket is appended.
    /// A bucket that was never fetched is never created here.
    pub fn apply_update(&mut self, owner: RecordId, record: &R) -> bool {
        let Some(bucket) = self.buckets.get_mut(&owner) else {
            return false;
        };
        if bucket.records.replace(record.id(), record) {
            return true;
        }
        if bucket.status == FetchStatus::Loaded {
            bucket.records.push(record.clone());
            return true;
        }
        false
    }

    /// Replace record `id` in whichever bucket holds it.
    pub fn replace_anywhere(&mut self, id: RecordId, record: &R) -> Option<RecordId> {
        self.buckets
            .iter_mut()
            .find_map(|(owner, bucket)| bucket.records.replace(id, record).then_some(*owner))
    }

    pub fn remove(&mut self, owner: RecordId, id: RecordId) -> Option<R> {
        self.buckets.get_mut(&owner)?.records.remove(id)
    }

    /// Remove record `id` from whichever bucket holds it.
    pub fn remove_anywhere(&mut self, id: RecordId) -> Option<R> {
        self.buckets
            .values_mut()
            .find_map(|bucket| bucket.records.remove(id))
    }

    /// Drop everything held for `owner`.
    pub fn remove_bucket(&mut self, owner: RecordId) {
        self.buckets.remove(&owner);
    }

    /// Forget `owner` so the next fetch goes to the backend.
    pub fn invalidate(&mut self, owner: RecordId) {
        self.remove_bucket(owner);
    }

    pub fn owners(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.buckets.keys().copied()
    }

    /// Every cached record: owners ascending, then insertion order.
    pub fn iter_all(&self) -> impl Iterator<Item = &R> + '_ {
        let ordered: BTreeMap<RecordId, &Bucket<R>> =
            self.buckets.iter().map(|(owner, bucket)| (*owner, bucket)).collect();
        ordered.into_values().flat_map(|bucket| bucket.records.iter())
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

/// Busy flag and last error for one store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub busy: bool,
    pub error: Option<String>,
}

impl RequestState {
    /// Entering an action: busy, previous error cleared.
    pub fn begin(&mut self) {
        self.busy = true;
        self.error = None;
    }

    /// Leaving an action, successfully or not.
    pub fn finish<T>(&mut self, result: &Result<T, crate::error::ApiError>, fallback: &str) {
        self.busy = false;
        if let Err(err) = result {
            let message = err.user_message(fallback);
            tracing::warn!(error = %err, %message, "store action failed");
            self.error = Some(message);
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
