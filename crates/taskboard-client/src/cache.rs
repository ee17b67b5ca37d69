//! Keyed query cache.
//!
//! Each entry remembers the last value fetched for a [`QueryKey`] and whether
//! that value can still be trusted. Reads go through [`QueryCache::fetch`],
//! which only calls the network when the entry is stale or missing. The lock
//! is never held across an `.await`: a fetch registers itself, drops the
//! lock, awaits the network, then re-locks to store the result.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use taskboard_shared::{Task, User};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Every owner.
    Users,
    /// Items belonging to one owner.
    Tasks { user_id: Uuid },
}

impl QueryKey {
    pub fn is_tasks(&self) -> bool {
        matches!(self, Self::Tasks { .. })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Users => write!(f, "users"),
            Self::Tasks { user_id } => write!(f, "tasks:{user_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Users(Vec<User>),
    Tasks(Vec<Task>),
}

impl QueryData {
    fn kind(&self) -> &'static str {
        match self {
            Self::Users(_) => "users",
            Self::Tasks(_) => "tasks",
        }
    }

    pub fn into_users(self, key: QueryKey) -> Result<Vec<User>> {
        match self {
            Self::Users(users) => Ok(users),
            other => Err(ClientError::CacheShape {
                key: key.to_string(),
                found: other.kind(),
            }),
        }
    }

    pub fn into_tasks(self, key: QueryKey) -> Result<Vec<Task>> {
        match self {
            Self::Tasks(tasks) => Ok(tasks),
            other => Err(ClientError::CacheShape {
                key: key.to_string(),
                found: other.kind(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served as-is on the next read.
    Fresh,
    /// Holds data, but the next read re-fetches.
    Stale,
    /// Nothing cached yet.
    Absent,
}

#[derive(Debug)]
struct Entry {
    data: Option<QueryData>,
    stale: bool,
    /// Drawn from the cache-wide counter when the entry is created, set or
    /// invalidated. A fetch only lands if this still matches what it saw.
    generation: u64,
    /// Tickets of the fetches started against this entry.
    in_flight: HashSet<u64>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(generation: u64) -> Self {
        Self {
            data: None,
            stale: false,
            generation,
            in_flight: HashSet::new(),
            fetched_at: None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    /// Never reset, not even by `release` or `clear`, so a generation or
    /// ticket is never reused by a later entry under the same key.
    counter: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

enum Lookup {
    Hit(QueryData),
    Miss { generation: u64, ticket: u64 },
}

/// Cloning yields another handle onto the same cache.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Mutex<Inner>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock only means another thread panicked mid-update; the map
    /// itself is still consistent, so keep going with it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn freshness(&self, key: &QueryKey) -> Freshness {
        match self.lock().entries.get(key) {
            Some(Entry { data: Some(_), stale: false, .. }) => Freshness::Fresh,
            Some(Entry { data: Some(_), .. }) => Freshness::Stale,
            _ => Freshness::Absent,
        }
    }

    /// Last-known value, fresh or not.
    pub fn peek(&self, key: &QueryKey) -> Option<QueryData> {
        self.lock().entries.get(key).and_then(|entry| entry.data.clone())
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.in_flight.is_empty())
    }

    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.lock().entries.get(key).and_then(|entry| entry.fetched_at)
    }

    /// Return the cached value if it is fresh, otherwise run `fetcher` and
    /// store what it returns.
    ///
    /// Prior data stays readable through [`peek`](Self::peek) while the fetch
    /// is outstanding. A failed fetch leaves the entry as it was. An answer
    /// that arrives after the entry was invalidated, overwritten or released
    /// is handed to the caller but not cached.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<QueryData>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<QueryData>>,
    {
        let (generation, ticket) = match self.begin(key) {
            Lookup::Hit(data) => return Ok(data),
            Lookup::Miss { generation, ticket } => (generation, ticket),
        };

        debug!(key = %key, ticket, "Fetching query");
        let result = fetcher().await;
        self.finish(key, generation, ticket, &result);
        result
    }

    fn begin(&self, key: QueryKey) -> Lookup {
        let mut inner = self.lock();
        let Inner { entries, counter } = &mut *inner;
        let entry = entries
            .entry(key)
            .or_insert_with(|| Entry::new(next(counter)));
        if let (Some(data), false) = (&entry.data, entry.stale) {
            return Lookup::Hit(data.clone());
        }
        let ticket = next(counter);
        entry.in_flight.insert(ticket);
        Lookup::Miss {
            generation: entry.generation,
            ticket,
        }
    }

    fn finish(&self, key: QueryKey, generation: u64, ticket: u64, result: &Result<QueryData>) {
        let mut inner = self.lock();
        // Released (and possibly re-created) while the request was out: the
        // answer belongs to an entry that no longer exists.
        let Some(entry) = inner
            .entries
            .get_mut(&key)
            .filter(|entry| entry.in_flight.contains(&ticket))
        else {
            debug!(key = %key, ticket, "Dropping answer for released query");
            return;
        };
        entry.in_flight.remove(&ticket);

        match result {
            Ok(data) if entry.generation == generation => {
                entry.data = Some(data.clone());
                entry.fetched_at = Some(Utc::now());
                entry.stale = false;
            }
            Ok(_) => {
                debug!(key = %key, ticket, "Dropping answer older than the entry");
            }
            Err(e) => {
                debug!(key = %key, error = %e, "Query fetch failed");
                if entry.data.is_none() && entry.in_flight.is_empty() {
                    inner.entries.remove(&key);
                }
            }
        }
    }

    /// Mark one key stale. No-op if nothing is cached under it.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut inner = self.lock();
        let Inner { entries, counter } = &mut *inner;
        if let Some(entry) = entries.get_mut(key) {
            entry.stale = true;
            entry.generation = next(counter);
            debug!(key = %key, "Query invalidated");
        }
    }

    /// Mark every key matching `predicate` stale; returns how many matched.
    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut inner = self.lock();
        let Inner { entries, counter } = &mut *inner;
        let mut count = 0;
        for (key, entry) in entries.iter_mut().filter(|(key, _)| predicate(*key)) {
            entry.stale = true;
            entry.generation = next(counter);
            debug!(key = %key, "Query invalidated");
            count += 1;
        }
        count
    }

    /// Store `data` under `key` as fresh. Fetches already in flight for the
    /// key will not overwrite it.
    pub fn set(&self, key: QueryKey, data: QueryData) {
        let mut inner = self.lock();
        let Inner { entries, counter } = &mut *inner;
        let generation = next(counter);
        let entry = entries.entry(key).or_insert_with(|| Entry::new(generation));
        entry.generation = generation;
        entry.data = Some(data);
        entry.stale = false;
        entry.fetched_at = Some(Utc::now());
    }

    /// Edit the cached value in place without touching its freshness.
    /// Returns false when nothing is cached under `key`.
    pub fn update(&self, key: &QueryKey, edit: impl FnOnce(&mut QueryData)) -> bool {
        match self
            .lock()
            .entries
            .get_mut(key)
            .and_then(|entry| entry.data.as_mut())
        {
            Some(data) => {
                edit(data);
                true
            }
            None => false,
        }
    }

    /// Drop one entry.
    pub fn release(&self, key: &QueryKey) {
        if self.lock().entries.remove(key).is_some() {
            debug!(key = %key, "Query released");
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
