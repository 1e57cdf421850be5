/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ahash::AHashMap;
use indexmap::IndexMap;
use tokio::sync::watch;

use crate::error::{ResolveError, ResolveLocalError};
use crate::record::ArcCachedRecord;
use crate::stats::ResolverStats;

type QueryState = Option<Result<ArcCachedRecord, ResolveError>>;

/// Multi-waiter cell holding the outcome of one in-flight resolution.
/// Completed exactly once through its [`QueryNotifier`].
pub(crate) struct QueryFuture {
    state: watch::Receiver<QueryState>,
}

impl QueryFuture {
    pub(crate) async fn wait(&self) -> Result<ArcCachedRecord, ResolveError> {
        let mut state = self.state.clone();
        loop {
            if let Some(r) = state.borrow_and_update().clone() {
                return r;
            }
            if state.changed().await.is_err() {
                return Err(ResolveLocalError::NoResolverRunning.into());
            }
        }
    }
}

/// Completion side of a [`QueryFuture`], owned by the task running the
/// query. Dropping it unfinished fails all waiters.
pub(crate) struct QueryNotifier {
    sender: watch::Sender<QueryState>,
}

impl QueryNotifier {
    pub(crate) fn finish(self, result: Result<ArcCachedRecord, ResolveError>) {
        let _ = self.sender.send(Some(result));
    }
}

struct DoingQuery {
    generation: u64,
    future: Arc<QueryFuture>,
}

/// A fresh miss: the caller holds the only notifier and must run the query.
pub(crate) struct QueryOwner {
    pub(crate) domain: Arc<str>,
    pub(crate) generation: u64,
    pub(crate) notifier: QueryNotifier,
    pub(crate) future: Arc<QueryFuture>,
}

pub(crate) enum CacheFetch {
    Cached(ArcCachedRecord),
    Shared(Arc<QueryFuture>),
    Miss(QueryOwner),
    Closed,
}

struct CacheInner {
    cache: IndexMap<Arc<str>, ArcCachedRecord, ahash::RandomState>,
    doing: AHashMap<Arc<str>, DoingQuery>,
    closed: bool,
}

impl CacheInner {
    fn drain(&mut self) {
        for (_, record) in self.cache.drain(..) {
            record.cancel_refresh();
        }
        self.doing.clear();
    }
}

/// Shared resolution cache: completed records plus in-flight queries, with
/// request coalescing. The mutex here is the only cross-context
/// synchronization in the crate and is never held across an await point.
///
/// Every removal path, explicit or by eviction, cancels the removed
/// record's scheduled task before the record is forgotten. An in-flight
/// query whose slot goes away keeps running and answers its waiters, but a
/// generation mismatch at install time makes the cache discard its result.
pub(crate) struct ResolveCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    vanish_after: Option<Duration>,
    generation: AtomicU64,
    stats: Arc<ResolverStats>,
}

impl ResolveCache {
    pub(crate) fn new(
        capacity: usize,
        vanish_after: Option<Duration>,
        stats: Arc<ResolverStats>,
    ) -> Self {
        ResolveCache {
            inner: Mutex::new(CacheInner {
                cache: IndexMap::with_hasher(ahash::RandomState::new()),
                doing: AHashMap::new(),
                closed: false,
            }),
            capacity,
            vanish_after,
            generation: AtomicU64::new(0),
            stats,
        }
    }

    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed)
    }

    fn update_memory_stats(&self, inner: &CacheInner) {
        self.stats.memory.set_cache_capacity(inner.cache.capacity());
        self.stats.memory.set_cache_length(inner.cache.len());
        self.stats.memory.set_doing_capacity(inner.doing.capacity());
        self.stats.memory.set_doing_length(inner.doing.len());
    }

    /// Atomic get-or-create for one domain. At most one in-flight query
    /// slot can exist per key, so concurrent callers coalesce onto the
    /// same future. Records past their expiry point are torn down here and
    /// the call proceeds as a miss.
    pub(crate) fn fetch(&self, domain: &str) -> CacheFetch {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return CacheFetch::Closed;
        }

        let expired = match inner.cache.get(domain) {
            Some(record) => {
                if record.expired(self.vanish_after) {
                    true
                } else {
                    return CacheFetch::Cached(record.clone());
                }
            }
            None => false,
        };
        if expired {
            if let Some(record) = inner.cache.shift_remove(domain) {
                record.cancel_refresh();
            }
        }

        if let Some(doing) = inner.doing.get(domain) {
            return CacheFetch::Shared(doing.future.clone());
        }

        let domain: Arc<str> = Arc::from(domain);
        let generation = self.next_generation();
        let (sender, receiver) = watch::channel(None);
        let future = Arc::new(QueryFuture { state: receiver });
        inner.doing.insert(
            domain.clone(),
            DoingQuery {
                generation,
                future: future.clone(),
            },
        );
        self.update_memory_stats(&inner);
        CacheFetch::Miss(QueryOwner {
            domain,
            generation,
            notifier: QueryNotifier { sender },
            future,
        })
    }

    /// Install the record produced by an initial query. Returns false when
    /// the in-flight slot was invalidated or replaced while the query ran;
    /// the record's scheduled task is canceled in that case and the caller
    /// must treat the result as discarded after answering its waiters.
    pub(crate) fn complete_query(
        &self,
        domain: &Arc<str>,
        doing_generation: u64,
        record: &ArcCachedRecord,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let matched = inner
            .doing
            .get(&**domain)
            .map(|d| d.generation == doing_generation)
            .unwrap_or(false);
        if inner.closed || !matched {
            record.cancel_refresh();
            return false;
        }
        inner.doing.remove(&**domain);
        if let Some(old) = inner.cache.shift_remove(&**domain) {
            old.cancel_refresh();
        }
        inner.cache.insert(domain.clone(), record.clone());
        while inner.cache.len() > self.capacity {
            let Some((_, evicted)) = inner.cache.shift_remove_index(0) else {
                break;
            };
            evicted.cancel_refresh();
        }
        self.update_memory_stats(&inner);
        true
    }

    /// Install a refreshed record in place of its predecessor. The
    /// predecessor's generation is the install guard: a record evicted or
    /// invalidated while its refresh ran is not resurrected.
    pub(crate) fn replace_record(
        &self,
        domain: &Arc<str>,
        old_generation: u64,
        record: &ArcCachedRecord,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let matched = inner
            .cache
            .get(&**domain)
            .map(|r| r.generation() == old_generation)
            .unwrap_or(false);
        if inner.closed || !matched {
            record.cancel_refresh();
            return false;
        }
        // re-insert under an existing key keeps its slot, so capacity
        // eviction stays ordered by first install
        if let Some(old) = inner.cache.insert(domain.clone(), record.clone()) {
            old.cancel_refresh();
        }
        self.update_memory_stats(&inner);
        true
    }

    /// Remove a record only if it is still the installed generation.
    pub(crate) fn remove_record(&self, domain: &str, generation: u64) {
        let mut inner = self.inner.lock().unwrap();
        let matched = inner
            .cache
            .get(domain)
            .map(|r| r.generation() == generation)
            .unwrap_or(false);
        if matched {
            if let Some(record) = inner.cache.shift_remove(domain) {
                record.cancel_refresh();
            }
            self.update_memory_stats(&inner);
        }
    }

    /// Drop an in-flight slot after a failed initial query, so the next
    /// fetch starts clean.
    pub(crate) fn abandon_query(&self, domain: &str, generation: u64) {
        let mut inner = self.inner.lock().unwrap();
        let matched = inner
            .doing
            .get(domain)
            .map(|d| d.generation == generation)
            .unwrap_or(false);
        if matched {
            inner.doing.remove(domain);
            self.update_memory_stats(&inner);
        }
    }

    pub(crate) fn invalidate(&self, domain: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.cache.shift_remove(domain) {
            record.cancel_refresh();
        }
        inner.doing.remove(domain);
        self.update_memory_stats(&inner);
    }

    pub(crate) fn invalidate_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.drain();
        self.update_memory_stats(&inner);
    }

    /// Invalidate everything and refuse further writes. In-flight queries
    /// still answer their waiters; their results are not installed.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        inner.drain();
        self.update_memory_stats(&inner);
    }
}
