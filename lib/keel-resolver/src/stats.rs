/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::{ResolveDriverError, ResolveError, ResolveServerError};

#[derive(Default)]
pub struct ResolverQueryStats {
    query_total: AtomicU64,
    query_cached: AtomicU64,
    query_shared: AtomicU64,
    query_driver: AtomicU64,
    driver_timeout: AtomicU64,
    driver_error: AtomicU64,
    server_not_found: AtomicU64,
    server_error: AtomicU64,
}

#[derive(Default)]
pub struct ResolverQuerySnapshot {
    pub total: u64,
    pub cached: u64,
    pub shared: u64,
    pub driver: u64,
    pub driver_timeout: u64,
    pub driver_error: u64,
    pub server_not_found: u64,
    pub server_error: u64,
}

impl ResolverQueryStats {
    fn snapshot(&self) -> ResolverQuerySnapshot {
        ResolverQuerySnapshot {
            total: self.query_total.load(Ordering::Relaxed),
            cached: self.query_cached.load(Ordering::Relaxed),
            shared: self.query_shared.load(Ordering::Relaxed),
            driver: self.query_driver.load(Ordering::Relaxed),
            driver_timeout: self.driver_timeout.load(Ordering::Relaxed),
            driver_error: self.driver_error.load(Ordering::Relaxed),
            server_not_found: self.server_not_found.load(Ordering::Relaxed),
            server_error: self.server_error.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add_query_total(&self) {
        self.query_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_cached(&self) {
        self.query_cached.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_shared(&self) {
        self.query_shared.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_driver(&self) {
        self.query_driver.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn add_driver_timeout(&self) {
        self.driver_timeout.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn add_driver_error(&self) {
        self.driver_error.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn add_server_not_found(&self) {
        self.server_not_found.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn add_server_error(&self) {
        self.server_error.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_error(&self, e: &ResolveError) {
        match e {
            ResolveError::FromServer(ResolveServerError::NotFound) => self.add_server_not_found(),
            ResolveError::FromServer(_) => self.add_server_error(),
            ResolveError::FromDriver(ResolveDriverError::Timeout) => self.add_driver_timeout(),
            ResolveError::FromDriver(_) => self.add_driver_error(),
            _ => {}
        }
    }
}

#[derive(Default)]
pub struct ResolverRefreshStats {
    refresh_ok: AtomicU64,
    refresh_retry: AtomicU64,
    refresh_abandoned: AtomicU64,
}

#[derive(Default)]
pub struct ResolverRefreshSnapshot {
    pub ok: u64,
    pub retry: u64,
    pub abandoned: u64,
}

impl ResolverRefreshStats {
    fn snapshot(&self) -> ResolverRefreshSnapshot {
        ResolverRefreshSnapshot {
            ok: self.refresh_ok.load(Ordering::Relaxed),
            retry: self.refresh_retry.load(Ordering::Relaxed),
            abandoned: self.refresh_abandoned.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add_ok(&self) {
        self.refresh_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_retry(&self) {
        self.refresh_retry.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_abandoned(&self) {
        self.refresh_abandoned.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub(crate) struct ResolverMemoryStats {
    cap_cache: AtomicUsize,
    len_cache: AtomicUsize,
    cap_doing: AtomicUsize,
    len_doing: AtomicUsize,
}

#[derive(Default)]
pub struct ResolverMemorySnapshot {
    pub cap_cache: usize,
    pub len_cache: usize,
    pub cap_doing: usize,
    pub len_doing: usize,
}

impl ResolverMemoryStats {
    fn snapshot(&self) -> ResolverMemorySnapshot {
        ResolverMemorySnapshot {
            cap_cache: self.cap_cache.load(Ordering::Relaxed),
            len_cache: self.len_cache.load(Ordering::Relaxed),
            cap_doing: self.cap_doing.load(Ordering::Relaxed),
            len_doing: self.len_doing.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn set_cache_capacity(&self, value: usize) {
        self.cap_cache.store(value, Ordering::Relaxed);
    }

    pub(crate) fn set_cache_length(&self, value: usize) {
        self.len_cache.store(value, Ordering::Relaxed);
    }

    pub(crate) fn set_doing_capacity(&self, value: usize) {
        self.cap_doing.store(value, Ordering::Relaxed);
    }

    pub(crate) fn set_doing_length(&self, value: usize) {
        self.len_doing.store(value, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct ResolverStats {
    pub(crate) query: ResolverQueryStats,
    pub(crate) refresh: ResolverRefreshStats,
    pub(crate) memory: ResolverMemoryStats,
}

impl ResolverStats {
    pub fn snapshot(&self) -> ResolverSnapshot {
        ResolverSnapshot {
            query: self.query.snapshot(),
            refresh: self.refresh.snapshot(),
            memory: self.memory.snapshot(),
        }
    }
}

#[derive(Default)]
pub struct ResolverSnapshot {
    pub query: ResolverQuerySnapshot,
    pub refresh: ResolverRefreshSnapshot,
    pub memory: ResolverMemorySnapshot,
}
