/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{ResolveError, ResolveServerError};

pub type ArcCachedRecord = Arc<CachedRecord>;

/// Cached resolution state for one domain.
///
/// An empty address list records an authoritative negative answer. The
/// record owns the handle of its next scheduled task, a proactive refresh
/// for positive records or the expiry sweep for negative ones; canceling or
/// dropping the record aborts that task, so no removal path can leave a
/// timer behind.
pub struct CachedRecord {
    domain: Arc<str>,
    addrs: Vec<IpAddr>,
    ttl: u32,
    created: Instant,
    generation: u64,
    refresh_handle: JoinHandle<()>,
}

impl CachedRecord {
    pub(crate) fn resolved(
        domain: Arc<str>,
        addrs: Vec<IpAddr>,
        ttl: u32,
        generation: u64,
        refresh_handle: JoinHandle<()>,
    ) -> Self {
        CachedRecord {
            domain,
            addrs,
            ttl,
            created: Instant::now(),
            generation,
            refresh_handle,
        }
    }

    pub(crate) fn negative(
        domain: Arc<str>,
        ttl: u32,
        generation: u64,
        refresh_handle: JoinHandle<()>,
    ) -> Self {
        CachedRecord {
            domain,
            addrs: Vec::new(),
            ttl,
            created: Instant::now(),
            generation,
            refresh_handle,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn addrs(&self) -> &[IpAddr] {
        &self.addrs
    }

    /// The effective TTL in seconds: the clamped record TTL for positive
    /// records, the configured negative TTL otherwise.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn is_negative(&self) -> bool {
        self.addrs.is_empty()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this record should be dropped on access. Negative records
    /// expire once their TTL elapses; any record past the cache's vanish
    /// horizon expires as well. Stale positive records inside the horizon
    /// stay usable while their refresh chain runs.
    pub(crate) fn expired(&self, vanish_after: Option<Duration>) -> bool {
        let age = self.created.elapsed();
        if self.is_negative() && age >= Duration::from_secs(self.ttl as u64) {
            return true;
        }
        if let Some(limit) = vanish_after {
            if age >= limit {
                return true;
            }
        }
        false
    }

    pub(crate) fn answer(&self) -> Result<Vec<IpAddr>, ResolveError> {
        if self.addrs.is_empty() {
            Err(ResolveServerError::NotFound.into())
        } else {
            Ok(self.addrs.clone())
        }
    }

    pub(crate) fn cancel_refresh(&self) {
        self.refresh_handle.abort();
    }
}

impl Drop for CachedRecord {
    fn drop(&mut self) {
        self.refresh_handle.abort();
    }
}
