/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, anyhow};
use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cache::ResolveCache;
use crate::config::ResolverConfig;
use crate::engine::ResolutionEngine;
use crate::family::{AddressFamily, RecordType};
use crate::resolver::Resolver;
use crate::stats::ResolverStats;
use crate::transport::TransportBuilder;

/// The worker execution context a resolver is permanently bound to.
///
/// Expected to wrap a current-thread runtime dedicated to one worker; all
/// lookup, refresh and retry tasks of that worker's resolver run on this
/// handle.
#[derive(Clone)]
pub struct WorkerContext {
    handle: Handle,
}

impl WorkerContext {
    pub fn new(handle: Handle) -> Self {
        WorkerContext { handle }
    }

    /// Bind to the runtime of the calling task. Panics outside a runtime.
    pub fn current() -> Self {
        WorkerContext {
            handle: Handle::current(),
        }
    }

    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

pub struct ResolverGroupBuilder {
    config: ResolverConfig,
    transport: Arc<dyn TransportBuilder>,
    family_probe: Option<Box<dyn FnOnce() -> AddressFamily + Send>>,
}

impl ResolverGroupBuilder {
    pub fn new(config: ResolverConfig, transport: Arc<dyn TransportBuilder>) -> Self {
        ResolverGroupBuilder {
            config,
            transport,
            family_probe: None,
        }
    }

    /// Host address family detection policy, consulted exactly once at
    /// build time when the config carries no explicit preference.
    pub fn family_probe<F>(&mut self, probe: F)
    where
        F: FnOnce() -> AddressFamily + Send + 'static,
    {
        self.family_probe = Some(Box::new(probe));
    }

    pub fn build(self) -> anyhow::Result<ResolverGroup> {
        self.config
            .check()
            .context(format!("invalid config for resolver group {}", self.config.name))?;
        let family = match self.config.family {
            Some(family) => family,
            None => self.family_probe.map(|probe| probe()).unwrap_or_default(),
        };
        let stats = Arc::new(ResolverStats::default());
        let cache = Arc::new(ResolveCache::new(
            self.config.cache.capacity(),
            self.config.cache.expire(),
            stats.clone(),
        ));
        Ok(ResolverGroup {
            config: self.config,
            record_types: family.record_types(),
            cache,
            transport: self.transport,
            stats,
            closed: AtomicBool::new(false),
        })
    }
}

/// Shared owner of the resolution cache and configuration; factory for the
/// per-worker refreshing resolvers that drive it.
pub struct ResolverGroup {
    config: ResolverConfig,
    record_types: &'static [RecordType],
    cache: Arc<ResolveCache>,
    transport: Arc<dyn TransportBuilder>,
    stats: Arc<ResolverStats>,
    closed: AtomicBool,
}

impl ResolverGroup {
    /// Create a resolver bound to `ctx`, sharing this group's cache. May
    /// be called once per worker context; every resolver observes the same
    /// cache instance.
    pub fn new_resolver(&self, ctx: WorkerContext) -> anyhow::Result<Resolver> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(anyhow!("resolver group {} already closed", self.config.name));
        }
        let transport = self
            .transport
            .build(&ctx)
            .context("failed to build query transport")?;
        let engine = ResolutionEngine::new(transport, self.record_types, self.config.query_timeout);
        Ok(Resolver::new(
            self.config.clone(),
            ctx,
            engine,
            self.cache.clone(),
            self.stats.clone(),
        ))
    }

    pub fn get_config(&self) -> ResolverConfig {
        self.config.clone()
    }

    pub fn get_stats(&self) -> Arc<ResolverStats> {
        Arc::clone(&self.stats)
    }

    /// Drop one domain from the cache, canceling its scheduled task. An
    /// in-flight lookup for the domain still answers its waiters, but its
    /// result is discarded.
    pub fn invalidate(&self, domain: &str) {
        self.cache.invalidate(domain);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Invalidate every entry, cancel every scheduled refresh and retry,
    /// and refuse further cache writes. Idempotent; also run on drop.
    /// Resolvers must not be created afterwards.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::Relaxed) {
            return;
        }
        self.cache.close();
        debug!("resolver group {} closed", self.config.name);
    }
}

impl Drop for ResolverGroup {
    fn drop(&mut self) {
        self.close();
    }
}
