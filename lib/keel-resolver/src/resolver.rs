/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::cache::{CacheFetch, QueryOwner, ResolveCache};
use crate::config::ResolverConfig;
use crate::engine::{ResolutionEngine, ResolvedAnswer};
use crate::error::{ResolveError, ResolveLocalError};
use crate::group::WorkerContext;
use crate::record::{ArcCachedRecord, CachedRecord};
use crate::stats::ResolverStats;

/// Per-worker refreshing resolver.
///
/// Bound to one worker execution context at construction; every lookup,
/// refresh and retry task it creates runs on that context, while results
/// are shared with the group's other resolvers through the common cache.
pub struct Resolver {
    core: Arc<ResolverCore>,
}

struct ResolverCore {
    config: ResolverConfig,
    ctx: WorkerContext,
    engine: ResolutionEngine,
    cache: Arc<ResolveCache>,
    stats: Arc<ResolverStats>,
}

impl Resolver {
    pub(crate) fn new(
        config: ResolverConfig,
        ctx: WorkerContext,
        engine: ResolutionEngine,
        cache: Arc<ResolveCache>,
        stats: Arc<ResolverStats>,
    ) -> Self {
        Resolver {
            core: Arc::new(ResolverCore {
                config,
                ctx,
                engine,
                cache,
                stats,
            }),
        }
    }

    /// Resolve a domain to its addresses.
    ///
    /// Concurrent callers racing on the same domain share one upstream
    /// query. A cached negative answer fails with the server's
    /// name-not-found error until its TTL elapses; a stale positive record
    /// keeps answering while its refresh chain retries in the background.
    pub async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if domain.is_empty() {
            return Err(ResolveError::EmptyDomain);
        }
        let core = &self.core;
        core.stats.query.add_query_total();
        match core.cache.fetch(domain) {
            CacheFetch::Cached(record) => {
                core.stats.query.add_query_cached();
                record.answer()
            }
            CacheFetch::Shared(future) => {
                core.stats.query.add_query_shared();
                future.wait().await?.answer()
            }
            CacheFetch::Miss(owner) => {
                core.stats.query.add_query_driver();
                let future = owner.future.clone();
                let task_core = Arc::clone(core);
                core.ctx.spawn(async move {
                    task_core.run_initial_query(owner).await;
                });
                future.wait().await?.answer()
            }
            CacheFetch::Closed => Err(ResolveLocalError::NoResolverRunning.into()),
        }
    }
}

impl ResolverCore {
    async fn run_initial_query(self: Arc<Self>, owner: QueryOwner) {
        let QueryOwner {
            domain,
            generation,
            notifier,
            ..
        } = owner;
        let result = match self.engine.query(&domain).await {
            Ok(answer) => Ok(self.install_resolved(&domain, generation, answer)),
            Err(e) => {
                self.stats.query.add_error(&e);
                if e.is_negative() {
                    Ok(self.install_negative(&domain, generation))
                } else {
                    self.cache.abandon_query(&domain, generation);
                    Err(e)
                }
            }
        };
        notifier.finish(result);
    }

    /// Build a positive record with its next refresh scheduled, then hand
    /// it to the cache. A discarded install still answers waiters with the
    /// record; only the cache forgets it.
    fn install_resolved(
        self: &Arc<Self>,
        domain: &Arc<str>,
        doing_generation: u64,
        answer: ResolvedAnswer,
    ) -> ArcCachedRecord {
        let record = self.new_resolved_record(domain, answer);
        if !self.cache.complete_query(domain, doing_generation, &record) {
            debug!(
                "resolver {}: dropped query result for {domain} removed during lookup",
                self.config.name
            );
        }
        record
    }

    fn install_negative(
        self: &Arc<Self>,
        domain: &Arc<str>,
        doing_generation: u64,
    ) -> ArcCachedRecord {
        let record = self.new_negative_record(domain);
        if !self.cache.complete_query(domain, doing_generation, &record) {
            debug!(
                "resolver {}: dropped negative result for {domain} removed during lookup",
                self.config.name
            );
        }
        record
    }

    fn new_resolved_record(
        self: &Arc<Self>,
        domain: &Arc<str>,
        answer: ResolvedAnswer,
    ) -> ArcCachedRecord {
        let ttl = self.config.clamp_ttl(answer.min_ttl);
        let generation = self.cache.next_generation();
        let handle =
            self.spawn_refresh(domain.clone(), generation, Duration::from_secs(ttl as u64));
        Arc::new(CachedRecord::resolved(
            domain.clone(),
            answer.addrs,
            ttl,
            generation,
            handle,
        ))
    }

    fn new_negative_record(self: &Arc<Self>, domain: &Arc<str>) -> ArcCachedRecord {
        let ttl = self.config.negative_ttl;
        let generation = self.cache.next_generation();
        let handle = self.spawn_expire(domain.clone(), generation, Duration::from_secs(ttl as u64));
        Arc::new(CachedRecord::negative(domain.clone(), ttl, generation, handle))
    }

    /// The owned handle of a positive record: sleep out the effective TTL,
    /// then run the refresh chain for that record's generation.
    fn spawn_refresh(
        self: &Arc<Self>,
        domain: Arc<str>,
        generation: u64,
        delay: Duration,
    ) -> JoinHandle<()> {
        let core = Arc::clone(self);
        self.ctx.spawn(async move {
            tokio::time::sleep(delay).await;
            core.run_refresh(domain, generation).await;
        })
    }

    /// The owned handle of a negative record: drop it once its TTL is
    /// over, so the next resolve starts a fresh lookup.
    fn spawn_expire(
        self: &Arc<Self>,
        domain: Arc<str>,
        generation: u64,
        delay: Duration,
    ) -> JoinHandle<()> {
        let core = Arc::clone(self);
        self.ctx.spawn(async move {
            tokio::time::sleep(delay).await;
            core.cache.remove_record(&domain, generation);
        })
    }

    /// Proactive refresh for one record generation. Success and
    /// authoritative negatives replace the record in place; transient
    /// failures keep the stale record answering and retry on the backoff
    /// schedule until it tells us to stop, which evicts the record.
    async fn run_refresh(self: Arc<Self>, domain: Arc<str>, my_generation: u64) {
        let mut attempt = 0u32;
        loop {
            match self.engine.query(&domain).await {
                Ok(answer) => {
                    let record = self.new_resolved_record(&domain, answer);
                    if self.cache.replace_record(&domain, my_generation, &record) {
                        self.stats.refresh.add_ok();
                    } else {
                        debug!(
                            "resolver {}: dropped refresh result for {domain} removed during lookup",
                            self.config.name
                        );
                    }
                    return;
                }
                Err(e) => {
                    self.stats.query.add_error(&e);
                    if e.is_negative() {
                        let record = self.new_negative_record(&domain);
                        self.cache.replace_record(&domain, my_generation, &record);
                        return;
                    }
                    attempt += 1;
                    self.stats.refresh.add_retry();
                    match self.config.refresh_backoff.next_delay(attempt) {
                        Some(delay) => {
                            warn!(
                                "resolver {}: refresh of {domain} failed (attempt {attempt}): {e}",
                                self.config.name
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            warn!(
                                "resolver {}: giving up on refreshing {domain} after {attempt} attempts: {e}",
                                self.config.name
                            );
                            self.stats.refresh.add_abandoned();
                            self.cache.remove_record(&domain, my_generation);
                            return;
                        }
                    }
                }
            }
        }
    }
}
