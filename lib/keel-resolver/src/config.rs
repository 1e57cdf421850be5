/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use humanize_rs::ParseError;

use crate::backoff::ExponentialBackoff;
use crate::family::AddressFamily;

pub(crate) const RESOLVER_MINIMUM_CACHE_TTL: u32 = 30;
pub(crate) const RESOLVER_MAXIMUM_CACHE_TTL: u32 = 3600;

const RESOLVER_DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const RESOLVER_DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Sizing spec for the shared resolution cache.
///
/// Parses from a spec string of comma separated fields, e.g.
/// `"capacity=4096,expire=30m"`. `capacity` bounds the number of completed
/// records, `expire` sets a vanish horizon after which a record is dropped
/// on access regardless of its refresh state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheSpec {
    capacity: usize,
    expire: Option<Duration>,
}

impl Default for CacheSpec {
    fn default() -> Self {
        CacheSpec {
            capacity: RESOLVER_DEFAULT_CACHE_CAPACITY,
            expire: None,
        }
    }
}

impl CacheSpec {
    pub fn new(capacity: usize) -> Self {
        CacheSpec {
            capacity,
            expire: None,
        }
    }

    pub fn set_expire(&mut self, expire: Duration) {
        self.expire = Some(expire);
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn expire(&self) -> Option<Duration> {
        self.expire
    }
}

fn as_duration(value: &str) -> anyhow::Result<Duration> {
    match humanize_rs::duration::parse(value) {
        Ok(v) => Ok(v),
        Err(ParseError::MissingUnit) => {
            if let Ok(u) = u64::from_str(value) {
                Ok(Duration::from_secs(u))
            } else {
                Err(anyhow!("invalid duration string {value}"))
            }
        }
        Err(e) => Err(anyhow!("invalid humanize duration string {value}: {e}")),
    }
}

impl FromStr for CacheSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = CacheSpec::default();
        for field in s.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            match field.split_once('=') {
                Some(("capacity", v)) => {
                    spec.capacity = usize::from_str(v)
                        .map_err(|e| anyhow!("invalid capacity value {v}: {e}"))?;
                }
                Some(("expire", v)) => spec.expire = Some(as_duration(v)?),
                _ => return Err(anyhow!("unsupported cache spec field {field}")),
            }
        }
        Ok(spec)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolverConfig {
    pub name: String,
    pub min_ttl: u32,
    pub max_ttl: u32,
    pub negative_ttl: u32,
    pub query_timeout: Duration,
    pub refresh_backoff: ExponentialBackoff,
    pub family: Option<AddressFamily>,
    pub cache: CacheSpec,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            name: String::new(),
            min_ttl: RESOLVER_MINIMUM_CACHE_TTL,
            max_ttl: RESOLVER_MAXIMUM_CACHE_TTL,
            negative_ttl: RESOLVER_MINIMUM_CACHE_TTL,
            query_timeout: RESOLVER_DEFAULT_QUERY_TIMEOUT,
            refresh_backoff: ExponentialBackoff::default(),
            family: None,
            cache: CacheSpec::default(),
        }
    }
}

impl ResolverConfig {
    pub(crate) fn check(&self) -> anyhow::Result<()> {
        if self.min_ttl > self.max_ttl {
            return Err(anyhow!(
                "min ttl {} is greater than max ttl {}",
                self.min_ttl,
                self.max_ttl
            ));
        }
        if self.negative_ttl == 0 {
            return Err(anyhow!("negative ttl may not be zero"));
        }
        if self.query_timeout.is_zero() {
            return Err(anyhow!("query timeout may not be zero"));
        }
        if self.cache.capacity == 0 {
            return Err(anyhow!("cache capacity may not be zero"));
        }
        Ok(())
    }

    pub(crate) fn clamp_ttl(&self, ttl: u32) -> u32 {
        ttl.clamp(self.min_ttl, self.max_ttl)
    }
}
