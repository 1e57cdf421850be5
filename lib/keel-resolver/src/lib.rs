/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::{CacheSpec, ResolverConfig};

mod error;
pub use error::{ResolveDriverError, ResolveError, ResolveLocalError, ResolveServerError};

mod backoff;
pub use backoff::ExponentialBackoff;

mod family;
pub use family::{AddressFamily, RecordType};

mod transport;
pub use transport::{
    BoxQueryTransport, QueryTransport, RawRecord, TransportAnswer, TransportBuilder,
};

mod record;
pub use record::{ArcCachedRecord, CachedRecord};

mod engine;

mod cache;

mod resolver;
pub use resolver::Resolver;

mod group;
pub use group::{ResolverGroup, ResolverGroupBuilder, WorkerContext};

mod stats;
pub use stats::{
    ResolverMemorySnapshot, ResolverQuerySnapshot, ResolverQueryStats, ResolverRefreshSnapshot,
    ResolverRefreshStats, ResolverSnapshot, ResolverStats,
};
