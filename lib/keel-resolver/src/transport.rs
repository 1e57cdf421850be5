/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::ResolveError;
use crate::family::RecordType;
use crate::group::WorkerContext;

/// One address record from a DNS answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRecord {
    pub addr: IpAddr,
    pub ttl: u32,
}

impl RawRecord {
    pub fn new(addr: IpAddr, ttl: u32) -> Self {
        RawRecord { addr, ttl }
    }
}

/// Answer for one record type query.
pub struct TransportAnswer {
    pub record_type: RecordType,
    pub result: Result<Vec<RawRecord>, ResolveError>,
}

/// Wire-level DNS query transport.
///
/// `query` must not block; the answer is delivered through `sender`, once
/// per call. Late answers past the engine's query timeout are discarded by
/// the receiving side.
pub trait QueryTransport: Send + Sync {
    fn query(
        &self,
        domain: Arc<str>,
        record_type: RecordType,
        sender: mpsc::UnboundedSender<TransportAnswer>,
    );
}

pub type BoxQueryTransport = Box<dyn QueryTransport>;

/// Factory for transports, each bound to the worker execution context it is
/// built for.
pub trait TransportBuilder: Send + Sync {
    fn build(&self, ctx: &WorkerContext) -> anyhow::Result<BoxQueryTransport>;
}
