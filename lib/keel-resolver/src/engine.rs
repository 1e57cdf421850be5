/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{ResolveDriverError, ResolveError, ResolveServerError};
use crate::family::RecordType;
use crate::transport::{BoxQueryTransport, RawRecord};

pub(crate) struct ResolvedAnswer {
    pub(crate) addrs: Vec<IpAddr>,
    pub(crate) min_ttl: u32,
}

/// Runs single resolution attempts against the transport this engine was
/// built around.
pub(crate) struct ResolutionEngine {
    transport: BoxQueryTransport,
    record_types: &'static [RecordType],
    query_timeout: Duration,
}

impl ResolutionEngine {
    pub(crate) fn new(
        transport: BoxQueryTransport,
        record_types: &'static [RecordType],
        query_timeout: Duration,
    ) -> Self {
        ResolutionEngine {
            transport,
            record_types,
            query_timeout,
        }
    }

    /// One resolution attempt: a transport query per configured record
    /// type, all bounded by a single timeout. Addresses keep record type
    /// priority order; the returned TTL is the minimum over all records of
    /// the answer, so it gets reclamped from fresh data on every refresh.
    pub(crate) async fn query(&self, domain: &Arc<str>) -> Result<ResolvedAnswer, ResolveError> {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        for record_type in self.record_types {
            self.transport
                .query(domain.clone(), *record_type, sender.clone());
        }
        drop(sender);

        let mut slots: Vec<Option<Vec<RawRecord>>> = vec![None; self.record_types.len()];
        let mut hard_error: Option<ResolveError> = None;
        let mut wait_left = self.record_types.len();

        let collect = async {
            while wait_left > 0 {
                let Some(answer) = receiver.recv().await else {
                    if hard_error.is_none() {
                        hard_error = Some(
                            ResolveDriverError::Internal("no response received".to_string())
                                .into(),
                        );
                    }
                    break;
                };
                wait_left -= 1;
                let slot = self
                    .record_types
                    .iter()
                    .position(|t| *t == answer.record_type);
                match answer.result {
                    Ok(records) => {
                        if let Some(i) = slot {
                            if !records.is_empty() {
                                slots[i] = Some(records);
                            }
                        }
                    }
                    Err(e) => {
                        if !e.is_negative() && hard_error.is_none() {
                            hard_error = Some(e);
                        }
                    }
                }
            }
        };
        let timed_out = tokio::time::timeout(self.query_timeout, collect)
            .await
            .is_err();

        let mut addrs = Vec::new();
        let mut min_ttl = u32::MAX;
        for records in slots.into_iter().flatten() {
            for record in records {
                min_ttl = min_ttl.min(record.ttl);
                addrs.push(record.addr);
            }
        }
        if !addrs.is_empty() {
            return Ok(ResolvedAnswer { addrs, min_ttl });
        }
        if let Some(e) = hard_error {
            return Err(e);
        }
        if timed_out {
            Err(ResolveDriverError::Timeout.into())
        } else {
            Err(ResolveServerError::NotFound.into())
        }
    }
}
