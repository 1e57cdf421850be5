/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResolveServerError {
    #[error("server claims query was malformed")]
    FormErr,
    #[error("server returned general failure")]
    ServFail,
    #[error("server claims domain name not found")]
    NotFound,
    #[error("server refused query")]
    Refused,
}

impl ResolveServerError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveServerError::FormErr => "FORMERR",
            ResolveServerError::ServFail => "SERVFAIL",
            ResolveServerError::NotFound => "NOTFOUND",
            ResolveServerError::Refused => "REFUSED",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveDriverError {
    #[error("malformed DNS reply")]
    BadResp,
    #[error("connection refused by server")]
    ConnRefused,
    #[error("timeout while contacting server")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResolveDriverError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveDriverError::BadResp => "BadResp",
            ResolveDriverError::ConnRefused => "ConnRefused",
            ResolveDriverError::Timeout => "Timeout",
            ResolveDriverError::Internal(_) => "InternalError",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveLocalError {
    #[error("no resolver running")]
    NoResolverRunning,
}

impl ResolveLocalError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveLocalError::NoResolverRunning => "NoResolverRunning",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("empty domain")]
    EmptyDomain,
    #[error("server error: {0}")]
    FromServer(#[from] ResolveServerError),
    #[error("driver error: {0}")]
    FromDriver(#[from] ResolveDriverError),
    #[error("local error: {0}")]
    FromLocal(#[from] ResolveLocalError),
}

impl ResolveError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveError::EmptyDomain => "EmptyDomain",
            ResolveError::FromServer(_) => "ServerError",
            ResolveError::FromDriver(_) => "DriverError",
            ResolveError::FromLocal(_) => "LocalError",
        }
    }

    pub fn get_subtype(&self) -> &str {
        match self {
            ResolveError::EmptyDomain => "",
            ResolveError::FromServer(e) => e.get_type(),
            ResolveError::FromDriver(e) => e.get_type(),
            ResolveError::FromLocal(e) => e.get_type(),
        }
    }

    /// An authoritative name-not-found answer, cacheable as a negative
    /// record. All other failures are transient.
    pub(crate) fn is_negative(&self) -> bool {
        matches!(
            self,
            ResolveError::FromServer(ResolveServerError::NotFound)
        )
    }
}
