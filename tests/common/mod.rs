//! Common test utilities for integration tests.
//!
//! Fixtures for building registries and services in a known state.
//!
//! # Example
//!
//! ```ignore
//! use common::{registry_from, ThreadSpec};
//!
//! let registry = registry_from(&[("A", Active, 10), ("B", Resolved, 20)]);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use agentdesk::models::{RawThread, ThreadStatus};
use agentdesk::registry::ThreadRegistry;
use chrono::{DateTime, TimeZone, Utc};

/// `(id, status, seconds after the base instant)`
pub type ThreadSpec<'a> = (&'a str, ThreadStatus, i64);

pub const AGENT_ID: &str = "8:acs:agent";
pub const CUSTOMER_ID: &str = "8:acs:customer";

/// Timestamp `secs` seconds after a fixed base instant.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn raw(id: &str, secs: i64) -> RawThread {
    RawThread::new(id, format!("Customer {}", id), at(secs))
}

/// Registry loaded with `specs`, resolved ones marked through `set_status`.
///
/// Selection is whatever `load_all` auto-selected.
pub fn registry_from(specs: &[ThreadSpec]) -> ThreadRegistry {
    let mut registry = ThreadRegistry::new();
    registry.load_all(specs.iter().map(|(id, _, secs)| raw(id, *secs)).collect());
    for (id, status, _) in specs {
        if *status == ThreadStatus::Resolved {
            registry.set_status(id, ThreadStatus::Resolved);
        }
    }
    registry
}

pub fn ids(registry: &ThreadRegistry) -> Vec<String> {
    registry.threads().iter().map(|t| t.id.clone()).collect()
}

/// Deterministic pseudo-random index sequence (LCG), stable across runs.
pub fn index_sequence(seed: u64, len: usize, count: usize) -> Vec<usize> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 33) as usize) % len
        })
        .collect()
}
