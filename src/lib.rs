//! Agentdesk - thread state core of a sales-agent chat desk
//!
//! This library exposes modules for use in integration tests and by UI hosts.

pub mod adapters;
pub mod agent;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod service;
pub mod traits;
