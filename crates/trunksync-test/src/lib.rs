//! Test infrastructure for the trunk synchronizer.
//!
//! Provides:
//! - In-memory implementations of both store contracts
//! - Failure injection for conflict paths
//! - Fixtures for the standard parent/subport/trunk scenarios

pub mod fixtures;
mod stores;

pub use fixtures::*;
pub use stores::{MemNorthbound, MemPortStore};
