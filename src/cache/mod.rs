//! Cache module for memoizing expansion and metrics lookups
//!
//! This module provides an in-memory store whose entries remember when they
//! were cached and, optionally, when they expire. Expiry is evaluated on read,
//! so stale entries are never returned and are evicted the first time a read
//! notices them.

mod store;

pub use store::{CachedData, TtlCache};
