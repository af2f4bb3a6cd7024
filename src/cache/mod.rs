//! Cache module for storing forecast payloads to disk
//!
//! Payloads are cached per location and clock hour so that repeated queries
//! within the same hour never hit the upstream API. Each successful fetch
//! prunes the entries it supersedes.

mod manager;

pub use manager::{CacheKey, DiskCache, PayloadCache};
