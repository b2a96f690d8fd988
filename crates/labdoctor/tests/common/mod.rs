//! Shared test utilities for labdoctor integration tests.
//!
//! - `StoreHarness` seeds a throwaway SQLite copy of the pipeline stores
//! - Builders produce the seed rows without hand-written SQL

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{fixed_now, StoreHarness};
