//! Embedded array size benchmarks for MongoDB.
//!
//! Sweeps the length of an array of nested sub-objects along a Fibonacci
//! progression, and for each length measures the BSON size of the document,
//! how long it takes to insert, and how long it takes to read back.

pub mod config;
pub mod document;
pub mod error;
pub mod naming;
pub mod recorder;
pub mod runner;
pub mod schema;
pub mod store;
pub mod sweep;

pub use error::{HarnessError, Result};
