//! Core types and trait definitions for Lapse, the Microsoft end-of-support
//! tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and fetcher crates implement the traits defined here; the CLI wires
//! them together.

// Trait methods spell out `impl Future + Send`; the advisory lint about
// `async fn` in public traits does not apply to them.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod fetch;
pub mod ledger;
pub mod normalize;
pub mod product;
pub mod reconcile;
pub mod run;
pub mod store;

#[cfg(test)]
mod memory;

pub use error::{Error, Result};
