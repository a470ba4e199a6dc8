//! Testing utilities.
//!
//! Provides an in-memory upstream so handlers and services can be
//! exercised without network access.

mod mock;

pub use mock::{MockCall, MockResponse, MockUpstream};
