//! Common test utilities for tenant routing tests.
//!
//! - [`harness`] - test server wiring injection and a tenant router

pub mod harness;
