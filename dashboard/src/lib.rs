//! Dashboard data layer: authenticated access to the upstream business API.
//!
//! The [`domain`] module holds the fetch, refresh, unwrap and error
//! normalization logic behind ports. [`outbound`] adapts those ports to
//! reqwest and local session stores; [`inbound`] exposes them through an
//! actix-web session gateway.

pub mod client;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use client::DashboardClient;
pub use middleware::Trace;
