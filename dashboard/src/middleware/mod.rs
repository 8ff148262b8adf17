//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every gateway route, such as
//! trace correlation.

pub mod trace;

pub use trace::Trace;
