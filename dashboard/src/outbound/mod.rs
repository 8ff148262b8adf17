//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed [`HttpTransport`](crate::domain::ports::HttpTransport)
//!   bound to the API base URL.
//! - **session**: in-memory and cookie-file
//!   [`SessionStore`](crate::domain::ports::SessionStore) implementations.
//!
//! Adapters are thin translators between domain records and client or
//! filesystem representations. They contain no business logic.

pub mod http;
pub mod session;
