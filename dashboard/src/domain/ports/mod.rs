//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod http_transport;
mod session_store;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthHeaders, AuthProvider};
#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{HttpTransport, HttpTransportError};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
