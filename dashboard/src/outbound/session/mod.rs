//! Session store adapters.
//!
//! - [`InMemorySessionStore`]: process-local state for long-lived clients and
//!   tests.
//! - [`CookieFileSessionStore`]: a JSON cookie jar on disk, written atomically
//!   so readers never observe a partial file.

mod cookie_file;
mod memory;

pub use cookie_file::{CookieFileSessionStore, DEFAULT_COOKIE_FILE};
pub use memory::InMemorySessionStore;
