//! Session lifecycle: the authentication state machine and token storage.

pub mod manager;
pub mod store;

pub use manager::SessionManager;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
