//! # photohub-auth
//!
//! Session lifecycle for the PhotoHub notification client.
//!
//! ## Modules
//!
//! - `session`: login, principal re-hydration, logout, and the observable
//!   authentication state consumed by the realtime transport
//! - `session::store`: durable access/refresh token storage

pub mod session;

pub use session::{FileTokenStore, MemoryTokenStore, SessionManager, TokenStore};
