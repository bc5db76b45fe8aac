//! Core traits defined in `photohub-core` and implemented by other crates.

pub mod api;
pub mod session;

pub use api::{AuthApi, NotificationApi};
pub use session::SessionContext;
