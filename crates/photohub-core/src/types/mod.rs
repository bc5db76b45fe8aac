//! Domain types shared by every PhotoHub crate.

pub mod auth;
pub mod notification;
pub mod principal;
pub mod token;

pub use auth::AuthState;
pub use notification::{Notification, NotificationId};
pub use principal::{Principal, Role};
pub use token::{Credentials, SessionToken, TokenPair};
