//! # photohub-client
//!
//! Thin `reqwest` wrapper over the PhotoHub REST API. Implements the
//! [`NotificationApi`](photohub_core::traits::NotificationApi) and
//! [`AuthApi`](photohub_core::traits::AuthApi) seams; it performs no
//! retries of its own.

pub mod auth;
pub mod client;
pub mod notifications;

pub use client::ApiClient;
