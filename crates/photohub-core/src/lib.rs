//! # photohub-core
//!
//! Core crate for PhotoHub Notify. Contains the notification and session
//! domain types, configuration schemas, the traits other crates implement
//! (API access, session capability), and the unified error system.
//!
//! This crate has **no** internal dependencies on other PhotoHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
