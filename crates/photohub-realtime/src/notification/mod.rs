//! The working notification collection and its text rendering.

pub mod formatter;
pub mod reconciler;

pub use reconciler::{NotificationView, Reconciler};
