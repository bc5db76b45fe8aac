//! Plain-text rendering of notifications for terminal output.

use chrono::Local;

use photohub_core::types::Notification;

use super::reconciler::NotificationView;

/// Placeholder avatar when the actor is unknown.
const FALLBACK_INITIAL: char = 'N';

/// Formats notifications and the unread badge.
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// Upper-cased first character of the actor label, or `N`.
    pub fn avatar_initial(notification: &Notification) -> char {
        notification
            .actor
            .as_deref()
            .and_then(|actor| actor.trim().chars().next())
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or(FALLBACK_INITIAL)
    }

    /// Creation time in the local timezone, empty when unknown.
    pub fn timestamp(notification: &Notification) -> String {
        notification
            .created_at
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }

    /// One line per notification: unread marker, avatar, verb, time, id.
    pub fn line(notification: &Notification) -> String {
        let marker = if notification.is_unread() { '*' } else { ' ' };
        let initial = Self::avatar_initial(notification);
        let ts = Self::timestamp(notification);

        let mut line = format!("{marker} [{initial}] {}", notification.verb);
        if !ts.is_empty() {
            line.push_str(&format!("  {ts}"));
        }
        line.push_str(&format!("  #{}", notification.id));
        line
    }

    /// Header with the unread badge.
    pub fn badge(view: &NotificationView) -> String {
        match view.unread_count {
            0 => "Notifications".to_string(),
            n => format!("Notifications ({n} unread)"),
        }
    }

    /// Header plus one line per entry, or a placeholder when empty.
    pub fn render(view: &NotificationView) -> Vec<String> {
        let mut lines = vec![Self::badge(view)];
        if view.is_empty() {
            lines.push("  No notifications".to_string());
        } else {
            lines.extend(view.items.iter().map(|n| format!("  {}", Self::line(n))));
        }
        lines
    }
}
