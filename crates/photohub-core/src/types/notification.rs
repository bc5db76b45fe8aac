//! Notification domain type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned notification identifier (dedup/merge key).
pub type NotificationId = i64;

/// A single notification addressed to the authenticated principal.
///
/// Field names match the wire format of both the REST list endpoint and the
/// realtime push payload. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique, stable identifier.
    pub id: NotificationId,
    /// Display label of the user who triggered the notification.
    #[serde(default)]
    pub actor: Option<String>,
    /// What happened ("commented on your photo").
    pub verb: String,
    /// Referenced image, if any.
    #[serde(default)]
    pub image_id: Option<i64>,
    /// Referenced comment, if any.
    #[serde(default)]
    pub comment_id: Option<i64>,
    /// Unread flag. Absent means unread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread: Option<bool>,
    /// Creation time, used for display only.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Create a minimal notification with only the required fields set.
    pub fn new(id: NotificationId, verb: impl Into<String>) -> Self {
        Self {
            id,
            actor: None,
            verb: verb.into(),
            image_id: None,
            comment_id: None,
            unread: None,
            created_at: None,
        }
    }

    /// Whether this notification counts towards the unread badge.
    ///
    /// Only an explicit `unread: false` marks a notification as read.
    pub fn is_unread(&self) -> bool {
        self.unread != Some(false)
    }
}

/// Accepts RFC 3339 timestamps and naive ISO timestamps (taken as UTC).
/// Anything else becomes `None` rather than rejecting the notification.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
