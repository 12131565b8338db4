use serde::{Deserialize, Deserializer, Serialize};

use crate::models::ticket::TicketSnapshot;

/// Deserialize an id that the backend sends as either a JSON string or a
/// JSON number into a canonical `String`. All id comparisons downstream are
/// plain string equality; this is the single coercion point.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(canonical_id(&value))
}

pub(crate) fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let id = canonical_id(&value);
    Ok(if id.is_empty() { None } else { Some(id) })
}

fn canonical_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// A notification row as received from the backend. Fields the backend may
/// omit default to empty so classification never has to deal with `None`
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "id_string")]
    pub recipient_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub comment: String,
    /// Embedded ticket snapshot when the backend inlines it.
    #[serde(default)]
    pub ticket: Option<TicketSnapshot>,
    /// Bare ticket reference used when the snapshot is absent.
    #[serde(default, deserialize_with = "opt_id_string")]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Notification {
    /// Anything that is not explicitly `"read"` counts as unread. The
    /// backend has been observed sending a stray single-space status.
    pub fn is_unread(&self) -> bool {
        !self.status.trim().eq_ignore_ascii_case("read")
    }

    /// Whether this notification is addressed to `user_id`. Ids were
    /// canonicalized to strings at deserialization, so this is plain
    /// equality.
    pub fn is_for(&self, user_id: &str) -> bool {
        !self.recipient_id.is_empty() && self.recipient_id == user_id
    }

    /// Resolve the ticket this notification belongs to: embedded snapshot
    /// id, then the bare reference, then the notification's own id as a
    /// defensive fallback.
    pub fn resolved_ticket_id(&self) -> &str {
        if let Some(ticket) = &self.ticket {
            if !ticket.id.is_empty() {
                return &ticket.id;
            }
        }
        if let Some(ticket_id) = &self.ticket_id {
            if !ticket_id.is_empty() {
                return ticket_id;
            }
        }
        &self.id
    }
}

// ── Tests ─────────────────────────────────────────────────────
