//! Payload-shape tolerance for list endpoints.
//!
//! The backend answers list requests with a bare array, or an object whose
//! array lives under one of several historical field names. The probe order
//! is part of the contract.

use serde_json::Value;

use crate::models::Notification;

/// Array-bearing fields probed in priority order.
const LIST_FIELDS: &[&str] = &["notifications", "tickets", "Tickets", "data"];

/// Extract the contained array from whatever shape the backend returned.
/// Unrecognized shapes (including null) yield an empty list.
pub fn extract_list(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for &field in LIST_FIELDS {
                if let Some(Value::Array(items)) = map.remove(field) {
                    return items;
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Extract and deserialize a notification list. Rows that fail to
/// deserialize are dropped rather than failing the whole response.
pub fn parse_notifications(payload: Value) -> Vec<Notification> {
    extract_list(payload)
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Notification>(row) {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed notification row");
                None
            }
        })
        .collect()
}

/// Some object endpoints wrap the payload the same way; unwrap a single
/// object from `ticket` or `data` when present.
pub fn unwrap_object(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => {
            for field in ["ticket", "data"] {
                if let Some(inner @ Value::Object(_)) = map.remove(field) {
                    return inner;
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

// ── Tests ─────────────────────────────────────────────────────
