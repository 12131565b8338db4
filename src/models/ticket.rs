use serde::{Deserialize, Serialize};

use crate::models::notification::id_string;

/// Ticket fields the feed actually uses: identity, workflow status, and the
/// complainant/search columns. The backend sends a much wider object; the
/// rest is ignored on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketSnapshot {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    /// Human-facing ticket number, e.g. "SHQ-2024-0173".
    #[serde(default)]
    pub ticket_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub nida_number: String,
    #[serde(default)]
    pub created_at: String,
}

impl TicketSnapshot {
    pub fn is_reversed(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("reversed")
    }

    /// Complainant full name composed from the non-empty name parts.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One row of a ticket's assignment history, shown alongside the ticket
/// detail when a tagged notification is opened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub assigned_to_name: String,
    #[serde(default)]
    pub assigned_by_name: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub created_at: String,
}
