//! Explicit session state shared between the fetcher and the classifier.
//!
//! The browser original kept the auth token, role and badge counts in
//! ambient local storage and had independent surfaces poll it. Here the
//! session is an object handed to the client at construction, and badge
//! counts are published over a `tokio::sync::watch` channel so a sidebar or
//! any other surface subscribes instead of polling.

use std::sync::RwLock;

use serde::Serialize;
use tokio::sync::watch;

/// The two unread badge buckets. Always recomputable from a fresh fetch;
/// the only incremental mutation is the bounded decrement on open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeCounts {
    pub notified: u64,
    pub tagged: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    role: Option<String>,
    logged_out: bool,
}

/// Per-user session: bearer token, role, and the badge-count channel.
pub struct Session {
    user_id: String,
    state: RwLock<SessionState>,
    counts: watch::Sender<BadgeCounts>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: Option<String>, role: Option<String>) -> Self {
        let (counts, _) = watch::channel(BadgeCounts::default());
        Self {
            user_id: user_id.into(),
            state: RwLock::new(SessionState {
                token,
                role,
                logged_out: false,
            }),
            counts,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().expect("session lock poisoned").token.clone()
    }

    pub fn role(&self) -> Option<String> {
        self.state.read().expect("session lock poisoned").role.clone()
    }

    /// 401 handling: drop the credential and role and flag the session as
    /// logged out. The embedder watches `is_logged_out` to route back to the
    /// login entry point.
    pub fn clear(&self) {
        let mut state = self.state.write().expect("session lock poisoned");
        state.token = None;
        state.role = None;
        state.logged_out = true;
        tracing::warn!(user_id = %self.user_id, "session cleared after auth failure");
    }

    pub fn is_logged_out(&self) -> bool {
        self.state.read().expect("session lock poisoned").logged_out
    }

    pub fn counts(&self) -> BadgeCounts {
        *self.counts.borrow()
    }

    /// Subscribe to badge-count changes. Receivers see the latest value on
    /// every publish, including bounded decrements.
    pub fn subscribe(&self) -> watch::Receiver<BadgeCounts> {
        self.counts.subscribe()
    }

    /// Replace both counters with a fresh recomputation.
    pub fn publish_counts(&self, counts: BadgeCounts) {
        self.counts.send_replace(counts);
    }

    /// Decrement the notified badge by one, never below zero.
    pub fn decrement_notified(&self) {
        self.counts.send_modify(|c| c.notified = c.notified.saturating_sub(1));
    }

    /// Decrement the tagged badge by one, never below zero.
    pub fn decrement_tagged(&self) {
        self.counts.send_modify(|c| c.tagged = c.tagged.saturating_sub(1));
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_drops_token_and_role() {
        let session = Session::new("7", Some("tok".into()), Some("focal".into()));
        assert_eq!(session.token().as_deref(), Some("tok"));
        assert!(!session.is_logged_out());

        session.clear();
        assert!(session.token().is_none());
        assert!(session.role().is_none());
        assert!(session.is_logged_out());
    }

    #[test]
    fn test_decrement_saturates_at_zero() {
        let session = Session::new("7", None, None);
        session.publish_counts(BadgeCounts { notified: 1, tagged: 0 });

        session.decrement_notified();
        session.decrement_notified();
        session.decrement_tagged();
        assert_eq!(session.counts(), BadgeCounts { notified: 0, tagged: 0 });
    }

    #[test]
    fn test_subscribers_observe_published_counts() {
        let session = Session::new("7", None, None);
        let rx = session.subscribe();

        session.publish_counts(BadgeCounts { notified: 3, tagged: 1 });
        assert_eq!(*rx.borrow(), BadgeCounts { notified: 3, tagged: 1 });

        session.decrement_tagged();
        assert_eq!(*rx.borrow(), BadgeCounts { notified: 3, tagged: 0 });
    }
}
