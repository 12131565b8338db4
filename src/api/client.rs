//! HTTP client for the CRM notification endpoints.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::normalize;
use crate::errors::ApiError;
use crate::models::{Assignment, Notification, TicketSnapshot};
use crate::session::Session;

/// Outcome of a concurrent mark-many batch: which ids succeeded and which
/// did not. Partial failure is not an error.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub ok: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchOutcome {
    pub fn ok_count(&self) -> usize {
        self.ok.len()
    }

    pub fn total(&self) -> usize {
        self.ok.len() + self.failed.len()
    }
}

/// Thin client over the backend REST contract. One `reqwest::Client` is
/// built up front; the bearer token is read from the session per request so
/// a cleared session immediately stops authenticating.
#[derive(Clone)]
pub struct NotificationClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl NotificationClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self::with_timeout(base_url, session, Duration::from_secs(10))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: Arc<Session>,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("Ticketfeed/1.0")
                .build()
                .expect("failed to build backend HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The ticket-bearing feed for a user.
    pub async fn fetch_feed(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        require_user(user_id)?;
        let payload = self
            .get_json(&format!("/ticket/assigned-notified/{user_id}"))
            .await?;
        Ok(normalize::parse_notifications(payload))
    }

    /// The raw notification list used for badge-count computation.
    pub async fn fetch_user_notifications(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, ApiError> {
        require_user(user_id)?;
        let payload = self.get_json(&format!("/notifications/user/{user_id}")).await?;
        Ok(normalize::parse_notifications(payload))
    }

    /// Server-side unread tally; accepts a bare number or `{"count": n}`.
    pub async fn fetch_unread_count(&self, user_id: &str) -> Result<u64, ApiError> {
        require_user(user_id)?;
        let payload = self
            .get_json(&format!("/notifications/unread-count/{user_id}"))
            .await?;
        Ok(payload
            .as_u64()
            .or_else(|| payload.get("count").and_then(Value::as_u64))
            .unwrap_or(0))
    }

    /// Notifications scoped to one ticket for one user, newest first.
    pub async fn fetch_ticket_history(
        &self,
        ticket_id: &str,
        user_id: &str,
    ) -> Result<Vec<Notification>, ApiError> {
        require_user(user_id)?;
        let payload = self
            .get_json(&format!("/notifications/ticket/{ticket_id}/user/{user_id}"))
            .await?;
        let mut history = normalize::parse_notifications(payload);
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(history)
    }

    /// Full ticket object, re-fetched when the feed only carried a partial
    /// embedded snapshot.
    pub async fn fetch_ticket(&self, ticket_id: &str) -> Result<TicketSnapshot, ApiError> {
        let payload = self.get_json(&format!("/ticket/{ticket_id}")).await?;
        let payload = normalize::unwrap_object(payload);
        serde_json::from_value(payload.clone()).map_err(|_| ApiError::Decode {
            body: payload.to_string(),
        })
    }

    /// Assignment history shown with the ticket detail.
    pub async fn fetch_assignments(&self, ticket_id: &str) -> Result<Vec<Assignment>, ApiError> {
        let payload = self.get_json(&format!("/ticket/{ticket_id}/assignments")).await?;
        Ok(normalize::extract_list(payload)
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }

    /// Mark a single notification read.
    pub async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/notifications/read/{notification_id}"));
        let response = self.authed(self.http.patch(&url)).send().await?;
        self.check(response).await?;
        debug!(notification_id, "marked notification read");
        Ok(())
    }

    /// Fire one PATCH per id concurrently and tally the individual results.
    pub async fn mark_many_read(&self, notification_ids: &[String]) -> BatchOutcome {
        let calls = notification_ids.iter().map(|id| async move {
            let result = self.mark_read(id).await;
            (id.clone(), result)
        });

        let mut outcome = BatchOutcome::default();
        for (id, result) in join_all(calls).await {
            match result {
                Ok(()) => outcome.ok.push(id),
                Err(e) => {
                    warn!(notification_id = %id, error = %e, "mark-read failed in batch");
                    outcome.failed.push(id);
                }
            }
        }
        debug!(
            ok = outcome.ok_count(),
            total = outcome.total(),
            "mark-many batch settled"
        );
        outcome
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        let response = self.authed(self.http.get(&url)).send().await?;
        self.check(response).await
    }

    /// Shared response handling: 401 clears the session, any other non-2xx
    /// surfaces the backend `message`, and non-JSON bodies are kept as raw
    /// text.
    async fn check(&self, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.session.clear();
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|_| ApiError::Decode { body })
    }
}

fn require_user(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::MissingUser);
    }
    Ok(())
}
