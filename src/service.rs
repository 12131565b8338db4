//! Mark-read reconciliation and the cached read paths.
//!
//! Writes are optimistic: a successful PATCH rewrites the cached lists and
//! republishes the badge counts immediately, without waiting for the next
//! poll. All cache access goes through the `ListStore` trait.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{BatchOutcome, NotificationClient};
use crate::cache::{keys, ListStore};
use crate::classify::{self, NotificationKind, OpenTarget};
use crate::errors::ApiError;
use crate::feed::{self, FeedFilter, FeedPage, FeedView, Page};
use crate::models::{Assignment, Notification, TicketSnapshot};
use crate::session::Session;

/// Content resolved for an opened notification row.
#[derive(Debug)]
pub enum Opened {
    TicketDetail {
        ticket: TicketSnapshot,
        assignments: Vec<Assignment>,
    },
    History(Vec<Notification>),
}

pub struct NotificationService<S: ListStore> {
    client: NotificationClient,
    store: S,
    session: Arc<Session>,
    cache_ttl: Duration,
}

impl<S: ListStore> NotificationService<S> {
    pub fn new(client: NotificationClient, store: S, cache_ttl: Duration) -> Self {
        let session = client.session().clone();
        Self {
            client,
            store,
            session,
            cache_ttl,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One poll pass: refetch both lists, replace the cache, recompute and
    /// publish the badge counts. Last write wins if passes overlap.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let user_id = self.session.user_id().to_string();

        let feed = self.client.fetch_feed(&user_id).await?;
        self.store
            .put(&keys::feed(&user_id), &feed, self.cache_ttl)
            .await;

        let raw = self.client.fetch_user_notifications(&user_id).await?;
        self.store
            .put(&keys::user_notifications(&user_id), &raw, self.cache_ttl)
            .await;

        let counts = classify::badge_counts(&raw, &user_id);
        self.session.publish_counts(counts);
        debug!(
            feed_len = feed.len(),
            raw_len = raw.len(),
            notified = counts.notified,
            tagged = counts.tagged,
            "notification refresh complete"
        );
        Ok(())
    }

    /// One page of the deduplicated table feed for the given view.
    pub async fn feed_page(
        &self,
        view: FeedView,
        filter: &FeedFilter,
        page: Page,
    ) -> Result<FeedPage, ApiError> {
        let user_id = self.session.user_id().to_string();
        let raw = self.feed_list(&user_id).await?;
        Ok(feed::build_feed(&raw, &user_id, view, filter, page))
    }

    /// Per-row unread badge, recomputed from the raw list.
    pub async fn ticket_badge(&self, ticket_id: &str, view: FeedView) -> Result<usize, ApiError> {
        let user_id = self.session.user_id().to_string();
        let raw = self.raw_list(&user_id).await?;
        Ok(feed::ticket_unread_count(&raw, ticket_id, &user_id, view))
    }

    /// Recompute badge counts from the raw list and publish them.
    pub async fn recount(&self) -> Result<(), ApiError> {
        let user_id = self.session.user_id().to_string();
        let raw = self.raw_list(&user_id).await?;
        self.session
            .publish_counts(classify::badge_counts(&raw, &user_id));
        Ok(())
    }

    /// Ticket-scoped history, newest first, cached per ticket/user.
    pub async fn ticket_history(&self, ticket_id: &str) -> Result<Vec<Notification>, ApiError> {
        let user_id = self.session.user_id().to_string();
        let key = keys::history(ticket_id, &user_id);
        if let Some(history) = self.store.get(&key).await {
            return Ok(history);
        }
        let history = self.client.fetch_ticket_history(ticket_id, &user_id).await?;
        self.store.put(&key, &history, self.cache_ttl).await;
        Ok(history)
    }

    /// Mark one notification read and reconcile: patch the cached lists,
    /// drop the affected history entry, republish counts.
    pub async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.client.mark_read(notification_id).await?;
        self.apply_read(std::slice::from_ref(&notification_id.to_string()))
            .await;
        Ok(())
    }

    /// Concurrent batch mark-read. Only the ids that individually succeeded
    /// are patched into the cache, in a single combined update; the failed
    /// remainder stays unread until the next poll.
    pub async fn mark_many_read(&self, notification_ids: &[String]) -> BatchOutcome {
        let outcome = self.client.mark_many_read(notification_ids).await;
        if !outcome.ok.is_empty() {
            self.apply_read(&outcome.ok).await;
        }
        outcome
    }

    /// Resolve what an opened row should show, then mark it read and adjust
    /// the badge bucket matching the notification's own kind. A mark-read
    /// failure does not lose the already-fetched content; the next poll
    /// reconciles.
    pub async fn open(&self, n: &Notification, view: FeedView) -> Result<Opened, ApiError> {
        let user_id = self.session.user_id().to_string();
        let ticket_id = n.resolved_ticket_id().to_string();

        let opened = match classify::open_target(n, view) {
            OpenTarget::TicketDetail => {
                let ticket = self.client.fetch_ticket(&ticket_id).await?;
                let assignments = self.client.fetch_assignments(&ticket_id).await?;
                Opened::TicketDetail {
                    ticket,
                    assignments,
                }
            }
            OpenTarget::History => Opened::History(self.ticket_history(&ticket_id).await?),
        };

        if n.is_unread() {
            match classify::classify(n) {
                NotificationKind::Tagged => self.session.decrement_tagged(),
                NotificationKind::Notified if n.is_for(&user_id) => {
                    self.session.decrement_notified()
                }
                _ => {}
            }
            match self.client.mark_read(&n.id).await {
                Ok(()) => self.apply_read(std::slice::from_ref(&n.id)).await,
                Err(e) if e.is_transient() => {
                    warn!(notification_id = %n.id, error = %e, "mark-read on open failed");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(opened)
    }

    async fn feed_list(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        let key = keys::feed(user_id);
        if let Some(list) = self.store.get(&key).await {
            return Ok(list);
        }
        let list = self.client.fetch_feed(user_id).await?;
        self.store.put(&key, &list, self.cache_ttl).await;
        Ok(list)
    }

    async fn raw_list(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        let key = keys::user_notifications(user_id);
        if let Some(list) = self.store.get(&key).await {
            return Ok(list);
        }
        let list = self.client.fetch_user_notifications(user_id).await?;
        self.store.put(&key, &list, self.cache_ttl).await;
        Ok(list)
    }

    /// The combined optimistic update for a set of confirmed-read ids:
    /// rewrite their status in both cached lists, invalidate the affected
    /// ticket histories, and republish counts from the patched raw list.
    /// Already-read entries are untouched, so a repeat call is a no-op.
    async fn apply_read(&self, ids: &[String]) {
        let user_id = self.session.user_id().to_string();
        let rewrite = |list: &mut Vec<Notification>| {
            for n in list.iter_mut() {
                if ids.iter().any(|id| *id == n.id) {
                    n.status = "read".to_string();
                }
            }
        };

        self.store.patch(&keys::feed(&user_id), &rewrite).await;
        self.store
            .patch(&keys::user_notifications(&user_id), &rewrite)
            .await;

        if let Some(raw) = self.store.get(&keys::user_notifications(&user_id)).await {
            for n in raw.iter().filter(|n| ids.iter().any(|id| *id == n.id)) {
                self.store
                    .invalidate(&keys::history(n.resolved_ticket_id(), &user_id))
                    .await;
            }
            self.session
                .publish_counts(classify::badge_counts(&raw, &user_id));
        }
    }
}
