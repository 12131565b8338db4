//! Deduplicated feed construction: one row per ticket, filtered by the
//! active view, then searched, filtered and paginated.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::classify::{self, NotificationKind};
use crate::models::Notification;

/// Which list the notifications table is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedView {
    Notified,
    Tagged,
    #[default]
    All,
}

/// Search and row filters applied after dedup, within the chosen view.
#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// Free-text search over phone, NIDA id, full name, institution and the
    /// human ticket id.
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, size: 10 }
    }
}

/// One page of the deduplicated feed.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub rows: Vec<Notification>,
    /// Row count after dedup and filtering, before pagination.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// View membership test. Read state never affects membership; it only
/// affects the badges.
fn in_view(n: &Notification, view: FeedView, user_id: &str) -> bool {
    match view {
        FeedView::Notified => n.is_for(user_id),
        FeedView::Tagged => classify::is_tagged(n),
        FeedView::All => classify::is_tagged(n) || !n.comment.trim().is_empty(),
    }
}

/// Build the table feed from the raw list.
///
/// The scan keeps original order and accepts at most one notification per
/// resolved ticket id; later rows for an already-accepted ticket are dropped
/// even when more recent or differently classified. Search and filters
/// apply to the deduplicated rows, then pagination.
pub fn build_feed(
    raw: &[Notification],
    user_id: &str,
    view: FeedView,
    filter: &FeedFilter,
    page: Page,
) -> FeedPage {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows: Vec<&Notification> = Vec::new();

    for n in raw {
        let ticket_id = n.resolved_ticket_id();
        if seen.contains(ticket_id) {
            continue;
        }
        if !in_view(n, view, user_id) {
            continue;
        }
        seen.insert(ticket_id);
        rows.push(n);
    }

    rows.retain(|n| matches_filter(n, filter));

    let total = rows.len();
    let size = page.size.max(1);
    let number = page.number.max(1);
    let start = (number - 1).saturating_mul(size);
    let rows = rows
        .into_iter()
        .skip(start)
        .take(size)
        .cloned()
        .collect();

    FeedPage {
        rows,
        total,
        page: number,
        page_size: size,
    }
}

/// Per-ticket unread badge for a table row: unread notifications for that
/// ticket matching the active view's rule. Recomputed from the raw list on
/// every call.
pub fn ticket_unread_count(
    raw: &[Notification],
    ticket_id: &str,
    user_id: &str,
    view: FeedView,
) -> usize {
    raw.iter()
        .filter(|n| n.resolved_ticket_id() == ticket_id && n.is_unread())
        .filter(|n| match view {
            FeedView::Tagged => classify::is_tagged(n),
            FeedView::Notified => {
                n.is_for(user_id) && classify::classify(n) == NotificationKind::Notified
            }
            FeedView::All => classify::is_tagged(n) || !n.comment.trim().is_empty(),
        })
        .count()
}

fn matches_filter(n: &Notification, filter: &FeedFilter) -> bool {
    let ticket = n.ticket.as_ref();

    if let Some(search) = filter.search.as_deref() {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            let Some(t) = ticket else { return false };
            let haystacks = [
                t.phone_number.clone(),
                t.nida_number.clone(),
                t.full_name(),
                t.institution.clone(),
                t.ticket_id.clone(),
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
    }

    if let Some(status) = filter.status.as_deref() {
        if !ticket.is_some_and(|t| t.status.eq_ignore_ascii_case(status)) {
            return false;
        }
    }

    if let Some(category) = filter.category.as_deref() {
        if !ticket.is_some_and(|t| t.category.eq_ignore_ascii_case(category)) {
            return false;
        }
    }

    if filter.from.is_some() || filter.to.is_some() {
        // Date range applies to the ticket's creation date; rows without a
        // parsable date cannot match a range.
        let Some(date) = ticket.and_then(|t| parse_date(&t.created_at)) else {
            return false;
        };
        if filter.from.is_some_and(|from| date < from) {
            return false;
        }
        if filter.to.is_some_and(|to| date > to) {
            return false;
        }
    }

    true
}

/// Accepts "YYYY-MM-DD" or a full RFC3339-ish timestamp (date prefix).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn note(value: serde_json::Value) -> Notification {
        serde_json::from_value(value).unwrap()
    }

    fn has_no_duplicate_tickets(page: &FeedPage) -> bool {
        let mut seen = HashSet::new();
        page.rows
            .iter()
            .all(|n| seen.insert(n.resolved_ticket_id().to_string()))
    }

    #[test]
    fn test_dedup_first_seen_wins() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "recipient_id": "7", "status": "read",
                "message": "first", "comment": "note",
                "ticket": { "id": "T1" },
            })),
            note(serde_json::json!({
                "id": "2", "recipient_id": "7", "status": "unread",
                "message": "second", "comment": "later note",
                "ticket": { "id": "T1" },
            })),
            note(serde_json::json!({
                "id": "3", "recipient_id": "7", "status": "unread",
                "message": "other", "comment": "x",
                "ticket": { "id": "T2" },
            })),
        ];

        let page = build_feed(&raw, "7", FeedView::All, &FeedFilter::default(), Page::default());
        assert_eq!(page.total, 2);
        assert!(has_no_duplicate_tickets(&page));
        // the kept T1 row is the first one scanned, not the more recent one
        assert_eq!(page.rows[0].id, "1");
    }

    #[test]
    fn test_tagged_feed_scenario_single_row_per_ticket() {
        let raw = vec![
            note(serde_json::json!({
                "id": 1, "recipient_id": "7", "status": "unread",
                "message": "Ticket assigned to you",
                "ticket": { "id": "T1", "status": "Open" },
            })),
            note(serde_json::json!({
                "id": 2, "recipient_id": "7", "status": "unread",
                "message": "You were mentioned you",
                "ticket": { "id": "T1", "status": "Open" },
            })),
        ];

        let page = build_feed(&raw, "7", FeedView::Tagged, &FeedFilter::default(), Page::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "2");
        assert_eq!(page.rows[0].resolved_ticket_id(), "T1");

        let counts = crate::classify::badge_counts(&raw, "7");
        assert_eq!(counts.tagged, 1);
        assert_eq!(counts.notified, 0);
    }

    #[test]
    fn test_notified_view_membership_ignores_read_state() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "recipient_id": "7", "status": "read",
                "message": "update", "ticket": { "id": "T1" },
            })),
            note(serde_json::json!({
                "id": "2", "recipient_id": "9", "status": "unread",
                "message": "update", "ticket": { "id": "T2" },
            })),
        ];

        let page = build_feed(&raw, "7", FeedView::Notified, &FeedFilter::default(), Page::default());
        // read row for the user stays in, the other recipient's row stays out
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "1");
    }

    #[test]
    fn test_default_view_requires_tag_or_comment() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "recipient_id": "7", "status": "unread",
                "message": "plain update", "comment": "  ",
                "ticket": { "id": "T1" },
            })),
            note(serde_json::json!({
                "id": "2", "recipient_id": "7", "status": "unread",
                "message": "mentioned you", "ticket": { "id": "T2" },
            })),
            note(serde_json::json!({
                "id": "3", "recipient_id": "7", "status": "unread",
                "message": "plain", "comment": "real comment",
                "ticket": { "id": "T3" },
            })),
        ];

        let page = build_feed(&raw, "7", FeedView::All, &FeedFilter::default(), Page::default());
        let ids: Vec<&str> = page.rows.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_search_matches_name_phone_and_ticket_number() {
        let raw = vec![note(serde_json::json!({
            "id": "1", "recipient_id": "7", "comment": "c",
            "ticket": {
                "id": "T1", "ticket_id": "SHQ-2024-0173", "status": "Open",
                "first_name": "Asha", "last_name": "Mushi",
                "phone_number": "+255700111222", "institution": "NHIF",
            },
        }))];

        for term in ["asha mushi", "0700", "shq-2024", "nhif"] {
            let filter = FeedFilter { search: Some(term.into()), ..Default::default() };
            let page = build_feed(&raw, "7", FeedView::All, &filter, Page::default());
            assert_eq!(page.total, 1, "search term {term:?}");
        }

        let filter = FeedFilter { search: Some("nobody".into()), ..Default::default() };
        let page = build_feed(&raw, "7", FeedView::All, &filter, Page::default());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_status_and_date_filters() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "comment": "c",
                "ticket": { "id": "T1", "status": "Open", "created_at": "2024-03-10T08:00:00Z" },
            })),
            note(serde_json::json!({
                "id": "2", "comment": "c",
                "ticket": { "id": "T2", "status": "Closed", "created_at": "2024-05-02T08:00:00Z" },
            })),
        ];

        let filter = FeedFilter { status: Some("closed".into()), ..Default::default() };
        let page = build_feed(&raw, "7", FeedView::All, &filter, Page::default());
        assert_eq!(page.rows[0].id, "2");

        let filter = FeedFilter {
            from: NaiveDate::from_ymd_opt(2024, 4, 1),
            to: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        };
        let page = build_feed(&raw, "7", FeedView::All, &filter, Page::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].id, "2");
    }

    #[test]
    fn test_pagination() {
        let raw: Vec<Notification> = (0..25)
            .map(|i| {
                note(serde_json::json!({
                    "id": format!("n{i}"), "comment": "c",
                    "ticket": { "id": format!("T{i}") },
                }))
            })
            .collect();

        let page = build_feed(
            &raw,
            "7",
            FeedView::All,
            &FeedFilter::default(),
            Page { number: 3, size: 10 },
        );
        assert_eq!(page.total, 25);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows[0].id, "n20");

        let past_end = build_feed(
            &raw,
            "7",
            FeedView::All,
            &FeedFilter::default(),
            Page { number: 9, size: 10 },
        );
        assert!(past_end.rows.is_empty());
        assert_eq!(past_end.total, 25);
    }

    #[test]
    fn test_ticket_unread_badge_follows_view_rule() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "recipient_id": "7", "status": "unread",
                "message": "mentioned you", "ticket": { "id": "T1" },
            })),
            note(serde_json::json!({
                "id": "2", "recipient_id": "7", "status": "unread",
                "message": "plain update", "ticket": { "id": "T1" },
            })),
            note(serde_json::json!({
                "id": "3", "recipient_id": "7", "status": "read",
                "message": "mentioned you", "ticket": { "id": "T1" },
            })),
        ];

        assert_eq!(ticket_unread_count(&raw, "T1", "7", FeedView::Tagged), 1);
        assert_eq!(ticket_unread_count(&raw, "T1", "7", FeedView::Notified), 1);
        assert_eq!(ticket_unread_count(&raw, "T1", "7", FeedView::All), 1);
        assert_eq!(ticket_unread_count(&raw, "T9", "7", FeedView::All), 0);
    }
}
