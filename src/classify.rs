//! Notification classification.
//!
//! The backend does not carry a structured kind field, so the kind is
//! derived from the message/comment wording and the embedded ticket status.
//! This string matching is a compatibility shim for the existing backend
//! contract; `NotificationKind` is the explicit tag the rest of the crate
//! works with.

use crate::feed::FeedView;
use crate::models::Notification;
use crate::session::BadgeCounts;

/// Explicit classification tag, computed once per notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// The user was @-mentioned in a ticket comment or update.
    Tagged,
    /// The ticket was reversed back to the user.
    Reversed,
    /// Direct assignment/forward/reassignment wording.
    Assigned,
    /// Residual bucket; the one counted toward the general badge.
    Notified,
}

/// What opening a notification row should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    /// Full ticket plus its assignment history.
    TicketDetail,
    /// Ticket-scoped notification history.
    History,
}

pub fn classify(n: &Notification) -> NotificationKind {
    if is_tagged(n) {
        NotificationKind::Tagged
    } else if is_reversed(n) {
        NotificationKind::Reversed
    } else if is_assigned(n) {
        NotificationKind::Assigned
    } else {
        NotificationKind::Notified
    }
}

/// Mention in the message, or an `@` anywhere in the comment.
pub fn is_tagged(n: &Notification) -> bool {
    n.message.to_lowercase().contains("mentioned you") || n.comment.contains('@')
}

/// Reversal requires both the ticket status and the message wording; the
/// status alone is not enough because reversed tickets keep generating
/// ordinary notifications afterwards.
fn is_reversed(n: &Notification) -> bool {
    let on_reversed_ticket = n.ticket.as_ref().is_some_and(|t| t.is_reversed());
    if !on_reversed_ticket {
        return false;
    }
    let message = n.message.to_lowercase();
    message.contains("reversed back to you")
        || message.contains("reversed to you")
        || (message.contains("has been reversed") && message.contains("to"))
}

fn is_assigned(n: &Notification) -> bool {
    let message = n.message.to_lowercase();
    message.contains("assigned to you")
        || message.contains("forwarded to you")
        || message.contains("reassigned to you")
}

/// Recompute both badge counters from the full raw list. Only unread rows
/// addressed to `user_id` count; assignment and reversal rows count toward
/// neither badge.
pub fn badge_counts(raw: &[Notification], user_id: &str) -> BadgeCounts {
    let mut counts = BadgeCounts::default();
    for n in raw {
        if !n.is_unread() || !n.is_for(user_id) {
            continue;
        }
        match classify(n) {
            NotificationKind::Tagged => counts.tagged += 1,
            NotificationKind::Notified => counts.notified += 1,
            NotificationKind::Reversed | NotificationKind::Assigned => {}
        }
    }
    counts
}

/// Routing for a row's bell/chat action: tagged content (or the tagged view
/// itself) opens the ticket, everything else opens the notification history.
pub fn open_target(n: &Notification, view: FeedView) -> OpenTarget {
    if is_tagged(n) || view == FeedView::Tagged {
        OpenTarget::TicketDetail
    } else {
        OpenTarget::History
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn note(value: serde_json::Value) -> Notification {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mention_in_message_is_tagged() {
        let n = note(serde_json::json!({
            "id": "1", "message": "John Mentioned You in ticket SHQ-1",
        }));
        assert_eq!(classify(&n), NotificationKind::Tagged);
    }

    #[test]
    fn test_at_sign_in_comment_is_tagged() {
        let n = note(serde_json::json!({
            "id": "1", "message": "new comment", "comment": "@asha please review",
        }));
        assert_eq!(classify(&n), NotificationKind::Tagged);
    }

    #[test]
    fn test_assignment_wording_is_assigned() {
        for msg in [
            "Ticket assigned to you",
            "Ticket forwarded to you",
            "Ticket reassigned to you by the head of unit",
        ] {
            let n = note(serde_json::json!({ "id": "1", "message": msg }));
            assert_eq!(classify(&n), NotificationKind::Assigned, "{msg}");
        }
    }

    #[test]
    fn test_reversed_needs_both_status_and_wording() {
        let both = note(serde_json::json!({
            "id": "1",
            "message": "Ticket reversed back to you",
            "ticket": { "id": "T1", "status": "Reversed" },
        }));
        assert_eq!(classify(&both), NotificationKind::Reversed);

        // wording without the ticket status is just a residual notification
        let wording_only = note(serde_json::json!({
            "id": "1",
            "message": "Ticket reversed back to you",
            "ticket": { "id": "T1", "status": "Open" },
        }));
        assert_eq!(classify(&wording_only), NotificationKind::Notified);

        // status without the wording likewise
        let status_only = note(serde_json::json!({
            "id": "1",
            "message": "Ticket updated",
            "ticket": { "id": "T1", "status": "reversed" },
        }));
        assert_eq!(classify(&status_only), NotificationKind::Notified);
    }

    #[test]
    fn test_has_been_reversed_phrasing() {
        let n = note(serde_json::json!({
            "id": "1",
            "message": "Ticket SHQ-9 has been reversed to the focal person",
            "ticket": { "id": "T9", "status": "Reversed" },
        }));
        assert_eq!(classify(&n), NotificationKind::Reversed);
    }

    #[test]
    fn test_tagged_wins_over_assignment() {
        let n = note(serde_json::json!({
            "id": "1",
            "message": "mentioned you: ticket assigned to you",
        }));
        assert_eq!(classify(&n), NotificationKind::Tagged);
    }

    #[test]
    fn test_badge_counts_partition_disjointly() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "recipient_id": "7", "status": "unread",
                "message": "You were mentioned you in ticket X",
            })),
            note(serde_json::json!({
                "id": "2", "recipient_id": "7", "status": "unread",
                "message": "Ticket assigned to you",
            })),
            note(serde_json::json!({
                "id": "3", "recipient_id": "7", "status": "unread",
                "message": "New update on your complaint",
            })),
        ];
        let counts = badge_counts(&raw, "7");
        assert_eq!(counts.tagged, 1);
        // the assignment row lands in neither bucket
        assert_eq!(counts.notified, 1);
    }

    #[test]
    fn test_reversed_excluded_from_notified_count() {
        let raw = vec![note(serde_json::json!({
            "id": "1", "recipient_id": "7", "status": "unread",
            "message": "reversed back to you",
            "ticket": { "id": "T1", "status": "Reversed" },
        }))];
        let counts = badge_counts(&raw, "7");
        assert_eq!(counts.notified, 0);
        assert_eq!(counts.tagged, 0);
    }

    #[test]
    fn test_counts_ignore_read_and_other_recipients() {
        let raw = vec![
            note(serde_json::json!({
                "id": "1", "recipient_id": "7", "status": "read",
                "message": "update",
            })),
            note(serde_json::json!({
                "id": "2", "recipient_id": "8", "status": "unread",
                "message": "update",
            })),
        ];
        assert_eq!(badge_counts(&raw, "7"), BadgeCounts::default());
    }

    #[test]
    fn test_open_target_routing() {
        let tagged = note(serde_json::json!({
            "id": "1", "message": "mentioned you",
        }));
        let plain = note(serde_json::json!({
            "id": "2", "message": "update",
        }));

        assert_eq!(open_target(&tagged, FeedView::All), OpenTarget::TicketDetail);
        assert_eq!(open_target(&plain, FeedView::Tagged), OpenTarget::TicketDetail);
        assert_eq!(open_target(&plain, FeedView::Notified), OpenTarget::History);
        assert_eq!(open_target(&plain, FeedView::All), OpenTarget::History);
    }
}
