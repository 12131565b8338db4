use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use ticketfeed::api::NotificationClient;
use ticketfeed::cache::MemoryStore;
use ticketfeed::cli::{Cli, Commands};
use ticketfeed::config;
use ticketfeed::feed::{FeedFilter, FeedView, Page};
use ticketfeed::poller::Poller;
use ticketfeed::service::NotificationService;
use ticketfeed::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ticketfeed=debug".into()),
        ))
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let session = Arc::new(Session::new(
        cfg.user_id.clone(),
        cfg.token.clone(),
        cfg.role.clone(),
    ));
    let client = NotificationClient::with_timeout(
        &cfg.base_url,
        session.clone(),
        Duration::from_secs(cfg.request_timeout_secs),
    );
    let service = Arc::new(NotificationService::new(
        client,
        MemoryStore::new(),
        Duration::from_secs(cfg.cache_ttl_secs),
    ));

    match args.command {
        Commands::Watch { interval_secs } => {
            let interval = Duration::from_secs(interval_secs.unwrap_or(cfg.poll_interval_secs));
            let poller = Poller::spawn_with_sweep(service.clone(), interval);
            let mut counts = session.subscribe();

            println!("watching notifications for user {} (ctrl-c to stop)", cfg.user_id);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = counts.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let c = *counts.borrow_and_update();
                        println!("notified: {}  tagged: {}", c.notified, c.tagged);
                        if session.is_logged_out() {
                            eprintln!("session expired, stopping");
                            break;
                        }
                    }
                }
            }
            drop(poller);
        }

        Commands::Feed {
            view,
            search,
            status,
            category,
            page,
            page_size,
        } => {
            let view = parse_view(&view)?;
            let filter = FeedFilter {
                search,
                status,
                category,
                ..Default::default()
            };
            let result = service
                .feed_page(view, &filter, Page { number: page, size: page_size })
                .await?;

            println!(
                "page {}/{} ({} rows total)",
                result.page,
                result.total.div_ceil(result.page_size).max(1),
                result.total
            );
            for row in &result.rows {
                let ticket = row.ticket.as_ref();
                let badge = service.ticket_badge(row.resolved_ticket_id(), view).await?;
                println!(
                    "{}  {}  [{}]  {}",
                    row.resolved_ticket_id(),
                    ticket.map(|t| t.ticket_id.as_str()).unwrap_or("-"),
                    badge,
                    row.message
                );
            }
        }

        Commands::Counts => {
            service.recount().await?;
            let c = session.counts();
            println!("notified: {}  tagged: {}", c.notified, c.tagged);
        }

        Commands::MarkRead { ids } => {
            let outcome = service.mark_many_read(&ids).await;
            println!("marked {}/{} read", outcome.ok_count(), outcome.total());
            if !outcome.failed.is_empty() {
                eprintln!("failed: {}", outcome.failed.join(", "));
            }
        }

        Commands::History { ticket_id } => {
            let history = service.ticket_history(&ticket_id).await?;
            for n in &history {
                println!(
                    "{}  {}  {}",
                    n.created_at,
                    if n.is_unread() { "unread" } else { "read" },
                    n.message
                );
            }
        }
    }

    Ok(())
}

fn parse_view(raw: &str) -> anyhow::Result<FeedView> {
    match raw.to_lowercase().as_str() {
        "notified" => Ok(FeedView::Notified),
        "tagged" => Ok(FeedView::Tagged),
        "all" => Ok(FeedView::All),
        other => anyhow::bail!("unknown view '{other}' (expected notified, tagged or all)"),
    }
}
