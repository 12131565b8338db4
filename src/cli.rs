use clap::{Parser, Subcommand};

/// Ticketfeed — notification feed client for the complaints CRM
#[derive(Parser)]
#[command(name = "ticketfeed", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the backend and print badge counts as they change
    Watch {
        /// Override the poll interval in seconds
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Print one page of the deduplicated notification feed
    Feed {
        /// View: notified, tagged, or all
        #[arg(long, default_value = "all")]
        view: String,
        /// Free-text search (phone, NIDA id, name, institution, ticket no.)
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },

    /// Print the current unread badge counts
    Counts,

    /// Mark one or more notifications read
    MarkRead {
        /// Notification ids
        ids: Vec<String>,
    },

    /// Print the notification history for one ticket, newest first
    History { ticket_id: String },
}
