//! Ticketfeed — notification feed reconciliation for the complaints CRM.
//!
//! Fetches a user's notifications from the REST backend, classifies them
//! into tagged/notified/assigned/reversed buckets, builds the deduplicated
//! one-row-per-ticket feed, and reconciles mark-read state across the local
//! cache and badge counters.

pub mod api;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod errors;
pub mod feed;
pub mod models;
pub mod poller;
pub mod service;
pub mod session;
