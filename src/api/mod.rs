pub mod client;
pub mod normalize;

pub use client::{BatchOutcome, NotificationClient};
