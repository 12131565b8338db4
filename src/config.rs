use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the CRM backend, e.g. "https://crm.example.org/api/v1".
    pub base_url: String,
    /// Bearer token attached to every request; absent means unauthenticated.
    pub token: Option<String>,
    /// Role of the signed-in user (focal person, head of unit, reviewer).
    pub role: Option<String>,
    /// Id of the signed-in user; read operations are disabled without it.
    pub user_id: String,
    /// Seconds between automatic refreshes.
    /// Set via TICKETFEED_POLL_SECS. Default: 30.
    pub poll_interval_secs: u64,
    /// Seconds a cached list stays fresh between polls.
    /// Set via TICKETFEED_CACHE_TTL_SECS. Default: 12.
    pub cache_ttl_secs: u64,
    /// Per-request timeout in seconds. Default: 10.
    pub request_timeout_secs: u64,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("TICKETFEED_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:4000/api/v1".into());

    Ok(Config {
        base_url,
        token: std::env::var("TICKETFEED_TOKEN").ok(),
        role: std::env::var("TICKETFEED_ROLE").ok(),
        user_id: std::env::var("TICKETFEED_USER_ID").unwrap_or_default(),
        poll_interval_secs: std::env::var("TICKETFEED_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        cache_ttl_secs: std::env::var("TICKETFEED_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(12),
        request_timeout_secs: std::env::var("TICKETFEED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10),
    })
}
