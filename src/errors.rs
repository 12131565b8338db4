use thiserror::Error;

/// Errors surfaced by the fetch layer. Classification and feed construction
/// never fail; anything malformed there degrades to empty defaults instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401. The session has already been cleared by the
    /// time this is returned; never retried.
    #[error("unauthorized")]
    Unauthorized,

    /// A read operation was invoked without a user id. No request is made.
    #[error("user id is required")]
    MissingUser,

    /// Any other non-2xx answer. `message` is the backend's `message` field
    /// when the body carried one, else `HTTP error <status>`.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// A 2xx answer whose body could not be parsed as JSON. The raw text is
    /// kept rather than discarded.
    #[error("invalid response body: {body}")]
    Decode { body: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Whether the next scheduled poll may succeed where this call failed.
    /// Auth failures are fatal to the session and are not worth re-polling.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ApiError::Unauthorized | ApiError::MissingUser)
    }
}
