use thiserror::Error;

/// Everything that can stop a token or reblog run.
///
/// Only `QuotaExceeded` is recoverable: the migration loop turns it into a
/// successful end of the session. Every other variant aborts the command.
#[derive(Error, Debug)]
pub enum RebloggrError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Precondition(String),

    #[error("OAuth handshake failed: {0}")]
    Protocol(String),

    #[error("Malformed payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Daily post limit reached")]
    QuotaExceeded,

    // The post now exists on both blogs and has to be cleaned up by hand.
    #[error("Failed to delete post {post_id} from {blog} after reblogging, it is now duplicated")]
    Deletion {
        post_id: u64,
        blog: String,
        #[source]
        source: Box<RebloggrError>,
    },

    #[error("Tumblr API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid token file: {0}")]
    CredentialFormat(#[source] serde_json::Error),
}

impl RebloggrError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, RebloggrError::QuotaExceeded)
    }
}
