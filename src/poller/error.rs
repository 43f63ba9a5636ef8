//! Fetch and forward error definitions.

use thiserror::Error;

/// Longest body excerpt carried inside an error.
pub const BODY_SNIPPET_LIMIT: usize = 512;

/// Errors raised while polling the source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("error polling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Source answered with something other than 200.
    #[error("non-OK HTTP status from {url}: {status}\n{body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Source answered 200 with an unexpected content type.
    #[error("unexpected Content-Type, expected {expected} but got {actual}")]
    MimeMismatch { expected: String, actual: String },

    /// The response body could not be read.
    #[error("error reading response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while delivering to the sink.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("error sending to webhook {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("non-OK HTTP status from webhook {url}: {status}\n{body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

/// Failure of one fetch-then-forward unit of work.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl PollError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PollError::Fetch(FetchError::Status { status, .. })
            | PollError::Forward(ForwardError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Lossy UTF-8 excerpt of a response body, cut on a character boundary.
pub fn body_snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= BODY_SNIPPET_LIMIT {
        return text.into_owned();
    }

    let mut end = BODY_SNIPPET_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
