use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Upstream error: {status}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Upstream {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// Status to report to our own callers: the upstream status when there
    /// was one, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Upstream { status, .. } => status.as_u16(),
            _ => 500,
        }
    }

    /// Transport failures, as opposed to a reply we did not like.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}
