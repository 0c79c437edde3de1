//! Darwin client error types.

use std::fmt;

/// Errors from talking to Darwin or reading its responses.
#[derive(Debug)]
pub enum DarwinError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response body was not well-formed XML
    Xml {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code without a SOAP fault body
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Invalid access token
    Unauthorized,
}

impl DarwinError {
    /// Build an XML error, keeping a short prefix of the offending body.
    pub(crate) fn xml(message: impl fmt::Display, body: &str) -> Self {
        DarwinError::Xml {
            message: message.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}

impl fmt::Display for DarwinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DarwinError::Http(e) => write!(f, "HTTP error: {e}"),
            DarwinError::Xml { message, body } => {
                write!(f, "XML parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            DarwinError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            DarwinError::RateLimited => write!(f, "rate limited by Darwin API"),
            DarwinError::Unauthorized => write!(f, "unauthorized (invalid access token)"),
        }
    }
}

impl std::error::Error for DarwinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DarwinError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DarwinError {
    fn from(err: reqwest::Error) -> Self {
        DarwinError::Http(err)
    }
}
