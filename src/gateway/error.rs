use std::fmt;

/// Normalized failure of a backend call.
///
/// Transport and HTTP failures are handled identically by callers; they only
/// differ in how the message reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No response was received (unreachable host, refused or blocked request, timeout).
    Transport(String),
    /// The server answered with a non-2xx status.
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    /// A 2xx response whose body could not be decoded.
    Decode(String),
}

impl RequestError {
    pub fn http(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "network failure: {}", msg),
            Self::Http {
                status,
                status_text,
                body,
            } => {
                write!(f, "HTTP {}", status)?;
                if !status_text.is_empty() {
                    write!(f, " {}", status_text)?;
                }
                if !body.is_empty() {
                    write!(f, " | {}", body)?;
                }
                Ok(())
            }
            Self::Decode(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::Transport(format!("connection failed: {}", err))
        } else if let Some(status) = err.status() {
            Self::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                String::new(),
            )
        } else {
            Self::Transport(err.to_string())
        }
    }
}
