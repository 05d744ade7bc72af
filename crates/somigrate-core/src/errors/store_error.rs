use std::fmt;

use serde_json::Value;

/// How a request failed before any response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    ConnectionRefused,
    NoLivingConnections,
    Timeout,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectionRefused => "connection_refused",
            Self::NoLivingConnections => "no_living_connections",
            Self::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Raw failure reported by a document-store client: either a transport
/// problem or an HTTP status with the backend's JSON error body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    #[error("response error [{status}]: {body}")]
    Response { status: u16, body: Value },
}

impl StoreError {
    /// Build a response error with the backend's usual
    /// `{"error": {"type", "reason", "index"}}` body.
    pub fn response(status: u16, error_type: &str, reason: impl Into<String>) -> Self {
        Self::Response {
            status,
            body: serde_json::json!({
                "error": { "type": error_type, "reason": reason.into() },
                "status": status,
            }),
        }
    }

    /// Same as [`StoreError::response`] with the offending index recorded.
    pub fn index_response(
        status: u16,
        error_type: &str,
        reason: impl Into<String>,
        index: &str,
    ) -> Self {
        Self::Response {
            status,
            body: serde_json::json!({
                "error": { "type": error_type, "reason": reason.into(), "index": index },
                "status": status,
            }),
        }
    }

    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// `error.type` from the response body.
    pub fn error_type(&self) -> Option<&str> {
        self.error_field("type")
    }

    /// `error.reason` from the response body.
    pub fn reason(&self) -> Option<&str> {
        self.error_field("reason")
    }

    /// `error.index` from the response body.
    pub fn index(&self) -> Option<&str> {
        self.error_field("index")
    }

    /// Human-readable detail for logs and fatal diagnostics.
    pub fn message(&self) -> String {
        match self {
            Self::Transport { message, .. } => message.clone(),
            Self::Response { status, .. } => match (self.error_type(), self.reason()) {
                (Some(t), Some(r)) => format!("[{t}] {r}"),
                (Some(t), None) => format!("[{t}]"),
                _ => format!("HTTP {status}"),
            },
        }
    }

    fn error_field(&self, field: &str) -> Option<&str> {
        match self {
            Self::Response { body, .. } => body.get("error")?.get(field)?.as_str(),
            Self::Transport { .. } => None,
        }
    }
}
