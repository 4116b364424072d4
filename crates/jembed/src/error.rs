use thiserror::Error;

/// Retry classification for an [`EmbedError`].
///
/// The classification is fixed at the point the error is constructed
/// (the request client maps HTTP status codes to variants); downstream
/// code matches on this, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient transport/server conditions, absorbed by the retry loop.
    Retryable,
    /// Must never be retried; abandons the batch immediately.
    Fatal,
    /// Programming or configuration errors; always propagate to the caller.
    Internal,
}

#[derive(Error, Debug, Clone)]
pub enum EmbedError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("embedding API error: status {status}, body {body}")]
    Http { status: u16, body: String },

    #[error("embedding API reports insufficient balance: status {status}, body {body}")]
    InsufficientBalance { status: u16, body: String },

    #[error("failed to decode embedding response: {0}")]
    Decode(String),

    #[error("round index {0} is not present in the current index map")]
    UnknownRoundIndex(usize),
}

impl EmbedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Http { .. } | Self::Decode(_) => ErrorKind::Retryable,
            Self::InsufficientBalance { .. } => ErrorKind::Fatal,
            Self::Config(_) | Self::UnknownRoundIndex(_) => ErrorKind::Internal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

/// Shorten a potentially long string for a log line, char-boundary safe.
pub(crate) fn truncate_string(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_is_the_only_fatal_kind() {
        let fatal = EmbedError::InsufficientBalance {
            status: 402,
            body: "insufficient balance".into(),
        };
        assert_eq!(fatal.kind(), ErrorKind::Fatal);
        assert!(fatal.is_fatal());

        let http = EmbedError::Http {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(http.kind(), ErrorKind::Retryable);
        assert_eq!(
            EmbedError::Network("timed out".into()).kind(),
            ErrorKind::Retryable
        );
        assert_eq!(
            EmbedError::UnknownRoundIndex(7).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn truncate_string_respects_char_boundaries() {
        assert_eq!(truncate_string("short", 50), "short");
        assert_eq!(truncate_string("abcdef", 3), "abc...");
        assert_eq!(truncate_string("日本語テキスト", 3), "日本語...");
    }
}
