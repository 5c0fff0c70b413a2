use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation errors exposed by `capcompare-core` domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("invalid metric '{value}', expected one of market-cap, revenue, earnings")]
    InvalidMetric { value: String },
}

/// Classification of upstream provider failures.
///
/// `NotFound` is deliberately absent: an absent entity is a value
/// (`Ok(None)` / empty sequence), never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// HTTP 402: the dataset is tier-restricted. Call sites degrade to
    /// partial data instead of surfacing this.
    DatasetUnavailable,
    /// HTTP 429. Surfaced distinctly so the UI can show a retry-later
    /// message; callers must not retry automatically.
    RateLimited,
    /// Any other non-2xx upstream status.
    Upstream,
    /// The transport failed before a status was available.
    Transport,
    /// A 2xx response body that could not be decoded.
    Decode,
}

/// Structured provider error carried through the gateway and web layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn dataset_unavailable() -> Self {
        Self {
            kind: ProviderErrorKind::DatasetUnavailable,
            message: String::from("dataset is not available on the current provider tier"),
        }
    }

    pub fn rate_limited() -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: String::from("provider rate limit reached"),
        }
    }

    pub fn upstream(status: u16) -> Self {
        Self {
            kind: ProviderErrorKind::Upstream,
            message: format!("provider returned status {status}"),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Decode,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::DatasetUnavailable => "provider.dataset_unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Upstream => "provider.upstream",
            ProviderErrorKind::Transport => "provider.transport",
            ProviderErrorKind::Decode => "provider.decode",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_distinct_from_upstream() {
        assert_ne!(
            ProviderError::rate_limited().kind(),
            ProviderError::upstream(500).kind()
        );
    }

    #[test]
    fn display_includes_code() {
        let err = ProviderError::upstream(503);
        assert!(err.to_string().contains("provider.upstream"));
        assert!(err.to_string().contains("503"));
    }
}
