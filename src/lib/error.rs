// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Network or connection failure, including request timeout.
    UpstreamUnavailable,
    /// Controller replied with a non-success HTTP status.
    UpstreamError,
    /// Controller reply does not have the expected shape.
    SchemaViolation,
    /// Caller supplied flow entry is missing required fields.
    ValidationError,
    /// One of the per-switch fetches failed during a switch refresh.
    CorrelationFailure,
    InvalidArgument,
    Bug,
}

impl ErrorKind {
    /// Whether the next poll is expected to recover from this error
    /// without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::UpstreamUnavailable | ErrorKind::UpstreamError
        )
    }
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::Bug
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for SdnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl Error for SdnError {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SdnError {
    kind: ErrorKind,
    msg: String,
}

impl SdnError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self { kind, msg }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }
}

impl From<serde_json::Error> for SdnError {
    fn from(e: serde_json::Error) -> Self {
        SdnError::new(
            ErrorKind::SchemaViolation,
            format!("Unexpected reply from controller: {e}"),
        )
    }
}

impl From<reqwest::Error> for SdnError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_status() {
            ErrorKind::UpstreamError
        } else if e.is_decode() {
            ErrorKind::SchemaViolation
        } else if e.is_builder() {
            ErrorKind::InvalidArgument
        } else {
            // connect, timeout, request and body transport failures
            ErrorKind::UpstreamUnavailable
        };
        SdnError::new(kind, format!("{e}"))
    }
}
