//! Shared primitives used across the error overlay crates.

use core::fmt;

/// Result alias used across the workspace.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Error raised by host-level primitives (DOM, markup, styles, network).
///
/// `code` is a stable dotted identifier such as `dom.node_missing`; the
/// widget itself never surfaces these to the user and only logs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayError {
    pub code: &'static str,
    pub message: String,
}

impl OverlayError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for OverlayError {}

#[cfg(test)]
mod tests {
    use super::OverlayError;

    #[test]
    fn displays_code_and_message() {
        let error = OverlayError::new("dom.node_missing", "node 7 does not exist");
        assert_eq!(error.to_string(), "dom.node_missing: node 7 does not exist");
    }
}
