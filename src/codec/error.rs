//! Positional parse errors for the trigger codec

use thiserror::Error;

/// Error raised while decoding trigger text
///
/// Errors nest: a record-level error can wrap the requirement-level error
/// that caused it, so a single report shows the full causal trail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    #[source]
    pub inner: Option<Box<ParseError>>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            inner: None,
        }
    }

    /// Wrap `inner` in a new outer error
    pub fn wrap(message: impl Into<String>, line: usize, column: usize, inner: ParseError) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            inner: Some(Box::new(inner)),
        }
    }

    /// This error followed by each nested cause, outermost first
    pub fn causes(&self) -> impl Iterator<Item = &ParseError> {
        std::iter::successors(Some(self), |e| e.inner.as_deref())
    }

    /// Innermost cause
    pub fn root_cause(&self) -> &ParseError {
        self.causes().last().unwrap_or(self)
    }

    /// One line per cause, indented by depth
    pub fn report(&self) -> String {
        self.causes()
            .enumerate()
            .map(|(depth, e)| format!("{}{}", "  ".repeat(depth), e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display() {
        let err = ParseError::new("Unknown flag 'X'", 1, 3);
        assert_eq!(err.to_string(), "Unknown flag 'X' at line 1, column 3");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_chain() {
        let inner = ParseError::new("Expected hex address", 4, 12);
        let outer = ParseError::wrap("Invalid trigger for achievement 7", 4, 5, inner.clone());

        assert_eq!(outer.causes().count(), 2);
        assert_eq!(outer.root_cause(), &inner);
        assert_eq!(
            outer.source().map(|s| s.to_string()),
            Some(inner.to_string())
        );
    }

    #[test]
    fn test_report() {
        let inner = ParseError::new("Truncated hit count", 2, 9);
        let outer = ParseError::wrap("Invalid record", 2, 1, inner);
        let report = outer.report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Invalid record at line 2, column 1");
        assert_eq!(lines[1], "  Truncated hit count at line 2, column 9");
    }
}
