//! Structured errors, as reported in the errors list of an execution result.

use std::{error::Error, fmt::Display};

use serde::{Deserialize, Serialize};

/// A position in the query document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// An error in the shape it is presented to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceLocation>,
    /// Response path of the field that failed, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}
impl FormattedError {
    pub fn new(message: impl Into<String>) -> Self {
        FormattedError {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }
}
impl Display for FormattedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl Error for FormattedError {}

/// Format an error for the client.
///
/// Errors that are already formatted (anywhere in the chain) are returned as
/// they are; anything else contributes its message.
pub fn format_error(err: &anyhow::Error) -> FormattedError {
    match err.chain().find_map(|e| e.downcast_ref::<FormattedError>()) {
        Some(formatted) => formatted.clone(),
        None => FormattedError::new(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context as _};

    #[test]
    fn test_format_plain_error() {
        let formatted = format_error(&anyhow!("no such field"));
        assert_eq!(formatted, FormattedError::new("no such field"));
    }

    #[test]
    fn test_format_keeps_formatted() {
        let original = FormattedError {
            message: "bad".to_string(),
            locations: vec![SourceLocation { line: 1, column: 3 }],
            path: vec!["user".to_string()],
        };
        let err = anyhow::Error::new(original.clone());
        assert_eq!(format_error(&err), original);

        let wrapped: anyhow::Result<()> = Err(err).context("while resolving");
        assert_eq!(format_error(&wrapped.unwrap_err()), original);
    }

    #[test]
    fn test_serialize_omits_empty() {
        let s = serde_json::to_string(&FormattedError::new("oops")).unwrap();
        assert_eq!(s, r#"{"message":"oops"}"#);
    }
}
