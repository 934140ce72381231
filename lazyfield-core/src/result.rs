//! The envelope wrapped around a forced root value.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    error::{format_error, FormattedError},
    value::Value,
};

/// What an execution reports to the client: the data that could be resolved,
/// and the errors encountered along the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FormattedError>,
}
impl ExecutionResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Build the envelope from the outcome of forcing the root thunk.
    ///
    /// A value without a JSON representation is reported as an error, with
    /// `null` data.
    pub fn from_outcome(outcome: Result<Value>) -> Self {
        match outcome.and_then(|value| value.to_json()) {
            Ok(data) => ExecutionResult {
                data,
                errors: Vec::new(),
            },
            Err(err) => ExecutionResult {
                data: serde_json::Value::Null,
                errors: vec![format_error(&err)],
            },
        }
    }

    pub fn push_error(&mut self, error: FormattedError) {
        self.errors.push(error);
    }
}

/// Facade for the CLI
pub fn execution_result_to_json(r: &ExecutionResult) -> Result<String> {
    serde_json::to_string(r).map_err(|e| e.into())
}

/// Facade for clients
pub fn execution_result_from_json(s: &str) -> Result<ExecutionResult> {
    serde_json::from_str(s).map_err(|e| e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thunk::Thunk;
    use anyhow::anyhow;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        let r = ExecutionResult::from_outcome(Ok(Value::from(json!({"hello": "world"}))));
        assert!(!r.has_errors());
        let s = execution_result_to_json(&r).unwrap();
        assert_eq!(s, r#"{"data":{"hello":"world"}}"#);
    }

    #[test]
    fn test_from_error() {
        let r = ExecutionResult::from_outcome(Err(anyhow!("resolver failed")));
        assert!(r.has_errors());
        let s = execution_result_to_json(&r).unwrap();
        assert_eq!(s, r#"{"data":null,"errors":[{"message":"resolver failed"}]}"#);
        assert_eq!(execution_result_from_json(&s).unwrap(), r);
    }

    #[test]
    fn test_from_forced_panic() {
        let outcome = Thunk::new(|| panic!("boom")).force();
        let r = ExecutionResult::from_outcome(outcome);
        assert_eq!(r.data, serde_json::Value::Null);
        assert_eq!(r.errors, vec![FormattedError::new("boom")]);
    }

    #[test]
    fn test_unforced_value_is_an_error() {
        let r = ExecutionResult::from_outcome(Ok(Value::deferred(|| Ok(Value::Null))));
        assert!(r.has_errors());
        assert_eq!(r.data, serde_json::Value::Null);
    }
}
