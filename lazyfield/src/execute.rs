//! Executing a field plan into an [`ExecutionResult`].

use anyhow::Result;
use lazyfield_core::{format_error, ExecutionResult, Thunk};
use serde_json::Value as Json;
use tracing::info_span;

use crate::plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Force the whole plan at once. The first error discards all data.
    Whole,
    /// Force each top-level field on its own. A failing field becomes `null`
    /// and is reported with its path, while its siblings keep their values.
    IsolateFields,
}

/// Execute the plan in `document`. Errors in the result are resolver errors; a malformed plan
/// is reported as `Err` instead.
pub fn execute(document: Json, mode: Mode) -> Result<ExecutionResult> {
    match (mode, document) {
        (Mode::IsolateFields, Json::Object(fields)) if plan::directive(&fields).is_none() => {
            let fields = plan::build_fields(fields)?;
            let mut result = ExecutionResult {
                data: Json::Object(serde_json::Map::new()),
                errors: Vec::new(),
            };
            for (name, value) in fields {
                let _span = info_span!("resolve field", field = %name).entered();
                let outcome = Thunk::ready(value)
                    .force()
                    .and_then(|value| value.to_json());
                let data = match outcome {
                    Ok(data) => data,
                    Err(err) => {
                        tracing::debug!(field = %name, error = %err, "field failed");
                        let mut error = format_error(&err);
                        error.path.insert(0, name.clone());
                        result.push_error(error);
                        Json::Null
                    }
                };
                if let Json::Object(object) = &mut result.data {
                    object.insert(name, data);
                }
            }
            Ok(result)
        }
        (_, document) => {
            let root = plan::build(document)?;
            let _span = info_span!("resolve root").entered();
            Ok(ExecutionResult::from_outcome(Thunk::ready(root).force()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyfield_core::FormattedError;
    use serde_json::json;

    fn plan() -> Json {
        json!({
            "user": {"$defer": {"name": "ada", "age": {"$defer": 36}}},
            "friends": {"$error": "friends unavailable"},
            "greeting": "hello"
        })
    }

    #[test]
    fn test_whole_first_error_wins() {
        let result = execute(plan(), Mode::Whole).unwrap();
        assert_eq!(result.data, Json::Null);
        assert_eq!(result.errors, vec![FormattedError::new("friends unavailable")]);
    }

    #[test]
    fn test_isolated_fields_keep_siblings() {
        let result = execute(plan(), Mode::IsolateFields).unwrap();
        assert_eq!(
            result.data,
            json!({
                "user": {"name": "ada", "age": 36},
                "friends": null,
                "greeting": "hello"
            })
        );
        assert_eq!(
            result.errors,
            vec![FormattedError::new("friends unavailable").with_path(vec!["friends".to_string()])]
        );
    }

    #[test]
    fn test_isolated_panic_is_reported() {
        let result = execute(
            json!({"a": {"$panic": "boom"}, "b": [1, {"$defer": 2}]}),
            Mode::IsolateFields,
        )
        .unwrap();
        assert_eq!(result.data, json!({"a": null, "b": [1, 2]}));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("boom"));
        assert_eq!(result.errors[0].path, vec!["a".to_string()]);
    }

    #[test]
    fn test_success() {
        let result = execute(json!([{"$defer": 1}, 2]), Mode::IsolateFields).unwrap();
        assert!(!result.has_errors());
        assert_eq!(result.data, json!([1, 2]));
    }

    #[test]
    fn test_root_directive_is_not_split() {
        let result = execute(json!({"$defer": {"x": 1}}), Mode::IsolateFields).unwrap();
        assert_eq!(result.data, json!({"x": 1}));
    }

    #[test]
    fn test_malformed_plan() {
        assert!(execute(json!({"x": {"$error": 1}}), Mode::Whole).is_err());
        assert!(execute(json!({"x": {"$panic": null}}), Mode::IsolateFields).is_err());
    }
}
