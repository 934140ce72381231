//! Field plans: JSON documents that describe what each resolver returns.
//!
//! A plan is ordinary JSON, except for objects with a single directive key:
//!
//! - `{"$defer": PLAN}` resolves to `PLAN`, but only when forced
//! - `{"$error": "message"}` fails with `message` when forced
//! - `{"$panic": "message"}` panics with `message` when forced
//!
//! Objects resolve their fields as one unit, arrays their elements.

use anyhow::{bail, Context as _, Result};
use lazyfield_core::{thunk_for_map, when_all, Fields, Thunk, Value};
use serde_json::Value as Json;

const DEFER: &str = "$defer";
const ERROR: &str = "$error";
const PANIC: &str = "$panic";

/// Build the value a plan describes. Nothing is forced.
pub fn build(plan: Json) -> Result<Value> {
    match plan {
        Json::Object(fields) => match directive(&fields).map(str::to_string) {
            Some(key) => build_directive(key, fields),
            None => Ok(Value::Deferred(thunk_for_map(build_fields(fields)?))),
        },
        Json::Array(items) => {
            let items = items.into_iter().map(build).collect::<Result<Vec<_>>>()?;
            Ok(Value::Deferred(when_all(items)))
        }
        scalar => Ok(Value::from(scalar)),
    }
}

/// Build each field of an object plan separately.
pub fn build_fields(fields: serde_json::Map<String, Json>) -> Result<Fields> {
    fields
        .into_iter()
        .map(|(name, plan)| {
            let value = build(plan).with_context(|| format!("in field {:?}", name))?;
            Ok((name, value))
        })
        .collect()
}

/// The directive key, if `fields` is a directive rather than an object.
///
/// Only the known directives count; other `$` keys are ordinary fields.
pub(crate) fn directive(fields: &serde_json::Map<String, Json>) -> Option<&str> {
    if fields.len() != 1 {
        return None;
    }
    fields
        .keys()
        .next()
        .map(String::as_str)
        .filter(|key| [DEFER, ERROR, PANIC].contains(key))
}

fn build_directive(key: String, fields: serde_json::Map<String, Json>) -> Result<Value> {
    let Some(arg) = fields.into_iter().next().map(|(_, arg)| arg) else {
        bail!("directive {} has no argument", key);
    };
    match key.as_str() {
        DEFER => {
            let inner = build(arg).with_context(|| format!("in {}", DEFER))?;
            Ok(Value::Deferred(Thunk::ready(inner)))
        }
        ERROR => {
            let message = message_arg(&key, arg)?;
            Ok(Value::deferred(move || bail!("{}", message)))
        }
        PANIC => {
            let message = message_arg(&key, arg)?;
            Ok(Value::deferred(move || panic!("{}", message)))
        }
        _ => bail!("unknown directive {}", key),
    }
}

fn message_arg(key: &str, arg: Json) -> Result<String> {
    match arg {
        Json::String(message) => Ok(message),
        other => bail!("{} expects a message string, got {}", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(plan: Json) -> Result<Json> {
        Thunk::ready(build(plan)?).force()?.to_json()
    }

    #[test]
    fn test_plain_json() {
        let plan = json!({"a": [1, 2, {"b": null}], "c": "text"});
        assert_eq!(resolve(plan.clone()).unwrap(), plan);
    }

    #[test]
    fn test_defer() {
        let plan = json!({"user": {"$defer": {"name": {"$defer": {"$defer": "ada"}}}}});
        assert_eq!(resolve(plan).unwrap(), json!({"user": {"name": "ada"}}));
    }

    #[test]
    fn test_error() {
        let plan = json!([1, {"$error": "not found"}, 3]);
        assert_eq!(resolve(plan).unwrap_err().to_string(), "not found");
    }

    #[test]
    fn test_panic() {
        let plan = json!({"x": {"$defer": {"$panic": "boom"}}});
        assert!(resolve(plan).unwrap_err().to_string().contains("boom"));
    }

    #[test]
    fn test_build_does_not_force() {
        // a panicking leaf is harmless until forced
        let value = build(json!({"$panic": "later"})).unwrap();
        assert!(matches!(value, Value::Deferred(_)));
    }

    #[test]
    fn test_dollar_keys_in_larger_objects_are_fields() {
        let plan = json!({"$defer": 1, "other": 2});
        assert_eq!(resolve(plan.clone()).unwrap(), plan);
    }

    #[test]
    fn test_unknown_dollar_keys_are_fields() {
        let plan = json!({"$ref": 1, "nested": {"$later": [{"$id": "x"}]}});
        assert_eq!(resolve(plan.clone()).unwrap(), plan);
        assert!(directive(json!({"$ref": 1}).as_object().unwrap()).is_none());
        assert_eq!(directive(json!({"$defer": 1}).as_object().unwrap()), Some(DEFER));
    }

    #[test]
    fn test_bad_directives() {
        let err = build(json!({"a": {"$error": 5}})).unwrap_err();
        assert!(format!("{:#}", err).contains("expects a message string"));
    }
}
