//! The dynamic [`Value`] produced by field resolvers.
//!
//! A value is either plain data, a [`Thunk`] that computes the data later, or
//! an opaque host payload. Host payloads are passed through untouched, except
//! that [`crate::thunk::get_thunk`] recognizes the ones that are themselves
//! callables shaped like a deferred value.

use std::{any::Any, collections::BTreeMap, fmt::Debug, sync::Arc};

use anyhow::{bail, Result};

use crate::thunk::Thunk;

/// Field name to field value, as produced for an object's selection set.
pub type Fields = BTreeMap<String, Value>;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Object(Fields),
    /// A computation that has not been forced yet.
    Deferred(Thunk),
    /// Anything else a resolver wants to hand to the engine.
    Host(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap a closure as a deferred value.
    pub fn deferred<F>(f: F) -> Value
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Value::Deferred(Thunk::new(f))
    }

    pub fn host<T: Any + Send + Sync>(payload: T) -> Value {
        Value::Host(Arc::new(payload))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert a fully forced value to JSON.
    ///
    /// Fails on anything that has no JSON representation: unforced thunks,
    /// host payloads and non-finite floats.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::UInt(u) => serde_json::Value::from(*u),
            Value::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => serde_json::Value::Number(n),
                None => bail!("cannot represent {} as JSON", f),
            },
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Result<_>>()?,
            ),
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
                    .collect::<Result<_>>()?,
            ),
            Value::Deferred(_) => bail!("cannot serialize a deferred value that was not forced"),
            Value::Host(_) => bail!("cannot serialize an opaque host value"),
        })
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::UInt(u) => f.debug_tuple("UInt").field(u).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            Value::Deferred(t) => t.fmt(f),
            Value::Host(_) => write!(f, "Host(..)"),
        }
    }
}

/// Structural equality for data; deferred and host values compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            (Value::Host(a), Value::Host(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(u)) => Value::UInt(u),
                (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Thunk> for Value {
    fn from(thunk: Thunk) -> Self {
        Value::Deferred(thunk)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(u),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
