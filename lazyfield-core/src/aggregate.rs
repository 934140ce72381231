//! Combining many possibly-deferred values into one [`Thunk`].
//!
//! The engine uses these to resolve all fields of an object, or all elements
//! of a list, as one unit. The first error wins: the remaining slots are not
//! forced, and sibling errors are not reported.

use std::sync::{Mutex, TryLockError};

use anyhow::{bail, Result};

use crate::{
    thunk::{get_thunk, Thunk},
    value::{Fields, Value},
};

/// Combine `items` into a thunk that forces every deferred slot, left to right,
/// and yields the list of results.
///
/// The returned thunk takes ownership of `items` and resolves the slots in
/// place: a slot that was forced successfully is not forced again, even if a
/// later slot failed and the aggregation is forced once more. Forcing the
/// aggregation while it is already being forced is an error.
pub fn when_all(items: Vec<Value>) -> Thunk {
    let slots = Mutex::new(items);
    Thunk::new(move || {
        let mut slots = match slots.try_lock() {
            Ok(slots) => slots,
            Err(TryLockError::WouldBlock) => bail!("aggregated values are already being forced"),
            Err(TryLockError::Poisoned(_)) => bail!("aggregated values were left inconsistent"),
        };
        for (index, slot) in slots.iter_mut().enumerate() {
            if let Some(thunk) = get_thunk(slot) {
                match thunk.force() {
                    Ok(value) => *slot = value,
                    Err(err) => {
                        tracing::debug!(index, error = %err, "aggregation stopped at first error");
                        return Err(err);
                    }
                }
            }
        }
        Ok(Value::List(slots.clone()))
    })
}

/// Combine the fields of an object into a thunk that forces every deferred
/// field value and yields the object with the same keys.
pub fn thunk_for_map(fields: Fields) -> Thunk {
    let (keys, values): (Vec<String>, Vec<Value>) = fields.into_iter().unzip();
    when_all(values).then(move |values| match values {
        Value::List(values) => Ok(Value::Object(keys.iter().cloned().zip(values).collect())),
        other => bail!("aggregation produced {:?} instead of a list", other),
    })
}

/// Force `fields` as one unit.
pub fn force_fields(fields: Fields) -> Result<Fields> {
    match thunk_for_map(fields).force()? {
        Value::Object(fields) => Ok(fields),
        other => bail!("object aggregation produced {:?}", other),
    }
}
