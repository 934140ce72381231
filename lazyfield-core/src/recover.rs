//! Turning panics inside deferred computations into errors.

use std::{
    any::Any,
    cell::Cell,
    error::Error,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Once,
};

use anyhow::{anyhow, Result};

use crate::error::{format_error, FormattedError};
use crate::value::Value;

thread_local! {
    /// Number of `recover` calls active on this thread.
    static RECOVERING: Cell<usize> = const { Cell::new(0) };
}

static INSTALL_HOOK: Once = Once::new();

/// Wrap the current panic hook so that it stays quiet for panics that
/// `recover` turns into errors. Panics elsewhere still reach it.
fn install_quiet_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if is_recovering() {
                let location = info
                    .location()
                    .map(|l| format!("{}:{}", l.file(), l.line()))
                    .unwrap_or_default();
                tracing::debug!(%location, "deferred value panicked");
            } else {
                previous(info);
            }
        }));
    });
}

fn is_recovering() -> bool {
    RECOVERING.with(|depth| depth.get() > 0)
}

/// Decrements the recovery depth when dropped, also while unwinding.
struct RecoveringGuard;
impl RecoveringGuard {
    fn enter() -> Self {
        RECOVERING.with(|depth| depth.set(depth.get() + 1));
        RecoveringGuard
    }
}
impl Drop for RecoveringGuard {
    fn drop(&mut self) {
        RECOVERING.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Run `f`, converting a panic into an error.
///
/// Every place that invokes a deferred callable goes through here, so a panic
/// in a nested continuation is caught at the closest forcing call. Such panics
/// are logged instead of being printed by the panic hook.
pub(crate) fn recover<F>(f: F) -> Result<Value>
where
    F: FnOnce() -> Result<Value>,
{
    install_quiet_hook();
    let outcome = {
        let _guard = RecoveringGuard::enter();
        catch_unwind(AssertUnwindSafe(f))
    };
    match outcome {
        Ok(outcome) => outcome,
        Err(payload) => {
            let err = panic_payload_to_error(payload);
            tracing::warn!(error = %err, "recovered from a panic while forcing a deferred value");
            Err(err)
        }
    }
}

/// Text payloads become plain errors; error payloads are formatted.
fn panic_payload_to_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return anyhow!("{}", s);
    }
    let payload = match payload.downcast::<String>() {
        Ok(s) => return anyhow!("{}", s),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<anyhow::Error>() {
        Ok(err) => return formatted(&err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<FormattedError>() {
        Ok(err) => return anyhow::Error::new(*err),
        Err(payload) => payload,
    };
    match payload.downcast::<Box<dyn Error + Send + Sync>>() {
        Ok(err) => formatted(&anyhow!(err)),
        Err(_) => anyhow!("deferred value panicked with a non-text payload"),
    }
}

fn formatted(err: &anyhow::Error) -> anyhow::Error {
    anyhow::Error::new(format_error(err))
}
