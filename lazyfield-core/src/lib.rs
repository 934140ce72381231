//! Deferred values for query execution.
//!
//! Resolvers return a [`Value`], which may be a [`Thunk`]: a computation that
//! runs only when forced. The engine composes the results of many resolvers
//! with [`when_all`] and [`thunk_for_map`], chains follow-up work with
//! [`Thunk::then`] and [`Thunk::catch`], and calls [`Thunk::force`] once at
//! the boundary where it needs the data.
//!
//! Nothing here runs concurrently or remembers results. Forcing a thunk runs
//! it on the calling thread, every time.

pub mod aggregate;
pub mod error;
mod recover;
pub mod result;
pub mod thunk;
pub mod value;

pub use aggregate::{force_fields, thunk_for_map, when_all};
pub use error::{format_error, FormattedError, SourceLocation};
pub use result::ExecutionResult;
pub use thunk::{get_thunk, Deferred, DeferredFn, Thunk};
pub use value::{Fields, Value};
