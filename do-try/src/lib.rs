#![doc = include_str!("../README.md")]
//!

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

#[macro_use]
mod macros;

mod attempt;
pub mod error;
mod nullish;
mod outcome;
mod settle;

pub mod prelude;

// --- PUBLIC API EXPORTS ---
// Adapter
pub use attempt::{
    do_try, do_try_async, do_try_dyn, do_try_dyn_async, dyn_async_fn, dyn_fn, DynFn, DynFuture,
    DynSettle,
};
pub use settle::{settle, Settle};

// Results
pub use outcome::{failure, success, ErrValue, ErrValueExt, UnknownError};

// Errors
pub use error::{
    Cause, DoTryError, ErrorCode, ParseErrorCodeError, ERR_NOT_A_FUNCTION,
    ERR_NULLISH_VALUE_REJECTED, ERR_NULLISH_VALUE_THROWN,
};
pub use nullish::{raise, Nullish};
