//! Common imports for quick starts.

// Adapter
pub use crate::{do_try, do_try_async, settle};

// Results
pub use crate::{ErrValue, ErrValueExt, UnknownError};

// Errors
pub use crate::{DoTryError, ErrorCode, Nullish};
