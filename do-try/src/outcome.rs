//! The error/value result of one attempt.

use std::any::Any;
use std::fmt::{self, Debug};
use std::panic;

use crate::error::{payload_text, DoTryError, ErrorCode};
use crate::nullish::Nullish;

/// Result of one attempt: `Ok(value)` or `Err(error)`.
///
/// The error slot is never nullish, so the variant alone tells success from
/// failure even when the value itself is `()` or `None`.
pub type ErrValue<T> = Result<T, UnknownError>;

/// Build a successful [ErrValue].
pub fn success<T>(value: T) -> ErrValue<T> {
    Ok(value)
}

/// Build a failed [ErrValue].
pub fn failure<T>(error: impl Into<UnknownError>) -> ErrValue<T> {
    Err(error.into())
}

/// Whatever a computation failed with.
///
/// Never holds a nullish value. `Raised` can only be built inside this crate;
/// use [UnknownError::new] or [UnknownError::from_payload], which classify
/// the value first.
///
/// ```compile_fail
/// use do_try::{Nullish, UnknownError};
///
/// let error = UnknownError::Raised(Box::new(Nullish::Null));
/// ```
#[derive(thiserror::Error)]
pub enum UnknownError {
    /// The original unwinding payload, exactly as it was raised.
    #[error("{}", raised_message(.0))]
    #[non_exhaustive]
    Raised(Box<dyn Any + Send>),
    /// Synthesized when no usable error value was available.
    #[error(transparent)]
    DoTry(#[from] DoTryError),
}

#[allow(clippy::borrowed_box, reason = "called from the thiserror format args")]
fn raised_message(payload: &Box<dyn Any + Send>) -> &str {
    payload_text(payload.as_ref()).unwrap_or("opaque unwinding payload")
}

impl UnknownError {
    /// Wrap an arbitrary error value.
    ///
    /// A nullish value becomes a [DoTryError] with
    /// [ErrorCode::NullishValueThrown], the same as unwinding with it.
    pub fn new<E: Any + Send>(error: E) -> Self {
        Self::from_payload(Box::new(error))
    }

    /// Wrap a type-erased value, as returned by `std::panic::catch_unwind`.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Self::thrown(payload)
    }

    pub(crate) fn thrown(payload: Box<dyn Any + Send>) -> Self {
        Self::caught(payload, ErrorCode::NullishValueThrown)
    }

    pub(crate) fn rejected(payload: Box<dyn Any + Send>) -> Self {
        Self::caught(payload, ErrorCode::NullishValueRejected)
    }

    /// Classify a caught payload; nullish ones are replaced by a `code` error.
    fn caught(payload: Box<dyn Any + Send>, code: ErrorCode) -> Self {
        if let Some(nullish) = Nullish::of(payload.as_ref()) {
            cross_log!(debug, "caught {nullish} payload, reporting {code}");
            return UnknownError::DoTry(DoTryError::new(code, nullish));
        }

        match payload.downcast::<DoTryError>() {
            Ok(error) => UnknownError::DoTry(*error),
            Err(payload) => {
                cross_log!(
                    trace,
                    "caught payload: {}",
                    payload_text(payload.as_ref()).unwrap_or("<opaque>")
                );
                UnknownError::Raised(payload)
            }
        }
    }

    // === Getters ===

    /// Returns true if the error is an `E`.
    pub fn is<E: Any>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    /// Borrow the error as an `E`.
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        match self {
            UnknownError::Raised(payload) => payload.downcast_ref::<E>(),
            UnknownError::DoTry(error) => (error as &dyn Any).downcast_ref::<E>(),
        }
    }

    /// Take the error as an `E`, or get `self` back.
    pub fn downcast<E: Any>(self) -> Result<E, Self> {
        self.into_payload()
            .downcast::<E>()
            .map(|error| *error)
            .map_err(Self::from_payload)
    }

    /// Returns the structured error, if one was synthesized.
    pub fn as_do_try_error(&self) -> Option<&DoTryError> {
        match self {
            UnknownError::DoTry(error) => Some(error),
            UnknownError::Raised(_) => None,
        }
    }

    /// Returns the structured error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.as_do_try_error().map(DoTryError::code)
    }

    /// Returns the text of a `panic!("..")` payload, or the structured message.
    pub fn message(&self) -> Option<&str> {
        match self {
            UnknownError::Raised(payload) => payload_text(payload.as_ref()),
            UnknownError::DoTry(error) => Some(error.message()),
        }
    }

    // === Public Methods ===

    /// Convert back into a type-erased payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        match self {
            UnknownError::Raised(payload) => payload,
            UnknownError::DoTry(error) => Box::new(error),
        }
    }

    /// Resume unwinding with the error as payload.
    pub fn resume(self) -> ! {
        panic::resume_unwind(self.into_payload())
    }
}

impl From<Box<dyn Any + Send>> for UnknownError {
    fn from(value: Box<dyn Any + Send>) -> Self {
        Self::from_payload(value)
    }
}

impl Debug for UnknownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownError::Raised(payload) => f
                .debug_tuple("Raised")
                .field(&payload_text(payload.as_ref()).unwrap_or(".."))
                .finish(),
            UnknownError::DoTry(error) => f.debug_tuple("DoTry").field(error).finish(),
        }
    }
}

/// Two-slot view of an [ErrValue].
pub trait ErrValueExt<T> {
    /// `(None, Some(value))` on success, `(Some(error), None)` on failure.
    fn into_tuple(self) -> (Option<UnknownError>, Option<T>);
}

impl<T> ErrValueExt<T> for ErrValue<T> {
    fn into_tuple(self) -> (Option<UnknownError>, Option<T>) {
        match self {
            Ok(value) => (None, Some(value)),
            Err(error) => (Some(error), None),
        }
    }
}
