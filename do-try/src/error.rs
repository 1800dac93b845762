//! Structured errors synthesized by the adapter.
//!
//! A [DoTryError] is only created when the failure slot would otherwise be
//! unusable: the input could not be called, or the computation unwound with a
//! [Nullish] payload. Every other payload is passed through untouched.

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use crate::nullish::Nullish;

/// String code of [ErrorCode::NotAFunction].
pub const ERR_NOT_A_FUNCTION: &str = "ERR_NOT_A_FUNCTION";
/// String code of [ErrorCode::NullishValueThrown].
pub const ERR_NULLISH_VALUE_THROWN: &str = "ERR_NULLISH_VALUE_THROWN";
/// String code of [ErrorCode::NullishValueRejected].
pub const ERR_NULLISH_VALUE_REJECTED: &str = "ERR_NULLISH_VALUE_REJECTED";

/// Machine readable code of a [DoTryError].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The input handed to the adapter is not invocable.
    NotAFunction,
    /// The computation unwound with a nullish payload.
    NullishValueThrown,
    /// The future unwound with a nullish payload while being polled.
    NullishValueRejected,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 3] = [
        ErrorCode::NotAFunction,
        ErrorCode::NullishValueThrown,
        ErrorCode::NullishValueRejected,
    ];

    /// The stable string form, e.g. `ERR_NOT_A_FUNCTION`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotAFunction => ERR_NOT_A_FUNCTION,
            ErrorCode::NullishValueThrown => ERR_NULLISH_VALUE_THROWN,
            ErrorCode::NullishValueRejected => ERR_NULLISH_VALUE_REJECTED,
        }
    }

    /// The fixed human readable message for this code.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::NotAFunction => r#"The "fn" argument is not a function"#,
            ErrorCode::NullishValueThrown => "The nullish value has been thrown",
            ErrorCode::NullishValueRejected => "The nullish value has been rejected",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ErrorCode {
    type Error = ParseErrorCodeError;

    fn try_from(value: &str) -> Result<Self, ParseErrorCodeError> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == value)
            .ok_or_else(|| ParseErrorCodeError(value.to_string()))
    }
}

impl FromStr for ErrorCode {
    type Err = ParseErrorCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

/// Error parsing an [ErrorCode] from its string form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown do-try error code: {0}")]
pub struct ParseErrorCodeError(String);

#[cfg(feature = "serde")]
impl serde::Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let string: String = serde::Deserialize::deserialize(deserializer)?;

        string.as_str().try_into().map_err(serde::de::Error::custom)
    }
}

/// The value that led to a [DoTryError].
pub enum Cause {
    /// `null` was thrown or rejected.
    Null,
    /// `undefined` (or `()`) was thrown or rejected.
    Undefined,
    /// Any other value, kept as received.
    Value(Box<dyn Any + Send>),
}

impl Cause {
    /// Classify a type-erased value, mapping nullish payloads to their marker.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        match Nullish::of(payload.as_ref()) {
            Some(nullish) => nullish.into(),
            None => Cause::Value(payload),
        }
    }

    /// Returns the nullish marker if this cause is `Null` or `Undefined`.
    pub fn as_nullish(&self) -> Option<Nullish> {
        match self {
            Cause::Null => Some(Nullish::Null),
            Cause::Undefined => Some(Nullish::Undefined),
            Cause::Value(_) => None,
        }
    }

    /// Returns true for `Null` and `Undefined`.
    pub fn is_nullish(&self) -> bool {
        self.as_nullish().is_some()
    }

    /// Borrow the carried value as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Cause::Value(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Text of a `&'static str` or `String` value.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cause::Value(value) => payload_text(value.as_ref()),
            _ => None,
        }
    }
}

impl From<Nullish> for Cause {
    fn from(value: Nullish) -> Self {
        match value {
            Nullish::Null => Cause::Null,
            Nullish::Undefined => Cause::Undefined,
        }
    }
}

impl From<Box<dyn Any + Send>> for Cause {
    fn from(value: Box<dyn Any + Send>) -> Self {
        Cause::from_payload(value)
    }
}

impl Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Null => f.write_str("Null"),
            Cause::Undefined => f.write_str("Undefined"),
            Cause::Value(value) => match payload_text(value.as_ref()) {
                Some(text) => f.debug_tuple("Value").field(&text).finish(),
                None => f.debug_tuple("Value").field(&"..").finish(),
            },
        }
    }
}

/// Values compare equal when they are the same allocation, the same text,
/// or the same primitive value. Other opaque values are never equal.
impl PartialEq for Cause {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cause::Null, Cause::Null) | (Cause::Undefined, Cause::Undefined) => true,
            (Cause::Value(left), Cause::Value(right)) => payload_eq(&**left, &**right),
            _ => false,
        }
    }
}

macro_rules! scalar_eq {
    ($left:expr, $right:expr, $($ty:ty),+) => {
        $(
            if let (Some(left), Some(right)) =
                ($left.downcast_ref::<$ty>(), $right.downcast_ref::<$ty>())
            {
                return left == right;
            }
        )+
    };
}

fn payload_eq(left: &(dyn Any + Send), right: &(dyn Any + Send)) -> bool {
    if Any::type_id(left) == Any::type_id(right) && std::ptr::addr_eq(left, right) {
        return true;
    }

    if let (Some(left), Some(right)) = (payload_text(left), payload_text(right)) {
        return left == right;
    }

    scalar_eq!(
        left, right, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
    );

    if let (Some(left), Some(right)) = (left.downcast_ref::<f32>(), right.downcast_ref::<f32>()) {
        return left.to_bits() == right.to_bits();
    }
    if let (Some(left), Some(right)) = (left.downcast_ref::<f64>(), right.downcast_ref::<f64>()) {
        return left.to_bits() == right.to_bits();
    }

    false
}

/// Text carried by `panic!("..")` style payloads.
pub(crate) fn payload_text(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        return Some(*text);
    }

    payload.downcast_ref::<String>().map(String::as_str)
}

/// Error placed in the failure slot when no usable error value exists.
#[derive(Debug)]
pub struct DoTryError {
    code: ErrorCode,
    message: &'static str,
    cause: Cause,
    backtrace: Backtrace,
}

impl DoTryError {
    /// Create an error for `code`, carrying `cause`.
    pub fn new(code: ErrorCode, cause: impl Into<Cause>) -> Self {
        Self {
            code,
            message: code.message(),
            cause: cause.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// [ErrorCode::NotAFunction] for the received non-callable value.
    pub fn not_a_function(cause: impl Into<Cause>) -> Self {
        Self::new(ErrorCode::NotAFunction, cause)
    }

    /// [ErrorCode::NullishValueThrown] for a nullish unwinding payload.
    pub fn nullish_value_thrown(cause: Nullish) -> Self {
        Self::new(ErrorCode::NullishValueThrown, cause)
    }

    /// [ErrorCode::NullishValueRejected] for a nullish payload raised by a future.
    pub fn nullish_value_rejected(cause: Nullish) -> Self {
        Self::new(ErrorCode::NullishValueRejected, cause)
    }

    // === Getters ===

    /// Returns the machine readable code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the message derived from [Self::code].
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Returns the value that triggered this error.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Returns the backtrace captured on construction.
    ///
    /// Only resolved when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Take ownership of the cause.
    pub fn into_cause(self) -> Cause {
        self.cause
    }
}

impl Display for DoTryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for DoTryError {}

impl PartialEq for DoTryError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.message == other.message && self.cause == other.cause
    }
}
