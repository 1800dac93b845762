//! Nullish payloads and raising values.

use std::any::Any;
use std::fmt::{self, Display};
use std::panic;

/// The absence-of-value markers that can not stand in the failure slot.
///
/// Unwinding with a [Nullish] payload, or with `()`, is treated as throwing
/// `null`/`undefined`: the adapter replaces it with a
/// [DoTryError](crate::DoTryError) carrying the marker as its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullish {
    /// `null`
    Null,
    /// `undefined`
    Undefined,
}

impl Nullish {
    /// Returns the marker a payload stands for, if it is nullish.
    pub fn of(payload: &(dyn Any + Send)) -> Option<Nullish> {
        if let Some(nullish) = payload.downcast_ref::<Nullish>() {
            return Some(*nullish);
        }

        payload.is::<()>().then_some(Nullish::Undefined)
    }

    /// Unwind with this marker as payload.
    pub fn raise(self) -> ! {
        raise(self)
    }
}

impl Display for Nullish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nullish::Null => f.write_str("null"),
            Nullish::Undefined => f.write_str("undefined"),
        }
    }
}

/// Unwind with `value` as the payload.
///
/// Unlike `panic!`, this does not run the panic hook, so nothing is printed
/// when the unwind is caught by [do_try](crate::do_try).
pub fn raise<E: Any + Send>(value: E) -> ! {
    panic::resume_unwind(Box::new(value))
}
