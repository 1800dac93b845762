//! Invoke a computation and report how it went.

use std::any::Any;
use std::future::{Future, IntoFuture};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;

use crate::error::{Cause, DoTryError};
use crate::outcome::{ErrValue, UnknownError};
use crate::settle::Settle;

/// A type-erased zero argument computation, as accepted by [do_try_dyn].
pub type DynFn = Box<dyn FnOnce() -> Box<dyn Any + Send> + Send>;

/// A type-erased future, recognized when a [DynFn] returns one.
pub type DynFuture = Pin<Box<dyn Future<Output = Box<dyn Any + Send>> + Send>>;

/// What [do_try_dyn] hands back in place of a returned [DynFuture].
pub type DynSettle = Settle<DynFuture>;

/// Call `f` and capture its outcome.
///
/// - `f` returns `value`: `Ok(value)`, including `()`.
/// - `f` unwinds: `Err` holding the payload as it was raised, unless the
///   payload is [Nullish](crate::Nullish), in which case it holds a
///   [DoTryError] with [ErrorCode::NullishValueThrown](crate::ErrorCode::NullishValueThrown).
///
/// `f` is treated as unwind safe; state it shares with the caller may be
/// observed half-updated after a failure.
///
/// ```
/// use do_try::{do_try, raise};
///
/// assert_eq!(do_try(|| 4 / 2).unwrap(), 2);
///
/// let error = do_try(|| -> u8 { raise("x") }).unwrap_err();
/// assert_eq!(error.message(), Some("x"));
/// ```
pub fn do_try<F, T>(f: F) -> ErrValue<T>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(UnknownError::thrown)
}

/// Call `f` and capture the outcome of the future it returns.
///
/// Unwinding while calling `f` is reported the same way as [do_try] and the
/// returned [Settle] is settled immediately. Unwinding while the future is
/// polled resolves to `Err`, with nullish payloads reported as
/// [ErrorCode::NullishValueRejected](crate::ErrorCode::NullishValueRejected).
///
/// ```
/// # async fn example() {
/// use do_try::{do_try_async, ErrorCode, Nullish};
///
/// assert_eq!(do_try_async(|| async { 42 }).await.unwrap(), 42);
///
/// let error = do_try_async(|| async { Nullish::Null.raise() })
///     .await
///     .unwrap_err();
/// assert_eq!(error.code(), Some(ErrorCode::NullishValueRejected));
/// # }
/// ```
pub fn do_try_async<F, Fut>(f: F) -> Settle<Fut::IntoFuture>
where
    F: FnOnce() -> Fut,
    Fut: IntoFuture,
{
    match panic::catch_unwind(AssertUnwindSafe(|| f().into_future())) {
        Ok(future) => Settle::pending(future),
        Err(payload) => Settle::settled(Err(UnknownError::thrown(payload))),
    }
}

/// Box `f` so that [do_try_dyn] recognizes it as callable.
pub fn dyn_fn<F, T>(f: F) -> Box<dyn Any + Send>
where
    F: FnOnce() -> T + Send + 'static,
    T: Any + Send,
{
    let f: DynFn = Box::new(move || Box::new(f()) as Box<dyn Any + Send>);

    Box::new(f)
}

/// Box `f`, which returns a future, so that [do_try_dyn_async] can await it.
///
/// `f` itself runs when the value is called; its future returns a
/// [DynFuture] with the output boxed.
pub fn dyn_async_fn<F, Fut>(f: F) -> Box<dyn Any + Send>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Any + Send,
{
    dyn_fn(move || -> DynFuture {
        let future = f();
        Box::pin(async move { Box::new(future.await) as Box<dyn Any + Send> })
    })
}

enum DynCall {
    Value(Box<dyn Any + Send>),
    Future(DynFuture),
}

fn call_dyn(value: Box<dyn Any + Send>) -> ErrValue<DynCall> {
    let f = match value.downcast::<DynFn>() {
        Ok(f) => f,
        Err(value) => {
            let cause = Cause::from_payload(value);
            cross_log!(debug, "refusing to call {cause:?}, not a function");

            return Err(DoTryError::not_a_function(cause).into());
        }
    };

    let returned = do_try(*f)?;

    Ok(match returned.downcast::<DynFuture>() {
        Ok(future) => DynCall::Future(*future),
        Err(value) => DynCall::Value(value),
    })
}

/// [do_try] for a value of unknown type.
///
/// The value is called only if it is a [DynFn] (see [dyn_fn]); its result
/// stays boxed. Anything else is reported as
/// [ErrorCode::NotAFunction](crate::ErrorCode::NotAFunction) with the value as
/// the cause, without invoking anything.
///
/// A returned [DynFuture] is replaced by a [DynSettle] wrapping it, so its
/// failures are captured once it is awaited. Use [do_try_dyn_async] to await
/// it directly.
///
/// ```
/// use do_try::{do_try_dyn, ErrorCode};
///
/// let error = do_try_dyn(Box::new("not a function")).unwrap_err();
/// assert_eq!(error.code(), Some(ErrorCode::NotAFunction));
/// ```
pub fn do_try_dyn(value: Box<dyn Any + Send>) -> ErrValue<Box<dyn Any + Send>> {
    Ok(match call_dyn(value)? {
        DynCall::Value(value) => value,
        DynCall::Future(future) => Box::new(DynSettle::pending(future)) as Box<dyn Any + Send>,
    })
}

/// [do_try_dyn] that also settles a returned [DynFuture].
///
/// Plain return values, failed calls and non-callable values are settled
/// right away; a [DynFuture] is polled like in [do_try_async].
pub fn do_try_dyn_async(value: Box<dyn Any + Send>) -> DynSettle {
    match call_dyn(value) {
        Ok(DynCall::Future(future)) => Settle::pending(future),
        Ok(DynCall::Value(value)) => Settle::settled(Ok(value)),
        Err(error) => Settle::settled(Err(error)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::ErrorCode;
    use crate::nullish::{raise, Nullish};
    use crate::outcome::ErrValueExt;

    #[derive(Debug)]
    struct Custom(&'static str);

    async fn reject<E: Any + Send>(payload: E) -> u8 {
        tokio::task::yield_now().await;
        raise(payload)
    }

    #[test]
    fn returns_the_value() {
        assert_eq!(do_try(|| 4 / 2).unwrap(), 2);
        assert_eq!(do_try(|| None::<u8>).unwrap(), None);

        let (error, value) = do_try(|| ()).into_tuple();
        assert!(error.is_none());
        assert_eq!(value, Some(()));
    }

    #[test]
    fn panics_are_captured() {
        let error = do_try(|| -> u8 { panic!("Something went wrong") }).unwrap_err();

        assert!(error.as_do_try_error().is_none());
        assert_eq!(error.message(), Some("Something went wrong"));
    }

    #[test]
    fn keeps_the_raised_value() {
        let raised = Arc::new(Custom("x"));
        let cloned = Arc::clone(&raised);

        let (error, value) = do_try(move || -> u8 { raise(cloned) }).into_tuple();
        assert!(value.is_none());

        let error = error.unwrap().downcast::<Arc<Custom>>().unwrap();
        assert!(Arc::ptr_eq(&error, &raised));
        assert_eq!(error.0, "x");
    }

    #[test]
    fn nullish_throws() {
        let error = do_try(|| -> u8 { Nullish::Null.raise() }).unwrap_err();
        assert_eq!(
            error.as_do_try_error(),
            Some(&DoTryError::nullish_value_thrown(Nullish::Null))
        );

        let error = do_try(|| -> u8 { Nullish::Undefined.raise() }).unwrap_err();
        assert_eq!(
            error.as_do_try_error(),
            Some(&DoTryError::nullish_value_thrown(Nullish::Undefined))
        );

        let error = do_try(|| -> u8 { raise(()) }).unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::NullishValueThrown));
    }

    #[test]
    fn calls_once() {
        let calls = AtomicUsize::new(0);

        let result = do_try(|| calls.fetch_add(1, Ordering::SeqCst));
        assert_eq!(result.unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dyn_not_a_function() {
        let error = do_try_dyn(Box::new("not a function")).unwrap_err();

        assert_eq!(
            error.as_do_try_error(),
            Some(&DoTryError::not_a_function(Cause::Value(Box::new(
                "not a function"
            ))))
        );

        let error = do_try_dyn(Box::new(Nullish::Null)).unwrap_err();
        let error = error.as_do_try_error().unwrap();
        assert_eq!(error.code(), ErrorCode::NotAFunction);
        assert_eq!(error.cause(), &Cause::Null);
    }

    #[test]
    fn dyn_callable() {
        let value = do_try_dyn(dyn_fn(|| 42_u8)).unwrap();
        assert_eq!(value.downcast_ref::<u8>(), Some(&42));

        let error = do_try_dyn(dyn_fn(|| -> u8 { Nullish::Null.raise() })).unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::NullishValueThrown));
    }

    #[test]
    fn dyn_equal_errors_for_the_same_input() {
        let first = do_try_dyn(Box::new(42_i64)).unwrap_err();
        let second = do_try_dyn(Box::new(42_i64)).unwrap_err();

        let first = first.as_do_try_error().unwrap();
        assert_eq!(first, second.as_do_try_error().unwrap());
        assert!(first.eq(first));
        assert_eq!(first.cause().downcast_ref::<i64>(), Some(&42));
    }

    #[tokio::test]
    async fn dyn_async_fulfilled() {
        let value = do_try_dyn_async(dyn_async_fn(|| async { 42_u8 }))
            .await
            .unwrap();
        assert_eq!(value.downcast_ref::<u8>(), Some(&42));

        let attempt = do_try_dyn_async(dyn_fn(|| 7_u8));
        assert!(attempt.is_settled());
        assert_eq!(attempt.await.unwrap().downcast_ref::<u8>(), Some(&7));
    }

    #[tokio::test]
    async fn dyn_async_rejected() {
        let error = do_try_dyn_async(dyn_async_fn(|| reject("rejected")))
            .await
            .unwrap_err();
        assert!(error.as_do_try_error().is_none());
        assert_eq!(error.message(), Some("rejected"));

        let error = do_try_dyn_async(dyn_async_fn(|| reject(Nullish::Null)))
            .await
            .unwrap_err();
        assert_eq!(
            error.as_do_try_error(),
            Some(&DoTryError::nullish_value_rejected(Nullish::Null))
        );
    }

    #[tokio::test]
    async fn dyn_async_thrown_and_not_callable() {
        let attempt = do_try_dyn_async(dyn_async_fn(|| -> std::future::Ready<u8> {
            Nullish::Undefined.raise()
        }));
        assert!(attempt.is_settled());
        assert_eq!(
            attempt.await.unwrap_err().code(),
            Some(ErrorCode::NullishValueThrown)
        );

        let error = do_try_dyn_async(Box::new(1_u8)).await.unwrap_err();
        assert_eq!(error.code(), Some(ErrorCode::NotAFunction));
    }

    #[tokio::test]
    async fn dyn_returned_future_is_settled_on_await() {
        let value = do_try_dyn(dyn_async_fn(|| reject(Nullish::Undefined))).unwrap();
        let settle = value.downcast::<DynSettle>().unwrap();

        let error = settle.await.unwrap_err();
        assert_eq!(
            error.as_do_try_error(),
            Some(&DoTryError::nullish_value_rejected(Nullish::Undefined))
        );
    }

    #[test]
    fn division_example() {
        fn div(a: i32, b: i32) -> i32 {
            if b != 0 {
                return a / b;
            }
            if a != 0 {
                raise("Division by Zero")
            }
            raise("Indeterminate Form")
        }

        let (err_x, x) = do_try(|| div(4, 2)).into_tuple();
        let (err_y, y) = do_try(|| div(-4, 0)).into_tuple();
        let (err_z, z) = do_try(|| div(0, 0)).into_tuple();

        assert!(err_x.is_none());
        assert_eq!(x, Some(2));
        assert_eq!(err_y.unwrap().message(), Some("Division by Zero"));
        assert_eq!(y, None);
        assert_eq!(err_z.unwrap().message(), Some("Indeterminate Form"));
        assert_eq!(z, None);
    }
}
