//! Future side of the adapter.

use std::fmt::{self, Debug};
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::future::{CatchUnwind, FutureExt};
use pin_project_lite::pin_project;

use crate::attempt::do_try_async;
use crate::outcome::{ErrValue, UnknownError};

pin_project! {
    /// Future resolving to the [ErrValue] of a wrapped future.
    ///
    /// Returned by [do_try_async](crate::do_try_async) and [settle]. It never
    /// unwinds for failures of the wrapped computation: a payload raised while
    /// polling is reported as `Err`, nullish ones as
    /// [ErrorCode::NullishValueRejected](crate::ErrorCode::NullishValueRejected).
    ///
    /// When creating the future already failed, the result is available right
    /// away through [Settle::into_settled] without polling.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct Settle<Fut>
    where
        Fut: Future,
    {
        settled: Option<ErrValue<Fut::Output>>,
        #[pin]
        pending: Option<CatchUnwind<AssertUnwindSafe<Fut>>>,
    }
}

impl<Fut: Future> Settle<Fut> {
    pub(crate) fn pending(future: Fut) -> Self {
        Self {
            settled: None,
            pending: Some(AssertUnwindSafe(future).catch_unwind()),
        }
    }

    pub(crate) fn settled(result: ErrValue<Fut::Output>) -> Self {
        Self {
            settled: Some(result),
            pending: None,
        }
    }

    /// Returns true if the result is known without polling.
    pub fn is_settled(&self) -> bool {
        self.pending.is_none() && self.settled.is_some()
    }

    /// Take the result if it is known without polling, or get `self` back.
    pub fn into_settled(mut self) -> Result<ErrValue<Fut::Output>, Self> {
        if self.pending.is_some() {
            return Err(self);
        }

        match self.settled.take() {
            Some(result) => Ok(result),
            None => Err(self),
        }
    }
}

impl<Fut: Future> Future for Settle<Fut> {
    type Output = ErrValue<Fut::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if let Some(pending) = this.pending.as_mut().as_pin_mut() {
            let outcome = ready!(pending.poll(cx));
            this.pending.set(None);

            return Poll::Ready(outcome.map_err(UnknownError::rejected));
        }

        Poll::Ready(
            this.settled
                .take()
                .expect("`Settle` polled after completion"),
        )
    }
}

impl<Fut: Future> Debug for Settle<Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settle")
            .field("pending", &self.pending.is_some())
            .field("settled", &self.settled.is_some())
            .finish()
    }
}

/// Adapt an already obtained future.
///
/// Same as `do_try_async(move || future)`.
pub fn settle<F: IntoFuture>(future: F) -> Settle<F::IntoFuture> {
    do_try_async(move || future)
}
