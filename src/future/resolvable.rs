use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::ready;
use futures_lite::future::BoxedLocal;
use futures_lite::FutureExt as _;
use pin_project_lite::pin_project;

/// One layer of an outcome that may still need unwrapping.
///
/// A `Resolution` is either settled on one of the two channels, or it is a
/// pending future which, once it completes, yields the next layer. Deep
/// unwrapping ([`Resolution::settle`]) peels `Pending` layers one at a time
/// until a `Value` or an `Error` surfaces.
pub enum Resolution<V, E> {
    /// Settled on the value channel.
    Value(V),
    /// Settled on the error channel. Errors are never unwrapped further.
    Error(E),
    /// Not settled yet; completes with the next layer.
    Pending(BoxedLocal<Resolution<V, E>>),
}

impl<V, E> Resolution<V, E> {
    /// Unwrap layer by layer until one of the channels holds a payload.
    ///
    /// This is an iterative loop rather than recursion, so arbitrarily deep
    /// nesting does not grow the stack. There is no cycle detection: a layer
    /// that (indirectly) resolves to itself never settles.
    pub async fn settle(self) -> Result<V, E> {
        let mut next = self;
        let mut layers = 0usize;
        loop {
            next = match next {
                Resolution::Value(value) => break Ok(value),
                Resolution::Error(error) => break Err(error),
                Resolution::Pending(layer) => {
                    layers += 1;
                    if layers > 1 {
                        tracing::trace!(layers, "unwrapping nested pending layer");
                    }
                    layer.await
                }
            };
        }
    }

    /// Returns `true` if this layer already holds a payload.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Resolution::Pending(_))
    }
}

impl<V, E> From<Result<V, E>> for Resolution<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Resolution::Value(value),
            Err(error) => Resolution::Error(error),
        }
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for Resolution<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolution::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Resolution::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Anything that can be resolved into a two-channel outcome.
///
/// This is the capability every handler return value, constructor input and
/// sequencing member must have. Implementations hand back a single
/// [`Resolution`] layer; deep unwrapping takes care of the rest.
///
/// - `Result<V, E>`: `Ok` settles the value channel, `Err` the error channel.
///   Returning `Err` from a handler is how a handler fails.
/// - [`Resolution`]: used as-is.
/// - [`AsyncResult`](crate::future::AsyncResult) and
///   [`Shared`](crate::future::Shared): a pending layer.
/// - [`Native<F>`]: a native future whose output is itself `Resolvable`.
///
/// Closures are never `Resolvable`: they are only invoked by
/// [`AsyncResult::from_fn`](crate::future::AsyncResult::from_fn).
pub trait Resolvable {
    /// The payload of the value channel.
    type Value;
    /// The payload of the error channel.
    type Error;

    /// Convert into the first layer of the outcome.
    fn into_resolution(self) -> Resolution<Self::Value, Self::Error>;
}

impl<V, E> Resolvable for Result<V, E> {
    type Value = V;
    type Error = E;

    fn into_resolution(self) -> Resolution<V, E> {
        self.into()
    }
}

impl<V, E> Resolvable for Resolution<V, E> {
    type Value = V;
    type Error = E;

    fn into_resolution(self) -> Resolution<V, E> {
        self
    }
}

pin_project! {
    /// A native future treated as one layer of an outcome.
    ///
    /// The future's output is resolved again once it completes, so
    /// `Native(async { AsyncResult::ok(1) })` unwraps all the way to `1`.
    ///
    /// This `struct` is created by the [`native`] method on [`FutureExt`], or
    /// by [`Native::new`].
    ///
    /// [`native`]: crate::future::FutureExt::native
    /// [`FutureExt`]: crate::future::FutureExt
    #[derive(Debug)]
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Native<F> {
        #[pin]
        future: F,
    }
}

impl<F> Native<F> {
    /// Wrap a native future.
    pub fn new(future: F) -> Self {
        Self { future }
    }

    /// Unwrap the native future.
    pub fn into_inner(self) -> F {
        self.future
    }
}

impl<F> Future for Native<F>
where
    F: Future,
    F::Output: Resolvable,
{
    type Output = Resolution<<F::Output as Resolvable>::Value, <F::Output as Resolvable>::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let output = ready!(this.future.poll(cx));
        Poll::Ready(output.into_resolution())
    }
}

impl<F> Resolvable for Native<F>
where
    F: Future + 'static,
    F::Output: Resolvable,
{
    type Value = <F::Output as Resolvable>::Value;
    type Error = <F::Output as Resolvable>::Error;

    fn into_resolution(self) -> Resolution<Self::Value, Self::Error> {
        Resolution::Pending(self.boxed_local())
    }
}
