use std::fmt;
use std::future::{pending, Future};
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::future::BoxedLocal;
use futures_lite::FutureExt as _;

use super::resolver::{Reject, Resolve};
use super::{Resolution, Resolvable};

/// A future that settles into exactly one of two typed channels.
///
/// `AsyncResult<V, E>` is a `Future<Output = Result<V, E>>`: the value
/// channel is `Ok(V)` and the error channel is `Err(E)`. Every combinator
/// consumes the future and returns a new one, so a settled outcome is never
/// mutated.
///
/// Handlers passed to combinators return any [`Resolvable`]. Returning
/// `Ok(value)` settles the value channel, returning `Err(error)` fails, and
/// returning another future (an `AsyncResult`, a [`Native`] future, ...) is
/// unwrapped layer by layer until a payload surfaces.
///
/// # Example
///
/// ```
/// use async_result::future::AsyncResult;
/// use async_result::runtime::block_on;
///
/// let out = block_on(
///     AsyncResult::<u32, String>::ok(200)
///         .guard(|status| *status == 200, "unexpected status".to_string())
///         .then(|status| Ok(format!("status {status}")))
///         .pair(),
/// );
/// assert_eq!(out, Ok((Some("status 200".to_string()), None)));
/// ```
///
/// [`Native`]: crate::future::Native
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct AsyncResult<V, E> {
    /// The outermost layer not peeled yet.
    layer: Resolution<V, E>,
}

// `V` and `E` are only ever moved, never pinned.
impl<V, E> Unpin for AsyncResult<V, E> {}

impl<V: 'static, E: 'static> AsyncResult<V, E> {
    /// Create a future settled by a resolver callback.
    ///
    /// The resolver runs immediately and receives a success-setter and a
    /// failure-setter. Either may be stored and called later; the first call
    /// settles the future and every later call is ignored. Returning `Err`
    /// from the resolver rejects the future, unless a setter got there
    /// first. If every setter is dropped without being called, the future
    /// never settles.
    ///
    /// [`Resolve::resolve`] takes the value as-is. To settle with another
    /// future and have it unwrapped like [`resolve`](Self::resolve) does,
    /// use [`Resolve::resolve_with`].
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let fut = AsyncResult::<u8, &str>::new(|resolve, _reject| {
    ///     resolve.resolve(1);
    ///     resolve.resolve(2);
    ///     Ok(())
    /// });
    /// assert_eq!(block_on(fut), Ok(1));
    /// ```
    pub fn new<F>(resolver: F) -> Self
    where
        F: FnOnce(Resolve<V, E>, Reject<V, E>) -> Result<(), E>,
    {
        let (sender, receiver) = async_channel::bounded(1);
        let reject = Reject::new(sender.clone());
        if let Err(error) = resolver(Resolve::new(sender.clone()), reject.clone()) {
            reject.reject(error);
        }
        drop((sender, reject));

        Self::from_layer(Resolution::Pending(
            async move {
                match receiver.recv().await {
                    Ok(layer) => layer,
                    // Every setter was dropped without settling.
                    Err(_) => pending().await,
                }
            }
            .boxed_local(),
        ))
    }

    /// Resolve `value`, unwrapping every nested layer.
    ///
    /// Nested futures are awaited one layer at a time until a plain payload
    /// surfaces on the value channel. The first layer that fails stops the
    /// unwrapping, and its raw error becomes this future's error.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::{AsyncResult, Native};
    /// use async_result::runtime::block_on;
    ///
    /// let nested = Native::new(async {
    ///     AsyncResult::resolve(Native::new(async { Ok::<_, ()>(4) }))
    /// });
    /// assert_eq!(block_on(AsyncResult::resolve(nested)), Ok(4));
    /// ```
    pub fn resolve<R>(value: R) -> Self
    where
        R: Resolvable<Value = V, Error = E>,
    {
        Self::from_layer(value.into_resolution())
    }

    /// A future already settled on the value channel.
    pub fn ok(value: V) -> Self {
        Self::from_layer(Resolution::Value(value))
    }

    /// A future settled on the error channel with `error`, verbatim.
    ///
    /// Unlike [`resolve`](Self::resolve), nothing is unwrapped: rejecting
    /// with a future makes that future itself the error payload.
    pub fn reject(error: E) -> Self {
        Self::from_layer(Resolution::Error(error))
    }

    /// Resolve a direct value.
    ///
    /// Equivalent to [`resolve`](Self::resolve). To have a callable invoked
    /// first, use [`from_fn`](Self::from_fn).
    #[allow(clippy::should_implement_trait)]
    pub fn from<R>(source: R) -> Self
    where
        R: Resolvable<Value = V, Error = E>,
    {
        Self::resolve(source)
    }

    /// Invoke `thunk` right away and resolve what it returns.
    ///
    /// A thunk returning `Err` rejects the future; a thunk returning a
    /// future is unwrapped like [`resolve`](Self::resolve) does.
    pub fn from_fn<F, R>(thunk: F) -> Self
    where
        F: FnOnce() -> R,
        R: Resolvable<Value = V, Error = E>,
    {
        Self::resolve(thunk())
    }

    /// Adopt a native future whose output already is a `Result`.
    ///
    /// The output is taken as-is: a `V` that happens to be a future is not
    /// unwrapped.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<V, E>> + 'static,
    {
        Self::from_layer(Resolution::Pending(
            async move { Resolution::from(future.await) }.boxed_local(),
        ))
    }

    fn from_layer(layer: Resolution<V, E>) -> Self {
        Self { layer }
    }

    /// A future that never settles.
    ///
    /// See also the [`NEVER`](crate::future::NEVER) constant.
    pub fn never() -> Self {
        Self::from_layer(Resolution::Pending(pending().boxed_local()))
    }

    /// Returns the outcome as a single boxed native future.
    pub fn into_inner(self) -> BoxedLocal<Result<V, E>> {
        self.boxed_local()
    }
}

impl<E: 'static> AsyncResult<(), E> {
    /// A future already settled with `()` on the value channel.
    ///
    /// See also the [`EMPTY`](crate::future::EMPTY) constant.
    pub fn empty() -> Self {
        Self::ok(())
    }
}

/// Peels pending layers in a loop, so nesting depth never grows the stack.
///
/// Polling again after completion stays pending.
impl<V: 'static, E: 'static> Future for AsyncResult<V, E> {
    type Output = Result<V, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            let spent = Resolution::Pending(pending().boxed_local());
            match mem::replace(&mut this.layer, spent) {
                Resolution::Value(value) => return Poll::Ready(Ok(value)),
                Resolution::Error(error) => return Poll::Ready(Err(error)),
                Resolution::Pending(mut layer) => match layer.as_mut().poll(cx) {
                    Poll::Ready(next) => this.layer = next,
                    Poll::Pending => {
                        this.layer = Resolution::Pending(layer);
                        return Poll::Pending;
                    }
                },
            }
        }
    }
}

impl<V: 'static, E: 'static> Resolvable for AsyncResult<V, E> {
    type Value = V;
    type Error = E;

    /// Hands over the unpeeled layer, so nested outcomes share one loop.
    fn into_resolution(self) -> Resolution<V, E> {
        self.layer
    }
}

impl<V, E> fmt::Debug for AsyncResult<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResult").finish_non_exhaustive()
    }
}
