use std::fmt;

use async_channel::Sender;

use super::{Resolution, Resolvable};

/// Settle `sender` with `layer` unless it already settled.
///
/// The channel has capacity one and is closed right after the first send, so
/// every later attempt fails and is dropped. The receiver can still take the
/// buffered layer after the close.
fn settle_once<V, E>(
    sender: &Sender<Resolution<V, E>>,
    layer: Resolution<V, E>,
    channel: &'static str,
) {
    match sender.try_send(layer) {
        Ok(()) => {
            sender.close();
        }
        Err(_) => tracing::trace!(channel, "outcome already settled, ignoring"),
    }
}

/// The success-setter handed to the resolver of [`AsyncResult::new`].
///
/// Cloneable, and may be called long after the resolver returned. Only the
/// first call to any setter of the same future has an effect.
///
/// [`AsyncResult::new`]: crate::future::AsyncResult::new
pub struct Resolve<V, E> {
    sender: Sender<Resolution<V, E>>,
}

impl<V, E> Resolve<V, E> {
    pub(super) fn new(sender: Sender<Resolution<V, E>>) -> Self {
        Self { sender }
    }

    /// Settle the value channel with `value`.
    ///
    /// `value` is taken as-is, even if it is itself a future. Use
    /// [`resolve_with`](Self::resolve_with) to have it unwrapped.
    pub fn resolve(&self, value: V) {
        settle_once(&self.sender, Resolution::Value(value), "value");
    }

    /// Settle with anything resolvable, unwrapping every nested layer.
    ///
    /// This call claims the future even when `source` is still pending;
    /// later setter calls are ignored. The outcome is whatever `source`
    /// settles to, on either channel.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::{AsyncResult, Native};
    /// use async_result::runtime::block_on;
    ///
    /// let fut = AsyncResult::<u8, &str>::new(|resolve, reject| {
    ///     resolve.resolve_with(Native::new(async { AsyncResult::<u8, &str>::ok(5) }));
    ///     reject.reject("too late");
    ///     Ok(())
    /// });
    /// assert_eq!(block_on(fut), Ok(5));
    /// ```
    pub fn resolve_with<R>(&self, source: R)
    where
        R: Resolvable<Value = V, Error = E>,
    {
        settle_once(&self.sender, source.into_resolution(), "value");
    }

    /// Returns `true` once the future was settled by any setter, or dropped.
    pub fn is_settled(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The failure-setter handed to the resolver of [`AsyncResult::new`].
///
/// See [`Resolve`] for the settlement rules.
///
/// [`AsyncResult::new`]: crate::future::AsyncResult::new
pub struct Reject<V, E> {
    sender: Sender<Resolution<V, E>>,
}

impl<V, E> Reject<V, E> {
    pub(super) fn new(sender: Sender<Resolution<V, E>>) -> Self {
        Self { sender }
    }

    /// Settle the error channel with `error`.
    pub fn reject(&self, error: E) {
        settle_once(&self.sender, Resolution::Error(error), "error");
    }

    /// Returns `true` once the future was settled by any setter, or dropped.
    pub fn is_settled(&self) -> bool {
        self.sender.is_closed()
    }
}

// Manual impls: deriving would require `V: Clone, E: Clone`.
impl<V, E> Clone for Resolve<V, E> {
    fn clone(&self) -> Self {
        Self::new(self.sender.clone())
    }
}

impl<V, E> Clone for Reject<V, E> {
    fn clone(&self) -> Self {
        Self::new(self.sender.clone())
    }
}

impl<V, E> fmt::Debug for Resolve<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<V, E> fmt::Debug for Reject<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use crate::future::{AsyncResult, Native, Resolve};
    use crate::runtime::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn resolve_with_unwraps_nested_outcomes() {
        let fut = AsyncResult::<u32, String>::new(|resolve, _reject| {
            let inner: AsyncResult<u32, String> =
                AsyncResult::resolve(Native::new(async { AsyncResult::<u32, String>::ok(7) }));
            resolve.resolve_with(Native::new(async move { inner }));
            Ok(())
        });
        assert_eq!(block_on(fut), Ok(7));
    }

    #[test]
    fn resolve_with_a_failing_source_rejects() {
        let fut = AsyncResult::<u32, String>::new(|resolve, _reject| {
            resolve.resolve_with(Native::new(async { Err::<u32, _>("nope".to_string()) }));
            Ok(())
        });
        assert_eq!(block_on(fut), Err("nope".to_string()));
    }

    #[test_log::test]
    fn pending_source_still_claims_the_future() {
        let slot: Rc<RefCell<Option<Resolve<u8, u8>>>> = Rc::default();
        let stash = slot.clone();
        let fut = AsyncResult::new(move |resolve, reject| {
            resolve.resolve_with(Native::new(async {
                futures_lite::future::yield_now().await;
                Ok::<u8, u8>(1)
            }));
            assert!(resolve.is_settled());
            reject.reject(2);
            *stash.borrow_mut() = Some(resolve);
            Ok(())
        });
        if let Some(resolve) = slot.borrow_mut().take() {
            resolve.resolve(3);
        }
        assert_eq!(block_on(fut), Ok(1));
    }

    #[test]
    fn plain_resolve_keeps_a_future_payload() {
        let fut = AsyncResult::<AsyncResult<u8, ()>, ()>::new(|resolve, _reject| {
            resolve.resolve(AsyncResult::ok(9));
            Ok(())
        });
        block_on(async {
            let payload = fut.await.unwrap();
            assert_eq!(payload.await, Ok(9));
        })
    }
}
