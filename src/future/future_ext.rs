use core::future::Future;

use super::{AsyncResult, Native};

/// Extend `Future` with conversions into two-channel outcomes.
pub trait FutureExt: Future {
    /// Adopt a future whose output is a `Result` as an [`AsyncResult`].
    ///
    /// The output is taken as-is, no unwrapping happens.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::prelude::*;
    /// use async_result::runtime::block_on;
    ///
    /// let out = async { "42".parse::<u8>() }
    ///     .into_async_result()
    ///     .map_err(|e| Ok(e.to_string()))
    ///     .then(|n| Ok(n + 1));
    /// assert_eq!(block_on(out), Ok(43));
    /// ```
    fn into_async_result<V, E>(self) -> AsyncResult<V, E>
    where
        Self: Future<Output = Result<V, E>> + Sized + 'static,
        V: 'static,
        E: 'static,
    {
        AsyncResult::from_future(self)
    }

    /// Treat this future as one layer of an outcome.
    ///
    /// Its output is resolved again once it completes, which is how a native
    /// future is returned from a handler or passed to
    /// [`AsyncResult::resolve`].
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::prelude::*;
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let out = AsyncResult::<u8, ()>::ok(2).then(|x| async move { Ok::<_, ()>(x * 3) }.native());
    /// assert_eq!(block_on(out), Ok(6));
    /// ```
    fn native(self) -> Native<Self>
    where
        Self: Sized,
    {
        Native::new(self)
    }
}

impl<T> FutureExt for T where T: Future {}
