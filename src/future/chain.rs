//! The channel-aware bind and its error-side specializations.

use super::{AsyncResult, Resolvable};

impl<V: 'static, E: 'static> AsyncResult<V, E> {
    /// Continue with the value channel.
    ///
    /// On success `on_ok` receives the value and whatever it returns is
    /// resolved (and unwrapped) into the new outcome. On failure the error is
    /// forwarded unchanged and `on_ok` is never called.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let out = AsyncResult::<i32, ()>::ok(4)
    ///     .then(|x| Ok(x + 2))
    ///     .then(|x| AsyncResult::ok(x * 2));
    /// assert_eq!(block_on(out), Ok(12));
    /// ```
    pub fn then<F, R>(self, on_ok: F) -> AsyncResult<R::Value, E>
    where
        F: FnOnce(V) -> R + 'static,
        R: Resolvable<Error = E>,
        R::Value: 'static,
    {
        self.then_else(on_ok, Err)
    }

    /// Continue with whichever channel settled.
    ///
    /// Exactly one of the two handlers is called. Both must resolve to the
    /// same pair of channel types.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let out: AsyncResult<i32, i32> = AsyncResult::<i32, i32>::reject(4).then_else(|_| Ok(0), |x| Ok(x * 2));
    /// assert_eq!(block_on(out), Ok(8));
    /// ```
    pub fn then_else<F, G, R1, R2>(self, on_ok: F, on_err: G) -> AsyncResult<R1::Value, R1::Error>
    where
        F: FnOnce(V) -> R1 + 'static,
        G: FnOnce(E) -> R2 + 'static,
        R1: Resolvable,
        R2: Resolvable<Value = R1::Value, Error = R1::Error>,
        R1::Value: 'static,
        R1::Error: 'static,
    {
        AsyncResult::from_future(async move {
            let next = match self.await {
                Ok(value) => on_ok(value).into_resolution(),
                Err(error) => on_err(error).into_resolution(),
            };
            next.settle().await
        })
    }

    /// Recover from the error channel.
    ///
    /// A value passes straight through. An error is handed to `on_err`,
    /// whose return is resolved into the new outcome: `Ok` recovers, `Err`
    /// (or a failing future) fails again, possibly with another error type.
    pub fn catch<F, R>(self, on_err: F) -> AsyncResult<V, R::Error>
    where
        F: FnOnce(E) -> R + 'static,
        R: Resolvable<Value = V>,
        R::Error: 'static,
    {
        self.then_else(Ok, on_err)
    }

    /// Transform the error channel.
    ///
    /// A value passes straight through. An error is handed to `f` and the
    /// result is resolved; whichever channel that lands on, its payload
    /// becomes the new error. This lets `f` itself be asynchronous or fail.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let out = AsyncResult::<(), i32>::reject(3).map_err(|e| Ok(format!("code {e}")));
    /// assert_eq!(block_on(out), Err("code 3".to_string()));
    /// ```
    pub fn map_err<F, R, E2>(self, f: F) -> AsyncResult<V, E2>
    where
        F: FnOnce(E) -> R + 'static,
        R: Resolvable<Value = E2, Error = E2>,
        E2: 'static,
    {
        AsyncResult::from_future(async move {
            match self.await {
                Ok(value) => Ok(value),
                Err(error) => match f(error).into_resolution().settle().await {
                    Ok(error) | Err(error) => Err(error),
                },
            }
        })
    }
}
