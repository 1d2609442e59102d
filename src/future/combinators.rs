//! Combinators derived from [`AsyncResult::then_else`] and [`AsyncResult::map_err`].

use std::convert::Infallible;

use super::{AsyncResult, Resolvable};

impl<V: 'static, E: 'static> AsyncResult<V, E> {
    /// Run a side effect on the value.
    ///
    /// The value passes through unchanged once the effect succeeds. If the
    /// effect fails, the future fails with the effect's error. Errors skip
    /// the effect entirely.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let out = AsyncResult::<_, ()>::ok(3).tap(|x| {
    ///     println!("raw data: {x}");
    ///     Ok(())
    /// });
    /// assert_eq!(block_on(out), Ok(3));
    /// ```
    pub fn tap<F, R>(self, f: F) -> Self
    where
        F: FnOnce(&V) -> R + 'static,
        R: Resolvable<Error = E>,
        R::Value: 'static,
    {
        self.then(move |value| {
            let effect = f(&value);
            AsyncResult::resolve(effect).then(move |_| Ok(value))
        })
    }

    /// Run a side effect on the error.
    ///
    /// Values pass through untouched. If the effect itself fails, its error
    /// **replaces** the original one, which is dropped.
    pub fn tap_err<F, R>(self, f: F) -> Self
    where
        F: FnOnce(&E) -> R + 'static,
        R: Resolvable<Error = E>,
        R::Value: 'static,
    {
        self.map_err(move |error| {
            let effect = f(&error);
            AsyncResult::resolve(effect).then(move |_| Ok(error))
        })
    }

    /// Substitute `value` for any error.
    ///
    /// The returned future cannot fail.
    pub fn fallback(self, value: V) -> AsyncResult<V, Infallible> {
        self.then_else(Ok, move |_| Ok(value))
    }

    /// Reject values that do not satisfy `predicate` with `on_false`.
    ///
    /// The predicate only runs on the value channel; an existing error is
    /// forwarded without evaluating it.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let even = AsyncResult::ok(4).guard(|x| *x % 2 == 0, "odd").pair();
    /// assert_eq!(block_on(even), Ok((Some(4), None)));
    ///
    /// let odd = AsyncResult::ok(3).guard(|x| *x % 2 == 0, "odd").pair();
    /// assert_eq!(block_on(odd), Ok((None, Some("odd"))));
    /// ```
    pub fn guard<P>(self, predicate: P, on_false: E) -> Self
    where
        P: FnOnce(&V) -> bool + 'static,
    {
        self.guard_with(predicate, move |_| on_false)
    }

    /// Like [`guard`](Self::guard), but builds the error from the rejected
    /// value.
    pub fn guard_with<P, G>(self, predicate: P, on_false: G) -> Self
    where
        P: FnOnce(&V) -> bool + 'static,
        G: FnOnce(V) -> E + 'static,
    {
        self.then(move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(on_false(value))
            }
        })
    }

    /// Move both channels into the value channel as a pair of options.
    ///
    /// Settles with `(Some(value), None)` or `(None, Some(error))`, and
    /// cannot fail.
    pub fn pair(self) -> AsyncResult<(Option<V>, Option<E>), Infallible> {
        self.then_else(
            |value| Ok((Some(value), None)),
            |error| Ok((None, Some(error))),
        )
    }

    /// Exchange the channels: values become errors and errors values.
    pub fn swap(self) -> AsyncResult<E, V> {
        self.then_else(Err, Ok)
    }

    /// Merge the error channel into the value channel.
    ///
    /// The distinction between the channels is lost and the returned future
    /// cannot fail.
    pub fn flatten(self) -> AsyncResult<V, Infallible>
    where
        E: Into<V>,
    {
        self.then_else(Ok, |error| Ok(error.into()))
    }
}

#[cfg(test)]
mod test {
    use crate::future::{AsyncResult, Native};
    use crate::runtime::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Spy(Rc<RefCell<Vec<i32>>>);

    impl Spy {
        fn record(&self, x: i32) {
            self.0.borrow_mut().push(x);
        }

        fn calls(&self) -> Vec<i32> {
            self.0.borrow().clone()
        }
    }

    #[test_log::test]
    fn tap_observes_values() {
        let log = Spy::default();
        let err_log = Spy::default();
        let (l, e) = (log.clone(), err_log.clone());
        let out = AsyncResult::<i32, i32>::ok(3)
            .tap(move |x| {
                l.record(*x);
                Ok(())
            })
            .tap_err(move |x| {
                e.record(*x);
                Ok(())
            })
            .pair();
        assert_eq!(block_on(out), Ok((Some(3), None)));
        assert_eq!(log.calls(), vec![3]);
        assert!(err_log.calls().is_empty());
    }

    #[test_log::test]
    fn tap_err_observes_errors() {
        let log = Spy::default();
        let err_log = Spy::default();
        let (l, e) = (log.clone(), err_log.clone());
        let out = AsyncResult::<i32, i32>::reject(3)
            .tap(move |x| {
                l.record(*x);
                Ok(())
            })
            .tap_err(move |x| {
                e.record(*x);
                Ok(())
            })
            .pair();
        assert_eq!(block_on(out), Ok((None, Some(3))));
        assert!(log.calls().is_empty());
        assert_eq!(err_log.calls(), vec![3]);
    }

    #[test]
    fn failing_taps() {
        block_on(async {
            let out = AsyncResult::<i32, i32>::ok(3).tap(|x| Err::<(), _>(x + 1));
            assert_eq!(out.await, Err(4));

            let out = AsyncResult::<i32, i32>::ok(3)
                .tap(|x| Native::new(std::future::ready(Err::<(), _>(x * 10))));
            assert_eq!(out.await, Err(30));

            // The effect's failure replaces the original error.
            let out = AsyncResult::<i32, i32>::reject(3).tap_err(|x| Err::<(), _>(x + 1));
            assert_eq!(out.await, Err(4));
        })
    }

    #[test]
    fn fallback_substitutes_errors() {
        block_on(async {
            assert_eq!(AsyncResult::<i32, i32>::reject(3).fallback(5).await, Ok(5));
            assert_eq!(AsyncResult::<i32, i32>::ok(3).fallback(5).await, Ok(3));
        })
    }

    #[test]
    fn guard_even_numbers() {
        block_on(async {
            let even = AsyncResult::ok(4).guard(|x| *x % 2 == 0, "expect even number");
            assert_eq!(even.pair().await, Ok((Some(4), None)));

            let odd = AsyncResult::ok(3).guard(|x| *x % 2 == 0, "expect even number");
            assert_eq!(odd.pair().await, Ok((None, Some("expect even number"))));
        })
    }

    #[test]
    fn guard_with_builds_the_error() {
        block_on(async {
            let out = AsyncResult::ok("hi-you")
                .guard_with(|x| x.ends_with("me"), |x| format!("need *-me, got {x}"));
            assert_eq!(out.await, Err("need *-me, got hi-you".to_string()));
        })
    }

    #[test]
    fn guard_skips_errors() {
        let evaluated = Rc::new(RefCell::new(false));
        let flag = evaluated.clone();
        let out = AsyncResult::<i32, &str>::reject("boom").guard(
            move |_| {
                *flag.borrow_mut() = true;
                true
            },
            "never",
        );
        assert_eq!(block_on(out), Err("boom"));
        assert!(!*evaluated.borrow());
    }

    #[test]
    fn pair_with_unit_value() {
        block_on(async {
            let out = AsyncResult::<(), ()>::ok(()).pair();
            assert_eq!(out.await, Ok((Some(()), None)));
        })
    }

    #[test]
    fn flatten_and_swap() {
        block_on(async {
            assert_eq!(AsyncResult::<i32, i32>::ok(3).flatten().await, Ok(3));
            assert_eq!(AsyncResult::<i32, i32>::reject(3).flatten().await, Ok(3));
            assert_eq!(AsyncResult::<u32, u8>::reject(3).flatten().await, Ok(3u32));

            let swapped = AsyncResult::<i32, &str>::ok(3).swap();
            assert_eq!(swapped.pair().await, Ok((None, Some(3))));
            let swapped = AsyncResult::<&str, i32>::reject(3).swap();
            assert_eq!(swapped.pair().await, Ok((Some(3), None)));
        })
    }
}
