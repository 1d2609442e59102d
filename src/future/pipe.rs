//! Run a value through a chain of stages.

use super::{AsyncResult, Resolvable};

/// A chain of stages that each transform the previous stage's value.
///
/// Implemented for:
///
/// - `()`: no stages, the value passes through;
/// - tuples of up to twelve closures, each typed on the output of the one
///   before it;
/// - `Vec<F>` of closures that all map `V` to `V`.
///
/// Every stage returns a [`Resolvable`], which is unwrapped before the next
/// stage sees it. The first failing stage stops the chain.
pub trait Pipeline<V, E> {
    /// The payload of the last stage.
    type Output;

    /// Feed `value` through every stage.
    fn run(self, value: V) -> AsyncResult<Self::Output, E>;
}

impl<V: 'static, E: 'static> AsyncResult<V, E> {
    /// Feed the value through `stages`.
    ///
    /// If this future fails, no stage is called and the error is forwarded.
    /// Otherwise the stages run in order, each on the unwrapped output of
    /// the previous one, until one fails or the last one settles.
    ///
    /// # Example
    ///
    /// ```
    /// use async_result::future::AsyncResult;
    /// use async_result::runtime::block_on;
    ///
    /// let out = AsyncResult::<_, String>::ok(" 42 ").pipe((
    ///     |s: &str| Ok(s.trim().to_string()),
    ///     |s: String| s.parse::<u32>().map_err(|e| e.to_string()),
    ///     |n: u32| AsyncResult::ok(n + 1),
    /// ));
    /// assert_eq!(block_on(out), Ok(43));
    /// ```
    pub fn pipe<P>(self, stages: P) -> AsyncResult<P::Output, E>
    where
        P: Pipeline<V, E> + 'static,
        P::Output: 'static,
    {
        AsyncResult::from_future(async move {
            let value = self.await?;
            stages.run(value).await
        })
    }
}

impl<V: 'static, E: 'static> Pipeline<V, E> for () {
    type Output = V;

    fn run(self, value: V) -> AsyncResult<V, E> {
        AsyncResult::ok(value)
    }
}

impl<V, E, F, R> Pipeline<V, E> for Vec<F>
where
    V: 'static,
    E: 'static,
    F: FnOnce(V) -> R + 'static,
    R: Resolvable<Value = V, Error = E>,
{
    type Output = V;

    fn run(self, value: V) -> AsyncResult<V, E> {
        AsyncResult::from_future(async move {
            let mut value = value;
            for stage in self {
                value = stage(value).into_resolution().settle().await?;
            }
            Ok::<_, E>(value)
        })
    }
}

macro_rules! impl_pipeline_for_tuple {
    ($F:ident $R:ident $(, $Fs:ident $Rs:ident)*) => {
        impl<V, E, $F, $R, $($Fs,)*> Pipeline<V, E> for ($F, $($Fs,)*)
        where
            V: 'static,
            E: 'static,
            $F: FnOnce(V) -> $R + 'static,
            $R: Resolvable<Error = E>,
            <$R as Resolvable>::Value: 'static,
            ($($Fs,)*): Pipeline<<$R as Resolvable>::Value, E> + 'static,
            <($($Fs,)*) as Pipeline<<$R as Resolvable>::Value, E>>::Output: 'static,
        {
            type Output = <($($Fs,)*) as Pipeline<<$R as Resolvable>::Value, E>>::Output;

            #[allow(non_snake_case)]
            fn run(self, value: V) -> AsyncResult<Self::Output, E> {
                let ($F, $($Fs,)*) = self;
                AsyncResult::resolve($F(value)).pipe(($($Fs,)*))
            }
        }

        impl_pipeline_for_tuple!($($Fs $Rs),*);
    };
    () => {};
}

impl_pipeline_for_tuple!(
    F1 R1, F2 R2, F3 R3, F4 R4, F5 R5, F6 R6,
    F7 R7, F8 R8, F9 R9, F10 R10, F11 R11, F12 R12
);

#[cfg(test)]
mod test {
    use crate::future::{AsyncResult, Native};
    use crate::runtime::block_on;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn no_stages_is_identity() {
        block_on(async {
            assert_eq!(AsyncResult::<_, ()>::ok(3).pipe(()).await, Ok(3));
            assert_eq!(AsyncResult::<u8, _>::reject(3).pipe(()).await, Err(3));
        })
    }

    #[test]
    fn stages_change_the_type() {
        block_on(async {
            let out = AsyncResult::<_, String>::ok(5).pipe((
                |x: i32| Ok(x * 2),
                |x: i32| Ok(x.to_string()),
                |s: String| Native::new(async move { Ok::<_, String>(format!("<{s}>")) }),
            ));
            assert_eq!(out.await, Ok("<10>".to_string()));
        })
    }

    #[test]
    fn twelve_stages() {
        block_on(async {
            let inc = |x: u32| Ok(x + 1);
            let out = AsyncResult::<_, ()>::ok(0).pipe((
                inc, inc, inc, inc, inc, inc, inc, inc, inc, inc, inc, inc,
            ));
            assert_eq!(out.await, Ok(12));
        })
    }

    #[test]
    fn first_failure_short_circuits() {
        block_on(async {
            let later = Rc::new(Cell::new(0));
            let counter = later.clone();
            let out = AsyncResult::<_, &str>::ok(1).pipe((
                |x: i32| Ok(x + 1),
                |_: i32| AsyncResult::<i32, _>::reject("stage two"),
                move |x: i32| {
                    counter.set(counter.get() + 1);
                    Ok(x)
                },
            ));
            assert_eq!(out.await, Err("stage two"));
            assert_eq!(later.get(), 0);
        })
    }

    #[test]
    fn failed_receiver_calls_nothing() {
        block_on(async {
            let calls = Rc::new(Cell::new(0));
            let counter = calls.clone();
            let out = AsyncResult::<i32, _>::reject("upstream").pipe((move |x: i32| {
                counter.set(counter.get() + 1);
                Ok(x)
            },));
            assert_eq!(out.await, Err("upstream"));
            assert_eq!(calls.get(), 0);
        })
    }

    #[test]
    fn vec_of_stages() {
        block_on(async {
            let stages: Vec<Box<dyn FnOnce(u64) -> Result<u64, String>>> = (1..=20)
                .map(|n| Box::new(move |x: u64| Ok(x + n)) as Box<dyn FnOnce(u64) -> Result<u64, String>>)
                .collect();
            assert_eq!(AsyncResult::ok(0).pipe(stages).await, Ok(210));

            let stages: Vec<fn(u64) -> Result<u64, String>> =
                vec![|x| Ok(x * 2), |_| Err("halt".to_string()), |_| unreachable!()];
            assert_eq!(AsyncResult::ok(1).pipe(stages).await, Err("halt".to_string()));
        })
    }
}
