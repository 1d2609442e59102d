use std::convert::Infallible;
use std::future::{pending, Future};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::FutureExt as _;

use super::{Resolution, Resolvable};

/// A future that never settles.
///
/// Resolving it leaves the outer future pending forever. For a typed
/// [`AsyncResult`](crate::future::AsyncResult) use
/// [`AsyncResult::never`](crate::future::AsyncResult::never).
pub const NEVER: Never = Never;

/// A future that is already settled with `()`.
///
/// For a typed [`AsyncResult`](crate::future::AsyncResult) use
/// [`AsyncResult::empty`](crate::future::AsyncResult::empty).
pub const EMPTY: Empty = Empty;

/// The type of the [`NEVER`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Never;

/// The type of the [`EMPTY`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Empty;

impl Future for Never {
    type Output = Result<Infallible, Infallible>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        Poll::Pending
    }
}

impl Future for Empty {
    type Output = Result<(), Infallible>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        Poll::Ready(Ok(()))
    }
}

impl Resolvable for Never {
    type Value = Infallible;
    type Error = Infallible;

    fn into_resolution(self) -> Resolution<Infallible, Infallible> {
        Resolution::Pending(pending().boxed_local())
    }
}

impl Resolvable for Empty {
    type Value = ();
    type Error = Infallible;

    fn into_resolution(self) -> Resolution<(), Infallible> {
        Resolution::Value(())
    }
}
