use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures_lite::future::BoxedLocal;
use futures_lite::FutureExt as _;
use slab::Slab;

use super::{AsyncResult, Resolution, Resolvable};

enum State<V, E> {
    /// Not polled yet, or parked between polls.
    Pending(BoxedLocal<Result<V, E>>),
    /// Taken out by the handle currently polling it.
    Polling,
    Settled(Result<V, E>),
    /// The wrapped future panicked; it is gone and will never settle.
    Poisoned,
}

struct Inner<V, E> {
    state: State<V, E>,
    waiters: Slab<Waker>,
}

/// A cloneable handle to a single [`AsyncResult`].
///
/// The wrapped future runs once, no matter how many clones await it. Every
/// clone settles with a clone of the same outcome, and awaiting a settled
/// handle again yields it again.
///
/// If the wrapped future panics, the panic unwinds through the handle that
/// was polling it. Every other handle then panics on its next poll instead
/// of waiting forever; see [`is_poisoned`](Self::is_poisoned).
///
/// This `struct` is created by [`AsyncResult::shared`].
///
/// # Example
///
/// ```
/// use async_result::future::AsyncResult;
/// use async_result::runtime::block_on;
///
/// let config = AsyncResult::<_, ()>::ok("loaded".to_string()).shared();
/// let again = config.clone();
/// assert_eq!(block_on(config), Ok("loaded".to_string()));
/// assert_eq!(block_on(again), Ok("loaded".to_string()));
/// ```
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Shared<V, E> {
    inner: Rc<RefCell<Inner<V, E>>>,
    key: Option<usize>,
}

impl<V: 'static, E: 'static> AsyncResult<V, E> {
    /// Make this future re-readable by any number of handles.
    pub fn shared(self) -> Shared<V, E>
    where
        V: Clone,
        E: Clone,
    {
        Shared {
            inner: Rc::new(RefCell::new(Inner {
                state: State::Pending(self.into_inner()),
                waiters: Slab::new(),
            })),
            key: None,
        }
    }
}

impl<V: Clone, E: Clone> Shared<V, E> {
    /// Returns the outcome if it already settled, without polling.
    pub fn peek(&self) -> Option<Result<V, E>> {
        match &self.inner.borrow().state {
            State::Settled(outcome) => Some(outcome.clone()),
            _ => None,
        }
    }
}

impl<V, E> Shared<V, E> {
    /// Returns `true` once the wrapped future settled.
    pub fn is_settled(&self) -> bool {
        matches!(self.inner.borrow().state, State::Settled(_))
    }

    /// Returns `true` if the wrapped future panicked while being polled.
    pub fn is_poisoned(&self) -> bool {
        matches!(self.inner.borrow().state, State::Poisoned)
    }
}

/// Poisons the shared state if the wrapped future unwinds out of `poll`.
///
/// Forgotten once the poll returns normally.
struct PoisonOnUnwind<'a, V, E> {
    inner: &'a RefCell<Inner<V, E>>,
}

impl<V, E> Drop for PoisonOnUnwind<'_, V, E> {
    fn drop(&mut self) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        inner.state = State::Poisoned;
        let wakers: Vec<Waker> = inner.waiters.drain().collect();
        drop(inner);
        tracing::debug!(waiters = wakers.len(), "shared future panicked");
        for waker in wakers {
            waker.wake();
        }
    }
}

fn register(key: &mut Option<usize>, waiters: &mut Slab<Waker>, waker: &Waker) {
    match key.and_then(|key| waiters.get_mut(key)) {
        Some(registered) => {
            if !registered.will_wake(waker) {
                *registered = waker.clone();
            }
        }
        None => *key = Some(waiters.insert(waker.clone())),
    }
}

impl<V: Clone, E: Clone> Future for Shared<V, E> {
    type Output = Result<V, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut guard = this.inner.borrow_mut();
        let inner = &mut *guard;

        let mut future = match mem::replace(&mut inner.state, State::Polling) {
            State::Settled(outcome) => {
                inner.state = State::Settled(outcome.clone());
                this.key = None;
                return Poll::Ready(outcome);
            }
            State::Polling => {
                // Another handle (possibly the wrapped future itself) is
                // polling right now; wait for it.
                register(&mut this.key, &mut inner.waiters, cx.waker());
                return Poll::Pending;
            }
            State::Poisoned => {
                inner.state = State::Poisoned;
                this.key = None;
                drop(guard);
                panic!("the shared future panicked while it was being polled");
            }
            State::Pending(future) => future,
        };
        register(&mut this.key, &mut inner.waiters, cx.waker());
        drop(guard);

        let poison = PoisonOnUnwind { inner: &this.inner };
        let poll = future.as_mut().poll(cx);
        mem::forget(poison);

        let mut inner = this.inner.borrow_mut();
        match poll {
            Poll::Pending => {
                inner.state = State::Pending(future);
                Poll::Pending
            }
            Poll::Ready(outcome) => {
                inner.state = State::Settled(outcome.clone());
                let wakers: Vec<Waker> = inner.waiters.drain().collect();
                this.key = None;
                drop(inner);
                tracing::trace!(waiters = wakers.len(), "shared outcome settled");
                for waker in wakers {
                    waker.wake();
                }
                Poll::Ready(outcome)
            }
        }
    }
}

impl<V, E> Drop for Shared<V, E> {
    fn drop(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        inner.waiters.try_remove(key);
        // This handle may have been the one the wrapped future would wake.
        // Hand the polling over to someone still waiting.
        let next = match inner.state {
            State::Pending(_) => inner.waiters.iter().next().map(|(_, waker)| waker.clone()),
            _ => None,
        };
        drop(inner);
        if let Some(waker) = next {
            waker.wake();
        }
    }
}

impl<V, E> Clone for Shared<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            key: None,
        }
    }
}

impl<V: Clone + 'static, E: Clone + 'static> Resolvable for Shared<V, E> {
    type Value = V;
    type Error = E;

    fn into_resolution(self) -> Resolution<V, E> {
        Resolution::Pending(async move { Resolution::from(self.await) }.boxed_local())
    }
}

impl<V, E> fmt::Debug for Shared<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("settled", &self.is_settled())
            .field("poisoned", &self.is_poisoned())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::Shared;
    use crate::future::AsyncResult;
    use crate::runtime::block_on;
    use futures_lite::future::{poll_once, yield_now, zip};
    use std::cell::{Cell, RefCell};
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    fn counted(runs: &Rc<Cell<u32>>) -> AsyncResult<String, ()> {
        let runs = runs.clone();
        AsyncResult::from_future(async move {
            runs.set(runs.get() + 1);
            yield_now().await;
            Ok("payload".to_string())
        })
    }

    #[test_log::test]
    fn runs_once_for_every_reader() {
        let runs = Rc::new(Cell::new(0));
        let shared = counted(&runs).shared();
        let (a, b) = block_on(zip(shared.clone(), shared.clone()));
        assert_eq!(a, Ok("payload".to_string()));
        assert_eq!(b, Ok("payload".to_string()));
        assert_eq!(block_on(shared.clone()), Ok("payload".to_string()));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn peek_only_after_settlement() {
        let runs = Rc::new(Cell::new(0));
        let shared = counted(&runs).shared();
        assert_eq!(shared.peek(), None);
        assert!(!shared.is_settled());
        block_on(shared.clone()).unwrap();
        assert_eq!(shared.peek(), Some(Ok("payload".to_string())));
        assert_eq!(format!("{shared:?}"), "Shared { settled: true, poisoned: false }");
    }

    #[test]
    fn dropping_the_poller_hands_over() {
        let runs = Rc::new(Cell::new(0));
        let shared = counted(&runs).shared();
        let mut first = shared.clone();
        block_on(async move {
            assert_eq!(poll_once(&mut first).await, None);
            drop(first);
            assert_eq!(shared.await, Ok("payload".to_string()));
        });
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn shared_handles_resolve_like_any_layer() {
        block_on(async {
            let shared = AsyncResult::<u8, u8>::reject(5).shared();
            let out = AsyncResult::resolve(shared.clone()).catch(|x| Ok::<_, u8>(x * 2));
            assert_eq!(out.await, Ok(10));
            assert_eq!(shared.await, Err(5));
        })
    }

    #[test]
    fn polled_by_its_own_work_stays_pending() {
        let slot: Rc<RefCell<Option<Shared<u8, ()>>>> = Rc::default();
        let stash = slot.clone();
        let shared = AsyncResult::from_future(async move {
            let me = stash.borrow_mut().take();
            match me {
                Some(me) => me.await,
                None => Ok(0),
            }
        })
        .shared();
        *slot.borrow_mut() = Some(shared.clone());

        let mut handle = shared.clone();
        block_on(async {
            assert_eq!(poll_once(&mut handle).await, None);
        });
        assert!(!shared.is_settled());
        assert!(!shared.is_poisoned());
        assert_eq!(shared.peek(), None);
    }

    #[test_log::test]
    fn a_panicking_future_poisons_every_handle() {
        let shared = AsyncResult::<u8, ()>::from_future(async {
            yield_now().await;
            if true {
                panic!("boom");
            }
            Ok(1)
        })
        .shared();

        let mut parked = shared.clone();
        block_on(async {
            assert_eq!(poll_once(&mut parked).await, None);
        });

        let caught = panic::catch_unwind(AssertUnwindSafe(|| block_on(shared.clone())));
        assert!(caught.is_err());
        assert!(shared.is_poisoned());
        assert_eq!(shared.peek(), None);
        assert_eq!(format!("{shared:?}"), "Shared { settled: false, poisoned: true }");

        // A handle that was already waiting fails too rather than hanging.
        let caught = panic::catch_unwind(AssertUnwindSafe(|| block_on(parked)));
        assert!(caught.is_err());
    }
}
