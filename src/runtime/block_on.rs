use core::cell::Cell;
use core::future::Future;
use core::pin::pin;
use core::task::Waker;
use core::task::{Context, Poll};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Wake;
use std::thread::{self, Thread};

thread_local! {
    static RUNNING: Cell<bool> = const { Cell::new(false) };
}

/// Run a future to completion on the current thread.
///
/// # Panics
///
/// Panics when called from inside another `block_on` on the same thread.
///
/// # Example
///
/// ```
/// use async_result::future::AsyncResult;
/// use async_result::runtime::block_on;
///
/// let out = block_on(AsyncResult::<_, ()>::ok(2).then(|x| Ok(x * 21)));
/// assert_eq!(out, Ok(42));
/// ```
pub fn block_on<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    if RUNNING.replace(true) {
        panic!("cannot async_result::runtime::block_on inside an existing block_on!")
    }
    let _guard = Running;

    // Pin the future so it can be polled
    let mut fut = pin!(fut);

    // Create a new context to be passed to the future.
    let waker_impl = Arc::new(ThreadWaker::new(thread::current()));
    let waker = Waker::from(Arc::clone(&waker_impl));
    let mut cx = Context::from_waker(&waker);

    // Either the future completes and we return, or we sleep until some
    // waker fires.
    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(res) => break res,
            Poll::Pending => {
                while !waker_impl.take_awake() {
                    thread::park();
                }
            }
        }
    }
}

/// Clears the re-entrancy flag, even when the future panics.
struct Running;

impl Drop for Running {
    fn drop(&mut self) {
        RUNNING.set(false);
    }
}

struct ThreadWaker {
    awake: AtomicBool,
    thread: Thread,
}

impl ThreadWaker {
    fn new(thread: Thread) -> Self {
        Self {
            awake: AtomicBool::new(false),
            thread,
        }
    }

    /// Returns whether a wake-up happened since the last call, resetting it.
    #[inline]
    fn take_awake(&self) -> bool {
        self.awake.swap(false, Ordering::Acquire)
    }
}

impl Wake for ThreadWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.awake.store(true, Ordering::Release);
        self.thread.unpark();
    }
}
