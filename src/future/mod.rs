//! Two-channel asynchronous outcomes.
//!
//! An [`AsyncResult<V, E>`] is a future that settles into exactly one of two
//! typed channels: a value `V` or an error `E`. It is a plain
//! `Future<Output = Result<V, E>>`, so it can be `.await`ed anywhere, while
//! its combinators keep both channels typed through a whole chain.
//!
//! # Deep unwrapping
//!
//! Whatever a handler returns is a [`Resolvable`]: a `Result`, another
//! `AsyncResult`, a [`Native`] future, a [`Shared`] handle, or any nesting
//! of those. Nested layers are awaited one at a time until a payload
//! surfaces. Errors are the exception: a failure is never unwrapped, so
//! [`AsyncResult::reject`] keeps even a future as its payload.
//!
//! ```
//! use async_result::future::{AsyncResult, Native};
//! use async_result::runtime::block_on;
//!
//! let out = AsyncResult::<u32, String>::ok(4)
//!     .then(|x| Native::new(async move { AsyncResult::<_, String>::ok(x + 1) }))
//!     .guard(|x| *x > 3, "too small".to_string())
//!     .catch(|e| Ok::<_, String>(e.len() as u32));
//! assert_eq!(block_on(out), Ok(5));
//! ```
//!
//! # Laziness
//!
//! Handlers run when the resulting future is polled, never at the call
//! site. The resolver of [`AsyncResult::new`] and the thunk of
//! [`AsyncResult::from_fn`] are the exceptions: both run immediately.

mod all;
mod async_result;
mod chain;
mod combinators;
mod future_ext;
mod pipe;
mod resolvable;
mod resolver;
mod sentinel;
mod shared;

pub use all::{AllError, Collection, Members, Sequence};
pub use async_result::AsyncResult;
pub use future_ext::FutureExt;
pub use pipe::Pipeline;
pub use resolvable::{Native, Resolution, Resolvable};
pub use resolver::{Reject, Resolve};
pub use sentinel::{Empty, Never, EMPTY, NEVER};
pub use shared::Shared;
