#![warn(future_incompatible, unreachable_pub)]
#![deny(missing_debug_implementations)]
#![warn(missing_docs)]

//! Futures that settle into one of two typed channels.
//!
//! [`AsyncResult<V, E>`](future::AsyncResult) wraps a native future and
//! keeps its success and failure payloads typed through every combinator.
//! Handlers may return plain results or further futures; nested layers are
//! unwrapped automatically, while failures are always passed on verbatim.
//!
//! # Examples
//!
//! **Chaining**
//!
//! ```rust
//! use async_result::future::AsyncResult;
//!
//! #[async_result::main]
//! async fn main() {
//!     let status = AsyncResult::<u16, String>::ok(404)
//!         .guard(|code| *code < 400, "request failed".to_string())
//!         .tap_err(|e| {
//!             eprintln!("{e}");
//!             Ok(())
//!         })
//!         .fallback(200)
//!         .await;
//!     assert_eq!(status, Ok(200));
//! }
//! ```
//!
//! **Pipelines and sequencing**
//!
//! ```rust
//! use async_result::future::AsyncResult;
//!
//! #[async_result::main]
//! async fn main() {
//!     let sizes = AsyncResult::all(vec![
//!         AsyncResult::<_, String>::ok("a.txt"),
//!         AsyncResult::ok("b.txt"),
//!     ])
//!     .pipe((
//!         |names: Vec<&str>| Ok(names.len()),
//!         |count: usize| Ok(count * 1024),
//!     ))
//!     .await;
//!     assert_eq!(sizes, Ok(2048));
//! }
//! ```
//!
//! # Design Decisions
//!
//! This library does not ship an executor beyond the single-threaded
//! [`runtime::block_on`]. An `AsyncResult` is a regular `Future` and runs on
//! any runtime. No `Send` bounds are required, which keeps closures that
//! capture `Rc` or `RefCell` usable everywhere; the flip side is that an
//! `AsyncResult` cannot be spawned onto a multi-threaded executor.

pub mod future;
pub mod runtime;

pub use async_result_macro::attr_macro_main as main;
pub use async_result_macro::attr_macro_test as test;

/// Bring the extension traits into scope.
pub mod prelude {
    pub use crate::future::FutureExt as _;
    pub use crate::future::Pipeline as _;
    pub use crate::future::Resolvable as _;
    pub use crate::future::Sequence as _;
}
