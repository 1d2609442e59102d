//! A minimal executor.
//!
//! [`block_on()`] drives a single future to completion on the current thread,
//! parking the thread whenever the future is pending. It is enough to run
//! `async fn main` and async tests; anything more elaborate should use a real
//! runtime, since [`AsyncResult`](crate::future::AsyncResult) is executor
//! agnostic.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod block_on;

pub use block_on::block_on;
