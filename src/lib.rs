//! # Pledge
//!
//! **Pledge** is a cancellable, composable promise for Rust: a
//! single-assignment container that eventually holds either a success
//! value or an error, delivered to any number of observers.
//!
//! It does not run anything by itself. A promise wraps a task that is
//! started lazily, on the thread of the first observer, and settles the
//! promise whenever and wherever it likes. Pledge only guarantees how that
//! result is represented, delivered, chained and cancelled:
//!
//! - **Exactly-once delivery**: every observer, registered before or after
//!   completion, receives the same result exactly once
//! - **Lock-free state machine**: every transition is a single
//!   compare-and-swap over an immutable state record
//! - **Cooperative cancellation**: cancelling runs the task's hook once and
//!   guarantees that no result is ever delivered afterwards
//! - **Chaining with cancellation forwarding**: [`Promise::bind`] cancels
//!   whichever side of the chain is live
//! - **Scheduling decorators** that move task start-up or result delivery
//!   onto an executor of your choice
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pledge::Promise;
//! use std::thread;
//!
//! let answer: Promise<u32, String> = Promise::new(|subscriber| {
//!     thread::spawn(move || subscriber.resolve(42));
//! });
//!
//! let doubled = answer.map(|value| value * 2);
//!
//! assert_eq!(doubled.wait(), Ok(84));
//! ```
//!
//! ## Modules
//!
//! - [`promise`]: The promise, its subscriber handle and combinators
//! - [`schedule`]: Executors and the `start_on` / `complete_on` decorators
//! - [`error`]: Errors reported when waiting for a promise

mod utils;

pub mod error;
pub mod promise;
pub mod schedule;

pub use error::PromiseError;
pub use promise::{Promise, Status, Subscriber, Wait};
pub use schedule::{Executor, Inline, Job, complete_on, start_on};
