//! The promise primitive.
//!
//! This module defines the single-assignment, cancellable eventual result
//! at the heart of the crate.
//!
//! It includes:
//! - the lock-free state machine ([`Status`] exposes a snapshot of it),
//! - the [`Promise`] handle used to observe, cancel and chain results,
//! - the [`Subscriber`] handed to tasks so they can settle their promise,
//! - [`Promise::bind`] and the combinators built on it,
//! - blocking and `async` waiting through [`Promise::wait`] and [`Wait`].

mod bind;
mod combinators;
mod core;
mod handle;
mod state;
mod subscriber;
mod wait;

pub(crate) use bind::Canceller;
pub use handle::Promise;
pub use state::Status;
pub use subscriber::Subscriber;
pub use wait::Wait;
