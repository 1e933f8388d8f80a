//! Scheduling decorators.
//!
//! A promise runs its task on whichever thread first observes it and
//! calls observers on whichever thread settles it. The decorators in this
//! module move either step onto an [`Executor`] supplied by the caller:
//!
//! - [`start_on`] defers starting the task to a job on the executor,
//! - [`complete_on`] defers delivering the result to a job on the executor.
//!
//! Each job checks a cancellation flag before doing anything, so work
//! cancelled while queued is skipped.
//!
//! [`start_on`] is built from the public promise operations only: a
//! trampoline promise, `bind`, `on_cancel` and `cancel`. [`complete_on`]
//! additionally uses two crate-internal operations. It observes the shared
//! outcome of the wrapped promise and settles its own subscriber with that
//! same outcome, which hands the result over without cloning it. Its cancel
//! hook reaches the wrapped promise through a weak handle, so an abandoned
//! promise that never settles is freed together with its decorator.

mod complete;
mod executor;
mod start;

pub use complete::complete_on;
pub use executor::{Executor, Inline, Job};
pub use start::start_on;
