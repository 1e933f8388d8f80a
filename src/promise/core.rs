use super::state::{Callback, Callbacks, CancelHook, Outcome, State, Status, Task};
use super::subscriber::Subscriber;
use crate::utils::TakeCell;

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use std::sync::Arc;

/// The shared engine behind a [`Promise`](super::Promise).
///
/// `Core` owns a single state cell. Every change goes through
/// [`transition`](Self::transition): read the current record, build the
/// next one, publish it with a compare-and-swap and retry if another
/// thread got there first. No operation takes a lock or waits for
/// another thread.
pub(crate) struct Core<T, E> {
    state: ArcSwap<State<T, E>>,
}

impl<T, E> Core<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates an idle core that will run `task` on first subscription.
    pub(crate) fn idle(task: Task<T, E>) -> Self {
        Self::with_state(State::Idle {
            task: Arc::new(TakeCell::new(task)),
        })
    }

    /// Creates a core that is already complete.
    pub(crate) fn complete_with(outcome: Outcome<T, E>) -> Self {
        Self::with_state(State::Complete { outcome })
    }

    fn with_state(state: State<T, E>) -> Self {
        Self {
            state: ArcSwap::from_pointee(state),
        }
    }

    fn load(&self) -> Arc<State<T, E>> {
        self.state.load_full()
    }

    /// Publishes `next` if the cell still holds `current`.
    ///
    /// Returns `false` when another thread changed the state first; the
    /// caller must reload and recompute.
    fn transition(&self, current: &Arc<State<T, E>>, next: State<T, E>) -> bool {
        let previous = self.state.compare_and_swap(current, Arc::new(next));
        Arc::ptr_eq(&*previous, current)
    }

    pub(crate) fn status(&self) -> Status {
        self.load().status()
    }

    /// Registers `callback` for the outcome, starting the task if this is
    /// the first registration.
    ///
    /// A complete promise runs the callback immediately on the calling
    /// thread. A cancelled promise drops it.
    pub(crate) fn subscribe(self: &Arc<Self>, callback: Callback<T, E>) {
        let pending = Arc::new(TakeCell::new(callback));

        loop {
            let current = self.load();

            let next = match &*current {
                State::Complete { outcome } => {
                    if let Some(callback) = pending.take() {
                        callback(outcome);
                    }
                    return;
                }
                State::Cancelled => {
                    trace!("callback registered on a cancelled promise, dropping it");
                    return;
                }
                State::Idle { .. } => State::InProgress {
                    callbacks: Callbacks::new().with(pending.clone()),
                    on_cancel: None,
                },
                State::InProgress {
                    callbacks,
                    on_cancel,
                } => State::InProgress {
                    callbacks: callbacks.with(pending.clone()),
                    on_cancel: on_cancel.clone(),
                },
            };

            if self.transition(&current, next) {
                if let State::Idle { task } = &*current {
                    self.start(task);
                }
                return;
            }
        }
    }

    /// Runs the task. Only the thread that moved the state out of `Idle`
    /// gets here, so the task is always present.
    fn start(self: &Arc<Self>, task: &TakeCell<Task<T, E>>) {
        match task.take() {
            Some(task) => {
                trace!("starting promise task");
                task(Subscriber::new(self.clone()));
            }
            None => panic!("promise task was started twice"),
        }
    }

    /// Stores the final outcome and notifies every pending callback.
    ///
    /// A cancelled promise silently discards the outcome.
    ///
    /// # Panics
    ///
    /// Panics if the promise has not been started or is already complete.
    /// Both mean the single-resolution contract was broken.
    pub(crate) fn complete(&self, outcome: Outcome<T, E>) {
        loop {
            let current = self.load();

            match &*current {
                State::InProgress { callbacks, .. } => {
                    let next = State::Complete {
                        outcome: outcome.clone(),
                    };

                    if self.transition(&current, next) {
                        trace!(callbacks = callbacks.len(), "promise completed");

                        for callback in callbacks.drain() {
                            callback(&outcome);
                        }
                        return;
                    }
                }
                State::Cancelled => {
                    trace!("promise already cancelled, discarding late outcome");
                    return;
                }
                State::Idle { .. } => panic!("promise settled before its task was started"),
                State::Complete { .. } => panic!("promise settled more than once"),
            }
        }
    }

    /// Replaces the cancellation hook of a running promise.
    ///
    /// On a cancelled promise the hook runs right away; on a complete one
    /// it is dropped.
    pub(crate) fn set_cancel_hook(&self, hook: CancelHook) {
        let hook = Arc::new(TakeCell::new(hook));

        loop {
            let current = self.load();

            let next = match &*current {
                State::InProgress { callbacks, .. } => State::InProgress {
                    callbacks: callbacks.clone(),
                    on_cancel: Some(hook.clone()),
                },
                State::Cancelled => {
                    debug!("cancellation hook registered after cancel, running it now");
                    if let Some(hook) = hook.take() {
                        hook();
                    }
                    return;
                }
                State::Complete { .. } => return,
                State::Idle { .. } => panic!("cancellation hook registered before task start"),
            };

            if self.transition(&current, next) {
                return;
            }
        }
    }

    /// Moves an idle or running promise to `Cancelled`.
    ///
    /// The hook recorded at the moment of the winning swap runs exactly
    /// once, after the swap, on the calling thread. Pending callbacks are
    /// dropped without being called. Terminal promises are left untouched.
    pub(crate) fn cancel(&self) {
        loop {
            let current = self.load();

            match &*current {
                State::Complete { .. } | State::Cancelled => return,
                State::Idle { .. } => {
                    if self.transition(&current, State::Cancelled) {
                        debug!(state = ?Status::Idle, "promise cancelled");
                        return;
                    }
                }
                State::InProgress {
                    callbacks,
                    on_cancel,
                } => {
                    if self.transition(&current, State::Cancelled) {
                        debug!(
                            state = ?Status::InProgress,
                            callbacks = callbacks.len(),
                            "promise cancelled"
                        );

                        if let Some(hook) = on_cancel.as_ref().and_then(|hook| hook.take()) {
                            hook();
                        }
                        drop(callbacks.drain());
                        return;
                    }
                }
            }
        }
    }
}
