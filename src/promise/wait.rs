use super::handle::Promise;
use super::state::Outcome;
use crate::error::PromiseError;

use parking_lot::{Condvar, Mutex};

use std::future::{Future, IntoFuture};
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// Where a waiter stands.
enum Slot<T, E> {
    Waiting(Option<Waker>),
    Settled(Outcome<T, E>),
    Cancelled,
}

/// Meeting point between a registered callback and a waiting thread or
/// task.
struct Rendezvous<T, E> {
    slot: Mutex<Slot<T, E>>,
    ready: Condvar,
}

impl<T, E> Rendezvous<T, E> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot::Waiting(None)),
            ready: Condvar::new(),
        })
    }

    /// Records the final slot and wakes whoever is waiting. Only the first
    /// call has an effect.
    fn finish(&self, next: Slot<T, E>) {
        let waker = {
            let mut slot = self.slot.lock();

            if !matches!(*slot, Slot::Waiting(_)) {
                return;
            }

            match mem::replace(&mut *slot, next) {
                Slot::Waiting(waker) => waker,
                _ => None,
            }
        };

        self.ready.notify_all();

        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Callback-side half of a rendezvous.
///
/// A promise drops callbacks it will never call (cancellation), so
/// dropping an undelivered notifier is how the waiter learns that no
/// result is coming.
struct Notifier<T, E> {
    rendezvous: Option<Arc<Rendezvous<T, E>>>,
}

impl<T, E> Notifier<T, E> {
    fn new(rendezvous: Arc<Rendezvous<T, E>>) -> Self {
        Self {
            rendezvous: Some(rendezvous),
        }
    }

    fn deliver(mut self, outcome: &Outcome<T, E>) {
        if let Some(rendezvous) = self.rendezvous.take() {
            rendezvous.finish(Slot::Settled(outcome.clone()));
        }
    }
}

impl<T, E> Drop for Notifier<T, E> {
    fn drop(&mut self) {
        if let Some(rendezvous) = self.rendezvous.take() {
            rendezvous.finish(Slot::Cancelled);
        }
    }
}

fn unpack<T: Clone, E: Clone>(outcome: &Outcome<T, E>) -> Result<T, PromiseError<E>> {
    match &**outcome {
        Ok(value) => Ok(value.clone()),
        Err(error) => Err(PromiseError::Rejected(error.clone())),
    }
}

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn register(&self) -> Arc<Rendezvous<T, E>> {
        let rendezvous = Rendezvous::new();
        let notifier = Notifier::new(rendezvous.clone());

        self.when_complete_shared(move |outcome| notifier.deliver(outcome));
        rendezvous
    }

    /// Blocks the current thread until the promise completes or is
    /// cancelled.
    ///
    /// This registers a callback like any other observer, so it starts an
    /// idle promise.
    ///
    /// # Errors
    ///
    /// Returns [`PromiseError::Rejected`] with a clone of the error if the
    /// promise failed, and [`PromiseError::Cancelled`] if it was cancelled.
    pub fn wait(&self) -> Result<T, PromiseError<E>>
    where
        T: Clone,
        E: Clone,
    {
        let rendezvous = self.register();
        let mut slot = rendezvous.slot.lock();

        while matches!(*slot, Slot::Waiting(_)) {
            rendezvous.ready.wait(&mut slot);
        }

        match &*slot {
            Slot::Settled(outcome) => unpack(outcome),
            _ => Err(PromiseError::Cancelled),
        }
    }
}

/// Future returned by awaiting a [`Promise`].
///
/// The callback is registered on first poll. Dropping the future does not
/// cancel the promise; it only stops observing it.
pub struct Wait<T, E> {
    promise: Promise<T, E>,
    rendezvous: Option<Arc<Rendezvous<T, E>>>,
}

impl<T, E> Future for Wait<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    type Output = Result<T, PromiseError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let rendezvous = match &this.rendezvous {
            Some(rendezvous) => rendezvous.clone(),
            None => {
                let rendezvous = this.promise.register();
                this.rendezvous = Some(rendezvous.clone());
                rendezvous
            }
        };

        // The waker is stored under the same lock `finish` takes, so a
        // result delivered concurrently is either seen here or wakes us.
        let mut slot = rendezvous.slot.lock();

        match &mut *slot {
            Slot::Waiting(waker) => {
                *waker = Some(cx.waker().clone());
                Poll::Pending
            }
            Slot::Settled(outcome) => Poll::Ready(unpack(outcome)),
            Slot::Cancelled => Poll::Ready(Err(PromiseError::Cancelled)),
        }
    }
}

impl<T, E> IntoFuture for Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    type Output = Result<T, PromiseError<E>>;
    type IntoFuture = Wait<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Wait {
            promise: self,
            rendezvous: None,
        }
    }
}
