use super::executor::Executor;
use crate::promise::Promise;

use tracing::trace;

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Starts `promise` from a job run by `executor`.
///
/// Observing the returned promise submits a trampoline job instead of
/// starting `promise` directly. When the job runs, it subscribes to
/// `promise`, so an idle promise's task runs on the executor's thread.
///
/// If the returned promise is cancelled before the job runs, the job sees
/// the cancellation and does nothing; `promise` is never started. Later
/// cancellations reach `promise` itself.
///
/// A promise that something else has already started keeps running where
/// it is; only its observation is deferred.
pub fn start_on<T, E, X>(promise: Promise<T, E>, executor: X) -> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    X: Executor + 'static,
{
    let trampoline = Promise::<(), Infallible>::new(move |subscriber| {
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = cancelled.clone();
        subscriber.on_cancel(move || flag.store(true, Ordering::Release));

        executor.execute(Box::new(move || {
            if cancelled.load(Ordering::Acquire) {
                trace!("start cancelled before the executor ran it, skipping");
                return;
            }

            subscriber.resolve(());
        }));
    });

    trampoline.bind(move |_| promise)
}
