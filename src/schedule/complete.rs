use super::executor::Executor;
use crate::promise::Promise;

use tracing::trace;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Delivers the result of `promise` from a job run by `executor`.
///
/// `promise` runs wherever its task runs. Once it completes, a delivery
/// job is submitted to `executor`, and observers of the returned promise
/// are called from that job.
///
/// Cancelling the returned promise cancels `promise` if it is still
/// running. If the result is already computed but not yet delivered, the
/// delivery job sees the cancellation and drops the result.
///
/// The result is handed over as the shared outcome of `promise`, so
/// neither `T` nor `E` has to be `Clone`.
pub fn complete_on<T, E, X>(promise: Promise<T, E>, executor: X) -> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    X: Executor + 'static,
{
    Promise::new(move |subscriber| {
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = cancelled.clone();
        let upstream = promise.canceller();
        subscriber.on_cancel(move || {
            flag.store(true, Ordering::Release);
            upstream.cancel();
        });

        promise.when_complete_shared(move |outcome| {
            let outcome = outcome.clone();

            executor.execute(Box::new(move || {
                if cancelled.load(Ordering::Acquire) {
                    trace!("delivery cancelled before the executor ran it, skipping");
                    return;
                }

                subscriber.settle_shared(outcome);
            }));
        });
    })
}
