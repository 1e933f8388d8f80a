/// A unit of work submitted to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An execution context that runs submitted jobs at some later point.
///
/// This is the only thing the scheduling decorators need from the outside
/// world. Implementations decide where and when jobs run; no ordering
/// between submissions is assumed beyond what the implementation itself
/// documents.
///
/// Any `Fn(Job)` closure is an executor, which covers most adapters:
///
/// ```rust,ignore
/// let spawn_thread = |job: Job| {
///     std::thread::spawn(job);
/// };
/// ```
pub trait Executor: Send + Sync {
    /// Submits `job` for execution.
    fn execute(&self, job: Job);
}

impl<F> Executor for F
where
    F: Fn(Job) + Send + Sync,
{
    fn execute(&self, job: Job) {
        self(job)
    }
}

/// Runs every job immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Executor for Inline {
    fn execute(&self, job: Job) {
        job()
    }
}
