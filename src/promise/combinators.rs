use super::handle::Promise;

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Transforms the success value. Errors pass through unchanged.
    pub fn map<U, M>(&self, f: M) -> Promise<U, E>
    where
        U: Send + Sync + 'static,
        E: Clone,
        M: FnOnce(&T) -> U + Send + 'static,
    {
        self.bind(move |result| match result {
            Ok(value) => Promise::resolved(f(value)),
            Err(error) => Promise::rejected(error.clone()),
        })
    }

    /// Transforms the error. Success values pass through unchanged.
    pub fn map_err<F, M>(&self, f: M) -> Promise<T, F>
    where
        F: Send + Sync + 'static,
        T: Clone,
        M: FnOnce(&E) -> F + Send + 'static,
    {
        self.bind(move |result| match result {
            Ok(value) => Promise::resolved(value.clone()),
            Err(error) => Promise::rejected(f(error)),
        })
    }

    /// Runs another asynchronous step after a success.
    pub fn and_then<U, M>(&self, f: M) -> Promise<U, E>
    where
        U: Send + Sync + 'static,
        E: Clone,
        M: FnOnce(&T) -> Promise<U, E> + Send + 'static,
    {
        self.bind(move |result| match result {
            Ok(value) => f(value),
            Err(error) => Promise::rejected(error.clone()),
        })
    }

    /// Recovers from an error with another asynchronous step.
    pub fn or_else<F, M>(&self, f: M) -> Promise<T, F>
    where
        F: Send + Sync + 'static,
        T: Clone,
        M: FnOnce(&E) -> Promise<T, F> + Send + 'static,
    {
        self.bind(move |result| match result {
            Ok(value) => Promise::resolved(value.clone()),
            Err(error) => f(error),
        })
    }
}
