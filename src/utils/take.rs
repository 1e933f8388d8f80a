use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// A slot holding a value that can be moved out exactly once.
///
/// State records are immutable and shared between threads, yet the
/// closures they carry (tasks, observers, cancellation hooks) are
/// `FnOnce`. A `TakeCell` bridges the two: any thread holding a shared
/// reference may call [`take`](Self::take), and a single atomic swap
/// decides which caller receives the value.
///
/// # Safety
///
/// The pointer stored in `slot` is either null or the unique owner of a
/// boxed `T`. Ownership leaves the cell only through the swap in `take`,
/// so the box is freed at most once.
pub(crate) struct TakeCell<T> {
    slot: AtomicPtr<T>,
}

impl<T> TakeCell<T> {
    /// Creates a cell holding `value`.
    pub(crate) fn new(value: T) -> Self {
        Self {
            slot: AtomicPtr::new(Box::into_raw(Box::new(value))),
        }
    }

    /// Moves the value out of the cell.
    ///
    /// Returns `None` if another caller already took it.
    pub(crate) fn take(&self) -> Option<T> {
        let ptr = self.slot.swap(ptr::null_mut(), Ordering::AcqRel);

        if ptr.is_null() {
            return None;
        }

        // Safety: the swap handed us the only copy of a pointer produced
        // by `Box::into_raw` in `new`.
        let value = unsafe { Box::from_raw(ptr) };
        Some(*value)
    }

    /// Returns `true` if the value has been moved out.
    #[cfg(test)]
    pub(crate) fn is_taken(&self) -> bool {
        self.slot.load(Ordering::Acquire).is_null()
    }
}

impl<T> Drop for TakeCell<T> {
    /// Drops the value if nobody took it.
    fn drop(&mut self) {
        let ptr = *self.slot.get_mut();

        if !ptr.is_null() {
            // Safety: `&mut self` rules out a concurrent `take`.
            unsafe { drop(Box::from_raw(ptr)) };
        }
    }
}

// Safety: the cell only ever moves `T` between threads, never shares it,
// which is the same contract as `Mutex<Option<T>>`.
unsafe impl<T: Send> Send for TakeCell<T> {}
unsafe impl<T: Send> Sync for TakeCell<T> {}

#[cfg(test)]
mod tests {
    use super::TakeCell;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn take_yields_value_once() {
        let cell = TakeCell::new(String::from("once"));

        assert!(!cell.is_taken());
        assert_eq!(cell.take().as_deref(), Some("once"));
        assert!(cell.is_taken());
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn untaken_value_is_dropped_with_cell() {
        struct Counted(Arc<AtomicUsize>);

        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));

        drop(TakeCell::new(Counted(drops.clone())));
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        let cell = TakeCell::new(Counted(drops.clone()));
        let taken = cell.take();
        drop(cell);
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        drop(taken);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_takers_see_a_single_winner() {
        let cell = Arc::new(TakeCell::new(7u32));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                let winners = winners.clone();

                thread::spawn(move || {
                    if cell.take().is_some() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
