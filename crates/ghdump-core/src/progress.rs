//! Shared progress counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives progress deltas
///
/// Implementations must tolerate calls from several threads at once.
pub trait ProgressObserver: Send + Sync {
    /// A phase of `total` bytes begins
    fn start(&self, _total: u64) {}

    /// `delta` more bytes were processed; `done` is the counter after the update
    fn advance(&self, delta: u64, done: u64);
}

/// Monotonic byte counter against a known total
///
/// Workers call [`ProgressState::advance`]; the update is a single atomic
/// `fetch_add`, so concurrent readers never observe a lost increment.
pub struct ProgressState {
    total: u64,
    done: AtomicU64,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ProgressState {
    /// Create a counter without an observer
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            done: AtomicU64::new(0),
            observer: None,
        }
    }

    /// Create a counter that forwards every update to `observer`
    #[must_use]
    pub fn with_observer(total: u64, observer: Arc<dyn ProgressObserver>) -> Self {
        observer.start(total);
        Self {
            total,
            done: AtomicU64::new(0),
            observer: Some(observer),
        }
    }

    /// Record `delta` processed bytes
    pub fn advance(&self, delta: u64) {
        if delta == 0 {
            return;
        }
        let done = self.done.fetch_add(delta, Ordering::AcqRel) + delta;
        if let Some(observer) = &self.observer {
            observer.advance(delta, done);
        }
    }

    /// Bytes processed so far
    #[must_use]
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Acquire)
    }

    /// Expected total
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the counter reached the total
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done() >= self.total
    }
}

impl std::fmt::Debug for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressState")
            .field("total", &self.total)
            .field("done", &self.done())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        total: Mutex<Option<u64>>,
        seen: Mutex<Vec<(u64, u64)>>,
    }

    impl ProgressObserver for Recorder {
        fn start(&self, total: u64) {
            *self.total.lock().unwrap() = Some(total);
        }

        fn advance(&self, delta: u64, done: u64) {
            self.seen.lock().unwrap().push((delta, done));
        }
    }

    #[test]
    fn test_advance_accumulates() {
        let progress = ProgressState::new(10);
        progress.advance(4);
        progress.advance(0);
        progress.advance(6);
        assert_eq!(progress.done(), 10);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_observer_sees_deltas() {
        let recorder = Arc::new(Recorder::default());
        let progress = ProgressState::with_observer(5, recorder.clone());
        progress.advance(2);
        progress.advance(3);

        assert_eq!(*recorder.total.lock().unwrap(), Some(5));
        assert_eq!(*recorder.seen.lock().unwrap(), vec![(2, 2), (3, 5)]);
    }

    #[test]
    fn test_concurrent_advance() {
        let progress = ProgressState::new(8 * 1000);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        progress.advance(1);
                    }
                });
            }
        });
        assert_eq!(progress.done(), 8000);
    }
}
