//! Coalesces bursts of autosave requests into one delayed write.
//!
//! Each `schedule` call cancels the pending timer and starts a new one with the
//! latest value; only the last call inside a wait window reaches the
//! operation. Once the window elapses the write is detached from the timer, so
//! later calls never cancel a write that is already in flight. Writes run one
//! at a time. Failures are logged and dropped: autosave is best effort and
//! never reaches the caller.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

type WriteFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Operation<T> = Arc<dyn Fn(T) -> WriteFuture + Send + Sync>;

pub struct Debouncer<T> {
    wait: Duration,
    operation: Operation<T>,
    latest: Arc<Mutex<Option<T>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Held for the duration of every write.
    writing: Arc<tokio::sync::Mutex<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Wraps `op`. Errors it returns are logged with `tracing::error!`.
    pub fn new<F, Fut, E>(wait: Duration, op: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let operation: Operation<T> = Arc::new(move |value: T| -> WriteFuture {
            let fut = op(value);
            Box::pin(async move {
                if let Err(e) = fut.await {
                    error!("Autosave failed: {e}");
                }
            })
        });

        Self {
            wait,
            operation,
            latest: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
            writing: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Replaces any pending write with `value`, due after the wait.
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, value: T) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);

        let latest = Arc::clone(&self.latest);
        let operation = Arc::clone(&self.operation);
        let writing = Arc::clone(&self.writing);
        let wait = self.wait;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            // the value stays in `latest` until the write can start
            let guard = writing.lock_owned().await;
            let value = latest.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(value) = value {
                debug!("Debounce window elapsed, writing");
                tokio::spawn(async move {
                    operation(value).await;
                    drop(guard);
                });
            }
        }));
    }

    /// True while a write is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drops the pending write, if any. In-flight writes are unaffected.
    pub fn cancel(&self) {
        if let Some(pending) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Drops the pending write, then waits until no write is in flight.
    /// Nothing scheduled before this call can land after it returns.
    pub async fn cancel_and_wait(&self) {
        self.cancel();
        let _idle = self.writing.lock().await;
    }

    /// Runs the pending write now instead of waiting out the window.
    pub async fn flush(&self) {
        if let Some(pending) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
        let value = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(value) = value {
            let _guard = self.writing.lock().await;
            (self.operation)(value).await;
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft_store::StoreError;
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;

    const DEFAULT_WAIT: Duration = Duration::from_millis(1000);

    type Calls = Arc<Mutex<Vec<u32>>>;

    fn recording(wait: Duration) -> (Debouncer<u32>, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(wait, move |v| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(v);
                Ok::<(), StoreError>(())
            }
        });
        (debouncer, calls)
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_burst_within_window_writes_once_with_last_value() {
        let (debouncer, calls) = recording(DEFAULT_WAIT);

        for v in 1..=5 {
            debouncer.schedule(v);
            tokio::time::advance(Duration::from_millis(200)).await;
        }
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(DEFAULT_WAIT).await;
        settle().await;

        assert_eq!(*calls.lock().unwrap(), vec![5]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_nothing_written_before_window_elapses() {
        let (debouncer, calls) = recording(DEFAULT_WAIT);

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(999)).await;
        settle().await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_separate_windows_write_separately() {
        let (debouncer, calls) = recording(DEFAULT_WAIT);

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;
        debouncer.schedule(2);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_cancel_drops_pending_write() {
        let (debouncer, calls) = recording(DEFAULT_WAIT);

        debouncer.schedule(7);
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_flush_writes_immediately_and_only_once() {
        let (debouncer, calls) = recording(DEFAULT_WAIT);

        debouncer.schedule(3);
        debouncer.schedule(4);
        debouncer.flush().await;
        assert_eq!(*calls.lock().unwrap(), vec![4]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(*calls.lock().unwrap(), vec![4]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_failing_write_is_swallowed() {
        let attempts = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&attempts);
        let debouncer = Debouncer::new(DEFAULT_WAIT, move |_: u32| {
            let counter = Arc::clone(&counter);
            async move {
                *counter.lock().unwrap() += 1;
                Err::<(), StoreError>(StoreError::Io(io::Error::other("disk full")))
            }
        });

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;
        assert_eq!(*attempts.lock().unwrap(), 1);

        // the scheduler is still usable after a failure
        debouncer.schedule(2);
        debouncer.flush().await;
        assert_eq!(*attempts.lock().unwrap(), 2);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_failed_write_is_logged_as_error() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let debouncer = Debouncer::new(DEFAULT_WAIT, |_: u32| async {
            Err::<(), StoreError>(StoreError::Io(io::Error::other("disk full")))
        });
        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;

        let output = logs.contents();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("Autosave failed"), "{output}");
        assert!(output.contains("disk full"), "{output}");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_cancel_and_wait_outlasts_in_flight_write() {
        let finished = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&finished);
        let debouncer = Debouncer::new(DEFAULT_WAIT, move |_: u32| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                *flag.lock().unwrap() = true;
                Ok::<(), StoreError>(())
            }
        });

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;
        assert!(!*finished.lock().unwrap());

        // the write is past its window; only waiting can observe its end
        debouncer.cancel_and_wait().await;
        assert!(*finished.lock().unwrap());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_cancel_and_wait_drops_pending_write() {
        let (debouncer, calls) = recording(DEFAULT_WAIT);

        debouncer.schedule(9);
        debouncer.cancel_and_wait().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert!(calls.lock().unwrap().is_empty());
        assert!(!debouncer.is_pending());
    }
}
