use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;

const WAITING: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLED: u8 = 2;

/// Handle to a task scheduled with [`schedule`].
///
/// Dropping the handle detaches the task; only [`TaskHandle::cancel`] stops it.
#[derive(Debug)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
    abort: AbortHandle,
}

impl TaskHandle {
    /// Prevents the task from running if its delay has not elapsed yet.
    ///
    /// A waiting task is aborted right away so it releases what it captured.
    /// A task that already started is left to finish.
    pub fn cancel(&self) {
        if self
            .state
            .compare_exchange(WAITING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CANCELLED
    }
}

/// Runs `task` on the tokio runtime after `delay`, unless cancelled first.
///
/// Must be called from within a tokio runtime.
pub fn schedule<F>(delay: Duration, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AtomicU8::new(WAITING));
    let flag = state.clone();
    let join = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if flag
            .compare_exchange(WAITING, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        task.await;
    });
    TaskHandle {
        state,
        abort: join.abort_handle(),
    }
}
