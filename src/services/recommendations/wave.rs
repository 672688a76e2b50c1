//! Timeout race for one spawned lookup
//!
//! Each lookup runs as its own task and hands back its result exactly once through its
//! `JoinHandle`. A wave waits on the handles, each raced against the wave's timeout.
//! When the timer wins, the handle is dropped: the task is detached and keeps running,
//! but nothing holds the other end any more, so its late result is simply discarded.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};

/// How one lookup ended
#[derive(Debug)]
pub enum Settled<T> {
    Ready(T),
    Failed(AppError),
    TimedOut,
}

/// Waits for a spawned lookup, giving up after `limit`
pub async fn settle<T>(handle: JoinHandle<AppResult<T>>, limit: Duration) -> Settled<T> {
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(Ok(value))) => Settled::Ready(value),
        Ok(Ok(Err(e))) => Settled::Failed(e),
        Ok(Err(join_error)) => Settled::Failed(AppError::Internal(format!(
            "Lookup task failed: {}",
            join_error
        ))),
        Err(_) => Settled::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ready() {
        let handle = tokio::spawn(async { Ok::<_, AppError>(7) });
        assert!(matches!(
            settle(handle, Duration::from_secs(1)).await,
            Settled::Ready(7)
        ));
    }

    #[tokio::test]
    async fn test_failed() {
        let handle =
            tokio::spawn(async { Err::<u8, _>(AppError::ExternalApi("down".to_string())) });
        assert!(matches!(
            settle(handle, Duration::from_secs(1)).await,
            Settled::Failed(AppError::ExternalApi(_))
        ));
    }

    #[tokio::test]
    async fn test_panicked_task_is_a_failure() {
        let handle = tokio::spawn(async {
            if true {
                panic!("lookup blew up");
            }
            Ok::<u8, AppError>(0)
        });
        assert!(matches!(
            settle(handle, Duration::from_secs(1)).await,
            Settled::Failed(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_timed_out_task_is_detached_not_cancelled() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, AppError>("late")
        });

        let outcome = settle(handle, Duration::from_millis(10)).await;
        assert!(matches!(outcome, Settled::TimedOut));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}
