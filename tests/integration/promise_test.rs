//! Single-settlement promises, inline and dispatched to the worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use revstore_core::config::WorkerConfig;
use revstore_core::error::{AppError, ErrorKind};
use revstore_core::promise::Deferred;
use revstore_worker::{AsyncDeferred, WorkerPool};

#[tokio::test]
async fn test_first_settlement_wins() {
    let (deferred, promise) = Deferred::<u32>::pair();
    assert!(deferred.resolve(7));
    assert!(!deferred.reject(AppError::internal("too late")));

    let seen = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    {
        let seen = Arc::clone(&seen);
        promise.on_success(move |value| {
            assert_eq!(*value, 7);
            seen.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let errors = Arc::clone(&errors);
        promise.on_error(move |_| {
            errors.fetch_add(1, Ordering::SeqCst);
        });
    }

    // Late observers run immediately, on this thread.
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(promise.await.unwrap(), 7);
}

#[tokio::test]
async fn test_early_observer_runs_once_at_settlement() {
    let (deferred, promise) = Deferred::<&'static str>::pair();
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = Arc::clone(&calls);
        promise.on_settled(move |outcome| {
            assert_eq!(outcome.as_ref().unwrap_err().kind, ErrorKind::FileNotFound);
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    deferred.reject(AppError::not_found("gone"));
    deferred.resolve("ignored");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_settlement_on_worker_pool() {
    let pool = WorkerPool::start(&WorkerConfig {
        concurrency: 1,
        queue_capacity: 8,
    });
    let (deferred, promise) = AsyncDeferred::<u64>::pair(pool.clone());

    deferred.resolve(42).unwrap();
    deferred.reject(AppError::internal("late")).unwrap();

    assert_eq!(promise.clone().await.unwrap(), 42);
    assert_eq!(promise.outcome().unwrap().unwrap(), 42);
    pool.shutdown().await;
}
