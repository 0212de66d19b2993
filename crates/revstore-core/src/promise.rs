//! Single-settlement asynchronous result.
//!
//! A [`Deferred`] is the producer handle and a [`Promise`] the observer
//! handle of the same cell. The cell starts pending and is settled exactly
//! once, by whichever of `resolve`/`reject` runs first. Later settlement
//! attempts are ignored: they return `false` and log a warning.
//!
//! Observers registered while pending run once at settlement time, on the
//! settling thread. Observers registered after settlement run immediately
//! on the registering thread with the recorded outcome.
//!
//! If every `Deferred` handle is dropped while the cell is still pending,
//! the cell is rejected with a [`ErrorKind::Fatal`] error so awaiting
//! observers never hang.

use std::fmt;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

type Observer<T> = Box<dyn FnOnce(&AppResult<T>) + Send>;

enum State<T> {
    Pending(Vec<Observer<T>>),
    Settled(AppResult<T>),
}

struct Cell<T> {
    state: Mutex<State<T>>,
    producers: AtomicUsize,
}

impl<T> Cell<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Observers run outside the lock, so a poisoned lock still holds a
        // consistent state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> Cell<T> {
    fn settle(&self, outcome: AppResult<T>) -> bool {
        let observers = {
            let mut state = self.lock();
            match &mut *state {
                State::Settled(_) => return false,
                State::Pending(observers) => {
                    let observers = std::mem::take(observers);
                    *state = State::Settled(outcome.clone());
                    observers
                }
            }
        };

        for observer in observers {
            observer(&outcome);
        }
        true
    }
}

/// Producer handle of a single-settlement cell.
pub struct Deferred<T> {
    cell: Arc<Cell<T>>,
}

/// Observer handle of a single-settlement cell.
pub struct Promise<T> {
    cell: Arc<Cell<T>>,
}

impl<T: Clone + Send + 'static> Deferred<T> {
    /// Create a pending cell.
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Cell {
                state: Mutex::new(State::Pending(Vec::new())),
                producers: AtomicUsize::new(1),
            }),
        }
    }

    /// Create a pending cell and return both handles.
    pub fn pair() -> (Self, Promise<T>) {
        let deferred = Self::new();
        let promise = deferred.promise();
        (deferred, promise)
    }

    /// An observer handle for this cell.
    pub fn promise(&self) -> Promise<T> {
        Promise {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Settle with a value. Returns `false` if the cell was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with an error. Returns `false` if the cell was already settled.
    pub fn reject(&self, error: AppError) -> bool {
        self.settle(Err(error))
    }

    /// Settle with an outcome. Returns `false` if the cell was already settled.
    pub fn settle(&self, outcome: AppResult<T>) -> bool {
        let settled = self.cell.settle(outcome);
        if !settled {
            tracing::warn!("Ignoring settlement of an already settled promise");
        }
        settled
    }

    /// Whether the cell has been settled.
    pub fn is_settled(&self) -> bool {
        matches!(&*self.cell.lock(), State::Settled(_))
    }
}

impl<T: Clone + Send + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        self.cell.producers.fetch_add(1, Ordering::AcqRel);
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        if self.cell.producers.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        // Last producer gone. Settling requires `T: Clone`, which `Drop`
        // cannot demand, so waiting observers are failed directly.
        let observers = {
            let mut state = self.cell.lock();
            match &mut *state {
                State::Settled(_) => return,
                State::Pending(observers) => {
                    let observers = std::mem::take(observers);
                    *state = State::Settled(Err(abandoned()));
                    observers
                }
            }
        };
        let outcome = Err(abandoned());
        for observer in observers {
            observer(&outcome);
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

fn abandoned() -> AppError {
    AppError::new(
        ErrorKind::Fatal,
        "Deferred dropped before the promise was settled",
    )
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Register an observer for the outcome.
    pub fn on_settled<F>(&self, observer: F)
    where
        F: FnOnce(&AppResult<T>) + Send + 'static,
    {
        let outcome = {
            let mut state = self.cell.lock();
            match &mut *state {
                State::Pending(observers) => {
                    observers.push(Box::new(observer));
                    return;
                }
                State::Settled(outcome) => outcome.clone(),
            }
        };
        observer(&outcome);
    }

    /// Register an observer that only runs on success.
    pub fn on_success<F>(&self, observer: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.on_settled(move |outcome| {
            if let Ok(value) = outcome {
                observer(value);
            }
        });
    }

    /// Register an observer that only runs on failure.
    pub fn on_error<F>(&self, observer: F)
    where
        F: FnOnce(&AppError) + Send + 'static,
    {
        self.on_settled(move |outcome| {
            if let Err(error) = outcome {
                observer(error);
            }
        });
    }

    /// Whether the cell has been settled.
    pub fn is_settled(&self) -> bool {
        matches!(&*self.cell.lock(), State::Settled(_))
    }

    /// The recorded outcome, if settled.
    pub fn outcome(&self) -> Option<AppResult<T>> {
        match &*self.cell.lock() {
            State::Pending(_) => None,
            State::Settled(outcome) => Some(outcome.clone()),
        }
    }

    /// Wait for the outcome without blocking the thread.
    pub async fn wait(self) -> AppResult<T> {
        let (tx, rx) = oneshot::channel();
        self.on_settled(move |outcome| {
            let _ = tx.send(outcome.clone());
        });
        rx.await
            .unwrap_or_else(|_| Err(AppError::fatal("Promise observer was dropped unsettled")))
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> IntoFuture for Promise<T> {
    type Output = AppResult<T>;
    type IntoFuture = BoxFuture<'static, AppResult<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
