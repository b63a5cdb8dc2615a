//! Single-flight execution of an async operation.
//!
//! The first caller starts the operation and parks its shared future in the
//! slot; callers arriving while it is pending await that same future instead
//! of starting their own. Once it resolves the slot is emptied, so the next
//! caller starts a fresh operation.

use std::sync::{Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

pub struct SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pending: Mutex<Option<Shared<BoxFuture<'static, T>>>>,
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        SingleFlight {
            pending: Mutex::new(None),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the pending operation, or starts one with `start` if none is pending.
    pub async fn run<F>(&self, start: F) -> T
    where
        F: FnOnce() -> BoxFuture<'static, T>,
    {
        let flight = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match pending.as_ref() {
                Some(flight) => flight.clone(),
                None => {
                    let flight = start().shared();
                    *pending = Some(flight.clone());
                    flight
                }
            }
        };

        let output = flight.clone().await;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending
            .as_ref()
            .is_some_and(|current| Shared::ptr_eq(current, &flight))
        {
            *pending = None;
        }
        output
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
