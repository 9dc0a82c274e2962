//! Single Flight Module
//!
//! Collapses concurrent lookups for the same key into one execution: while
//! a load is in flight, every additional caller for that key waits on the
//! same completion signal and receives the identical result.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cache::ByteView;
use crate::error::{CacheError, Result};

type CallResult = Result<ByteView>;
type ResultReceiver = watch::Receiver<Option<CallResult>>;

// == Single Flight ==
/// Per-key coalescing of in-flight loads.
///
/// The first caller for a key becomes the leader: it runs the work future
/// without holding any lock and broadcasts the outcome. The in-flight record
/// is removed as soon as the work completes, so a later call for the same
/// key starts a fresh execution.
#[derive(Default)]
pub struct SingleFlight {
    calls: Mutex<HashMap<String, ResultReceiver>>,
}

/// Unregisters the leader's record even if its future is dropped mid-flight,
/// so a cancelled load cannot strand waiters behind a stale record.
struct FlightGuard<'a> {
    flight: &'a SingleFlight,
    key: String,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flight.calls.lock().remove(&self.key);
    }
}

impl SingleFlight {
    // == Constructor ==
    /// Creates a coalescer with no in-flight calls.
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Executes `work` for `key`, or joins an execution already in flight.
    ///
    /// For any key there is never more than one concurrent execution; all
    /// callers that overlap an execution observe its exact result.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> CallResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CallResult>,
    {
        enum Role {
            Leader(watch::Sender<Option<CallResult>>),
            Follower(ResultReceiver),
        }

        // The registry lock is released before any await point
        let role = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(receiver) => Role::Follower(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    calls.insert(key.to_string(), receiver);
                    Role::Leader(sender)
                }
            }
        };

        let sender = match role {
            Role::Follower(receiver) => return Self::wait(receiver).await,
            Role::Leader(sender) => sender,
        };

        let guard = FlightGuard {
            flight: self,
            key: key.to_string(),
        };

        let result = work().await;

        // Publish before unregistering so callers that joined during the
        // flight resolve from the channel
        let _ = sender.send(Some(result.clone()));
        drop(guard);

        result
    }

    /// Blocks until the leader publishes its result.
    async fn wait(mut receiver: ResultReceiver) -> CallResult {
        loop {
            let published: Option<CallResult> = receiver.borrow_and_update().clone();
            if let Some(result) = published {
                return result;
            }
            if receiver.changed().await.is_err() {
                // Leader dropped without publishing (cancelled mid-flight)
                let last: Option<CallResult> = receiver.borrow().clone();
                return last.unwrap_or_else(|| {
                    Err(CacheError::Internal(
                        "in-flight load was cancelled before completing".to_string(),
                    ))
                });
            }
        }
    }
}

impl std::fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}
