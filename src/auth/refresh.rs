//! Single-flight coordination for token refresh

use std::future::Future;
use std::sync::Mutex;

use log::debug;
use tokio::sync::broadcast;

use crate::error::Error;

/// Outcome broadcast to callers waiting on an in-flight refresh.
/// `Err` carries a message rather than the original error because the
/// outcome fans out to every waiter and must be cloneable.
type RefreshOutcome = Result<String, String>;

/// Ensures at most one refresh call is in flight at a time.
///
/// The first caller to observe an expired token becomes the leader and
/// performs the network call; every caller arriving while that call is
/// pending subscribes to its outcome instead of issuing another refresh.
/// The pending state exists only while a refresh is in flight and is
/// discarded when it resolves.
///
/// Coordination is per-process. Two processes sharing a refresh token may
/// both refresh; the server is expected to tolerate that, and no
/// cross-process lock is attempted.
pub(crate) struct RefreshCoordinator {
    inflight: Mutex<Option<broadcast::Sender<RefreshOutcome>>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(None),
        }
    }

    /// Run `refresh` single-flight and return the new access token.
    ///
    /// The closure performs the actual refresh call and any token-store
    /// bookkeeping; this type only decides who runs it. On failure every
    /// waiter receives an authentication error, signalling that the session
    /// should be treated as unauthenticated.
    pub async fn run<F, Fut>(&self, refresh: F) -> Result<String, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, Error>>,
    {
        let waiter = {
            let mut inflight = self.inflight.lock().unwrap();
            match inflight.as_ref() {
                Some(sender) => Some(sender.subscribe()),
                None => {
                    let (sender, _) = broadcast::channel(1);
                    *inflight = Some(sender);
                    None
                }
            }
        };

        if let Some(mut receiver) = waiter {
            debug!("refresh already in flight, waiting for its outcome");
            return match receiver.recv().await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(message)) => Err(Error::Auth(message)),
                // The leader dropped without broadcasting; treat the
                // session as unauthenticated rather than retrying.
                Err(_) => Err(Error::auth("token refresh was abandoned")),
            };
        }

        debug!("starting token refresh");
        let result = refresh().await;

        // Clear the pending state before waking waiters so a caller that
        // arrives after completion starts a new refresh instead of
        // subscribing to a resolved one.
        let sender = {
            let mut inflight = self.inflight.lock().unwrap();
            inflight.take()
        };

        let outcome = match &result {
            Ok(token) => Ok(token.clone()),
            Err(err) => Err(err.to_string()),
        };
        if let Some(sender) = sender {
            // No waiters is fine; send only fails when nobody subscribed.
            let _ = sender.send(outcome);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coordinator = coordinator.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                coordinator
                    .run(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok("fresh-token".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token, "fresh-token");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_rejects_every_waiter() {
        let coordinator = Arc::new(RefreshCoordinator::new());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator
                    .run(|| async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(Error::auth("refresh token rejected"))
                    })
                    .await
            }));
        }

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(err.is_auth());
        }
    }

    #[tokio::test]
    async fn completed_refresh_allows_a_new_one() {
        let coordinator = RefreshCoordinator::new();
        let first = coordinator.run(|| async { Ok("one".to_string()) }).await;
        assert_eq!(first.unwrap(), "one");
        let second = coordinator.run(|| async { Ok("two".to_string()) }).await;
        assert_eq!(second.unwrap(), "two");
    }
}
