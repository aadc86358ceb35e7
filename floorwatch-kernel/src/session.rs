//! Screen sessions: one mount of a screen, its in-flight fetch and its state.
//!
//! A session owns a [`CancellationToken`]. Unmounting (or dropping) the
//! session cancels it, and a fetch that completes afterwards is discarded
//! instead of being written into state nobody is looking at. Sessions are
//! independent; two mounts of the same screen fetch twice.

use crate::state::{shared, ScreenState, Shared};
use std::fmt::Display;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result (data or error) was written to the screen state
    Applied,
    /// The session was unmounted first; state left untouched
    Discarded,
}

pub struct ScreenSession<T> {
    screen: String,
    cancel: CancellationToken,
    state: Shared<ScreenState<T>>,
}

impl<T> ScreenSession<T> {
    pub fn mount(screen: impl Into<String>) -> Self {
        let screen = screen.into();
        debug!(screen = %screen, "screen mounted");
        Self {
            screen,
            cancel: CancellationToken::new(),
            state: shared(ScreenState::Idle),
        }
    }

    pub fn screen(&self) -> &str {
        &self.screen
    }

    /// Handle on the state, for renderers living elsewhere
    pub fn state(&self) -> Shared<ScreenState<T>> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> ScreenState<T>
    where
        T: Clone,
    {
        self.state.lock().clone()
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Token cancelled on unmount, for fetches that want to stop early themselves
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn unmount(&self) {
        if !self.cancel.is_cancelled() {
            debug!(screen = %self.screen, "screen unmounted");
            self.cancel.cancel();
        }
    }

    /// Run `fetch` and publish its result, unless the session goes away first.
    pub async fn load<F, Fut, E>(&self, fetch: F) -> LoadOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if self.cancel.is_cancelled() {
            return LoadOutcome::Discarded;
        }
        *self.state.lock() = ScreenState::Loading;

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = fetch() => Some(result),
        };

        let Some(result) = result.filter(|_| !self.cancel.is_cancelled()) else {
            debug!(screen = %self.screen, "fetch finished after unmount, result dropped");
            return LoadOutcome::Discarded;
        };

        let next = match result {
            Ok(data) => ScreenState::Ready(data),
            Err(e) => {
                warn!(screen = %self.screen, error = %e, "screen fetch failed");
                ScreenState::Failed(e.to_string())
            }
        };
        *self.state.lock() = next;
        LoadOutcome::Applied
    }

    /// User-triggered retry. Same as `load`; nothing retries on its own.
    pub async fn reload<F, Fut, E>(&self, fetch: F) -> LoadOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        debug!(screen = %self.screen, "reload requested");
        self.load(fetch).await
    }
}

impl<T> Drop for ScreenSession<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_load_applies_result() {
        let session = ScreenSession::mount("alerts");
        let outcome = session.load(|| async { Ok::<_, String>(vec![1, 2, 3]) }).await;

        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.snapshot(), ScreenState::Ready(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_failure_then_reload() {
        let session: ScreenSession<u32> = ScreenSession::mount("map");
        session.load(|| async { Err("HTTP error! status: 500") }).await;
        assert_eq!(session.snapshot().error(), Some("HTTP error! status: 500"));

        let outcome = session.reload(|| async { Ok::<_, String>(7) }).await;
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.snapshot().data(), Some(&7));
    }

    #[tokio::test]
    async fn test_unmount_discards_late_result() {
        let session: ScreenSession<u32> = ScreenSession::mount("details");
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, String>(1)
        };
        let unmount_soon = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.unmount();
        };

        let (outcome, _) = tokio::join!(session.load(slow), unmount_soon);

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(!session.is_mounted());
        assert!(session.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_load_after_unmount_is_noop() {
        let session: ScreenSession<u32> = ScreenSession::mount("rpm");
        session.unmount();
        let outcome = session.load(|| async { Ok::<_, String>(1) }).await;
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(session.snapshot(), ScreenState::Idle);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let first: ScreenSession<u32> = ScreenSession::mount("alerts");
        let second: ScreenSession<u32> = ScreenSession::mount("alerts");
        first.unmount();

        assert_eq!(second.load(|| async { Ok::<_, String>(2) }).await, LoadOutcome::Applied);
        assert!(first.snapshot().data().is_none());
    }
}
