//! Session lifecycle state
//!
//! A session moves Active → Closing → Closed and never back. The read path,
//! the write path and the server actor all share one `SessionControl`; the
//! first of them to call [`SessionControl::close`] wins and cancels the token
//! both I/O paths wait on.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

/// Lifecycle state of a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Reading and writing normally
    Active = 0,
    /// Shutdown requested; I/O paths are unwinding
    Closing = 1,
    /// Both I/O paths have stopped and the client is deregistered
    Closed = 2,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Active,
            1 => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }
}

/// Shared close signal for one session
#[derive(Debug)]
pub struct SessionControl {
    state: AtomicU8,
    token: CancellationToken,
}

impl SessionControl {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Active as u8),
            token: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Request shutdown.
    ///
    /// Returns true only for the call that performed Active → Closing.
    pub fn close(&self) -> bool {
        let transitioned = self
            .state
            .compare_exchange(
                SessionState::Active as u8,
                SessionState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        self.token.cancel();
        transitioned
    }

    /// Mark both I/O paths as finished.
    pub fn finish(&self) {
        self.token.cancel();
        self.state
            .store(SessionState::Closed as u8, Ordering::Release);
    }

    /// Resolves once `close` or `finish` has been called
    pub async fn closed(&self) {
        self.token.cancelled().await;
    }
}

impl Default for SessionControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_is_idempotent() {
        let control = SessionControl::new();
        assert!(control.is_active());

        assert!(control.close());
        assert_eq!(control.state(), SessionState::Closing);
        assert!(!control.close());
        assert_eq!(control.state(), SessionState::Closing);

        control.finish();
        assert_eq!(control.state(), SessionState::Closed);
        assert!(!control.close());
        assert_eq!(control.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let control = std::sync::Arc::new(SessionControl::new());
        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.closed().await })
        };

        control.close();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
    }
}
