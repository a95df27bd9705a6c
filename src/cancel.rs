//! Cooperative cancellation.
//!
//! A superseding run (triggered by newer source edits) flips the shared
//! token; every pipeline stage checks it at least once per declaration
//! and bails with [`Error::Cancelled`], discarding partial output
//! wholesale.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Cloning yields another handle to the same
/// flag, so the host keeps one clone and hands another to the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the run holding the paired handle.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Bails with [`Error::Cancelled`] once the token is flipped. Stages
    /// call this once per declaration.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_passes_checkpoints() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.checkpoint().is_ok());
    }

    #[test]
    fn test_cancel_reaches_cloned_handles() {
        let token = CancelToken::new();
        let handle = token.clone();

        token.cancel();

        assert!(handle.is_cancelled());
        assert!(matches!(handle.checkpoint(), Err(Error::Cancelled)));
    }
}
