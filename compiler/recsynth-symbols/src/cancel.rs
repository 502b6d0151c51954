use miette::Diagnostic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[diagnostic(code(symbols::cancelled))]
#[error("compilation was cancelled")]
pub struct CancelledError;

/// Shared cancellation signal of one compilation.
///
/// Clones observe the same flag. Once cancelled, a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check(&self) -> Result<(), CancelledError> {
        if self.is_cancelled() {
            return Err(CancelledError);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cancel::{CancellationToken, CancelledError};
    use recsynth_macros::{assert_err, assert_ok};

    #[test]
    fn test_cancel_is_observed_by_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert_ok!(observer.check());
        token.cancel();
        assert_eq!(assert_err!(observer.check()), CancelledError);
    }
}
