//! Per-run analysis context.
//!
//! Every entry point that logs or loops takes an [`AnalysisContext`] instead
//! of reaching for process-wide state. The context carries the tracing span
//! the run logs under and a cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::Span;

use crate::error::{AnalysisError, AnalysisResult};

/// Cooperative cancellation token.
///
/// Clones share the same flag, so a token handed to another thread can
/// abort a run in progress. Loops check it between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new token (not cancelled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Logging handle plus cancellation signal for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    span: Span,
    cancellation: CancellationToken,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisContext {
    /// Creates a context with a fresh token, logging under an `analysis` span.
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Creates a context sharing an existing cancellation token.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            span: tracing::info_span!("analysis"),
            cancellation,
        }
    }

    /// Replaces the span this context logs under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The span analysis steps enter while they run.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The cancellation token shared with the caller.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns `Err(AnalysisError::Cancelled)` once cancellation is requested.
    pub fn checkpoint(&self) -> AnalysisResult<()> {
        if self.cancellation.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_checkpoint_reports_cancellation() {
        let token = CancellationToken::new();
        let ctx = AnalysisContext::with_cancellation(token.clone());
        assert!(ctx.checkpoint().is_ok());

        token.cancel();
        let err = ctx.checkpoint().unwrap_err();
        assert!(err.is_cancelled());
    }
}
