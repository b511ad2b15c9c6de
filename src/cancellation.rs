//! Cooperative cancellation handle shared by the orchestrator and both
//! repair engines (see §5 of the spec: checks happen between stages, never
//! mid-stage).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheap, cloneable cooperative cancellation handle.
///
/// A default-constructed token never cancels. Cloning shares the same
/// underlying flag, so cancelling any clone cancels all of them.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a new, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Observable by [`Self::is_cancelled`] on this
    /// token and any of its clones.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` if [`Self::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
