//! Caller-facing run controls.
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | [`Progress`] | core -> caller | ordered narration, bounded history |
//! | [`StopSignal`] | caller -> core | cooperative cancellation |
//!
//! Both are cheap to clone; clones share state.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::info;

// ============================================================================
// Constants
// ============================================================================

/// Messages kept for [`Progress::messages`]; older ones are dropped.
pub const HISTORY_LIMIT: usize = 1000;

// ============================================================================
// Progress
// ============================================================================

#[derive(Default)]
struct ProgressInner {
    /// Most recent messages, oldest first.
    log: Mutex<VecDeque<String>>,
    /// Live subscribers.
    subscribers: Mutex<Vec<mpsc::UnboundedSender<String>>>,
}

/// Human-readable progress narration.
///
/// Messages are recorded in emission order, mirrored to `tracing` and
/// forwarded to subscribers synchronously. Only the last
/// [`HISTORY_LIMIT`] are retained; a hunt that polls for hours emits a
/// line per iteration, and subscribers still see every one.
#[derive(Clone, Default)]
pub struct Progress {
    inner: Arc<ProgressInner>,
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("messages", &self.inner.log.lock().len())
            .finish_non_exhaustive()
    }
}

impl Progress {
    /// Creates an empty narration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn emit(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "srt_hunter::progress", "{message}");

        self.inner
            .subscribers
            .lock()
            .retain(|tx| tx.send(message.clone()).is_ok());

        let mut log = self.inner.log.lock();
        if log.len() == HISTORY_LIMIT {
            log.pop_front();
        }
        log.push_back(message);
    }

    /// Returns a receiver for messages emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.lock().push(tx);
        rx
    }

    /// Returns the retained messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.inner.log.lock().iter().cloned().collect()
    }

    /// Returns the most recent message.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.inner.log.lock().back().cloned()
    }

    /// Returns `true` if any retained message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.inner.log.lock().iter().any(|m| m.contains(needle))
    }
}

// ============================================================================
// StopSignal
// ============================================================================

/// Cooperative stop request.
///
/// The hunter checks it between iterations, never inside a single page
/// interaction.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates an untriggered signal.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop.
    #[inline]
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once a stop was requested.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Tests
// ============================================================================
