//! Cancellation and deadlines for a scan.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-scan environment handed to a table by the engine.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    cancel: CancelFlag,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share `flag` with whoever may cancel the scan.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Explicit query timeout, measured from the start of each scan.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ambient deadline; ignored when a timeout is set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Effective deadline of a scan started at `start`.
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        match self.timeout {
            Some(timeout) => start.checked_add(timeout),
            None => self.deadline,
        }
    }
}
