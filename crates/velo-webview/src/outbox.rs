use std::collections::VecDeque;

use tracing::warn;

/// Most scripts held back while the page is not ready.
pub const MAX_PENDING: usize = 1024;

/// Host-to-page scripts held until the page has installed its listeners.
///
/// The page announces readiness with its first message. A new navigation
/// resets the state, since the next document starts without listeners.
#[derive(Debug, Default)]
pub struct Outbox {
    ready: bool,
    pending: VecDeque<String>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns the script when it can run now, otherwise queues it.
    pub fn submit(&mut self, script: String) -> Option<String> {
        if self.ready {
            return Some(script);
        }
        if self.pending.len() == MAX_PENDING {
            warn!("page not ready, dropping oldest queued message");
            self.pending.pop_front();
        }
        self.pending.push_back(script);
        None
    }

    /// Mark the page ready and return everything queued, oldest first.
    pub fn mark_ready(&mut self) -> Vec<String> {
        self.ready = true;
        self.pending.drain(..).collect()
    }

    /// The page is navigating away. Queued scripts stay queued.
    pub fn reset(&mut self) {
        self.ready = false;
    }
}
