use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Cross-thread request to leave the event loop.
///
/// Cloning shares the flag. `request` can be called from any thread; the
/// loop that installed a waker is nudged so it notices without waiting for
/// the next input event.
#[derive(Clone, Default)]
pub struct QuitHandle {
    requested: Arc<AtomicBool>,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl QuitHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        let waker = match self.waker.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(wake) = waker {
            wake();
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Forget an earlier request. The tray loop clears it on the way out;
    /// it does not make a finished loop runnable again.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    pub fn set_waker(&self, wake: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut guard) = self.waker.lock() {
            *guard = Some(Arc::new(wake));
        }
    }

    pub fn clear_waker(&self) {
        if let Ok(mut guard) = self.waker.lock() {
            *guard = None;
        }
    }
}

impl fmt::Debug for QuitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuitHandle")
            .field("requested", &self.is_requested())
            .finish_non_exhaustive()
    }
}
