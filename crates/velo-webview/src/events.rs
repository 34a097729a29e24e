//! Events raised by the web surface and the tray, queued for the loop.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use velo_tray::TrayEvent;

use crate::scheme::SchemeTask;

/// State of a page load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLoadState {
    /// Navigation has started.
    Started,
    /// Page has fully loaded (DOMContentLoaded + resources).
    Finished,
}

impl From<wry::PageLoadEvent> for PageLoadState {
    fn from(e: wry::PageLoadEvent) -> Self {
        match e {
            wry::PageLoadEvent::Started => Self::Started,
            wry::PageLoadEvent::Finished => Self::Finished,
        }
    }
}

/// Files dragged over or dropped onto the surface. Positions are in
/// physical pixels relative to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropEvent {
    Enter {
        paths: Vec<PathBuf>,
        position: (i32, i32),
    },
    Over {
        position: (i32, i32),
    },
    Drop {
        paths: Vec<PathBuf>,
        position: (i32, i32),
    },
    Leave,
}

impl DropEvent {
    pub(crate) fn from_wry(event: wry::DragDropEvent) -> Option<Self> {
        match event {
            wry::DragDropEvent::Enter { paths, position } => Some(Self::Enter { paths, position }),
            wry::DragDropEvent::Over { position } => Some(Self::Over { position }),
            wry::DragDropEvent::Drop { paths, position } => Some(Self::Drop { paths, position }),
            wry::DragDropEvent::Leave => Some(Self::Leave),
            _ => None,
        }
    }
}

/// Everything the loop hands to the host.
pub enum ShellEvent {
    PageLoad { state: PageLoadState, url: String },
    TitleChanged { title: String },
    /// Text posted by page script through `window.__velo.postMessage`.
    PageMessage { body: String },
    /// An intercepted load under the reserved scheme, waiting to be finished.
    SchemeRequest(SchemeTask),
    DragDrop(DropEvent),
    Tray(TrayEvent),
}

impl fmt::Debug for ShellEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageLoad { state, url } => f
                .debug_struct("PageLoad")
                .field("state", state)
                .field("url", url)
                .finish(),
            Self::TitleChanged { title } => {
                f.debug_struct("TitleChanged").field("title", title).finish()
            }
            Self::PageMessage { body } => f
                .debug_struct("PageMessage")
                .field("len", &body.len())
                .finish(),
            Self::SchemeRequest(task) => f.debug_tuple("SchemeRequest").field(task).finish(),
            Self::DragDrop(event) => f.debug_tuple("DragDrop").field(event).finish(),
            Self::Tray(event) => f.debug_tuple("Tray").field(event).finish(),
        }
    }
}

type Wake = Arc<dyn Fn() + Send + Sync>;

/// Event sink shared by the native callbacks and drained by the loop.
#[derive(Clone, Default)]
pub struct EventQueue {
    events: Arc<Mutex<Vec<ShellEvent>>>,
    wake: Option<Wake>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `wake` after every push so a sleeping loop picks the event up.
    pub fn with_waker(mut self, wake: impl Fn() + Send + Sync + 'static) -> Self {
        self.wake = Some(Arc::new(wake));
        self
    }

    pub fn push(&self, event: ShellEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
        if let Some(wake) = &self.wake {
            wake();
        }
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<ShellEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use velo_common::MenuItemId;

    #[test]
    fn drain_returns_in_push_order_and_empties() {
        let queue = EventQueue::new();
        queue.push(ShellEvent::PageMessage { body: "a".into() });
        queue.push(ShellEvent::Tray(TrayEvent::MenuItemActivated(MenuItemId(3))));
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(&drained[0], ShellEvent::PageMessage { body } if body == "a"));
        assert!(matches!(
            drained[1],
            ShellEvent::Tray(TrayEvent::MenuItemActivated(MenuItemId(3)))
        ));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn clones_share_the_queue() {
        let queue = EventQueue::new();
        let producer = queue.clone();
        std::thread::spawn(move || {
            producer.push(ShellEvent::TitleChanged {
                title: "Inbox".into(),
            })
        })
        .join()
        .unwrap();
        assert_eq!(queue.drain().len(), 1);
    }

    #[test]
    fn push_wakes_the_loop() {
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        let queue = EventQueue::new().with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        queue.push(ShellEvent::DragDrop(DropEvent::Leave));
        assert_eq!(woken.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn page_load_state_from_wry() {
        assert_eq!(
            PageLoadState::from(wry::PageLoadEvent::Started),
            PageLoadState::Started
        );
        assert_eq!(
            PageLoadState::from(wry::PageLoadEvent::Finished),
            PageLoadState::Finished
        );
    }

    #[test]
    fn drop_event_from_wry() {
        let event = DropEvent::from_wry(wry::DragDropEvent::Drop {
            paths: vec![PathBuf::from("/tmp/a.txt")],
            position: (10, 20),
        });
        assert_eq!(
            event,
            Some(DropEvent::Drop {
                paths: vec![PathBuf::from("/tmp/a.txt")],
                position: (10, 20)
            })
        );
    }

    #[test]
    fn debug_hides_message_body() {
        let text = format!(
            "{:?}",
            ShellEvent::PageMessage {
                body: "secret".into()
            }
        );
        assert!(!text.contains("secret"));
    }
}
