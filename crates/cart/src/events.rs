//! Notifications from the cart engine to the presentation layer.
//!
//! The engine never touches UI. After each command it emits [`CartEvent`]s:
//! a re-render request, the new badge count, and user-facing [`Notice`]s
//! (validation problems, shipping results, checkout confirmation).

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

/// A message meant for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CartEvent {
    /// Cart contents or totals changed; re-render the cart view.
    CartChanged,
    /// Total unit count changed; refresh the navbar badge.
    BadgeChanged { count: u32 },
    /// Show a message to the shopper.
    Notice(Notice),
}

/// Receives [`CartEvent`]s from a [`crate::CartService`].
pub trait CartObserver {
    fn notify(&mut self, event: &CartEvent);
}

impl<F: FnMut(&CartEvent)> CartObserver for F {
    fn notify(&mut self, event: &CartEvent) {
        self(event);
    }
}

/// Observer that records every event, readable through any clone.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<CartEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<CartEvent> {
        self.events.borrow().clone()
    }

    /// Only the notices, in order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                CartEvent::Notice(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent badge count, if any was emitted.
    #[must_use]
    pub fn last_badge_count(&self) -> Option<u32> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            CartEvent::BadgeChanged { count } => Some(*count),
            _ => None,
        })
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl CartObserver for EventLog {
    fn notify(&mut self, event: &CartEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
