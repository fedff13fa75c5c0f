//! Line item id generation.
//!
//! Ids are millisecond timestamps taken when a product is first added.
//! [`ClockIdGenerator`] is the production source; [`SequentialIdGenerator`]
//! gives tests deterministic ids.

use chrono::Utc;
use pipo_core::LineItemId;

/// Source of fresh line item ids.
pub trait IdGenerator {
    /// Produce an id not handed out before by this generator.
    fn next_id(&mut self) -> LineItemId;
}

/// Timestamp ids (Unix milliseconds), strictly increasing even when several
/// items are added within the same millisecond or the clock steps back.
#[derive(Debug, Default)]
pub struct ClockIdGenerator {
    last: i64,
}

impl ClockIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for ClockIdGenerator {
    fn next_id(&mut self) -> LineItemId {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last.saturating_add(1));
        LineItemId::new(self.last)
    }
}

/// Counts up from a fixed starting value.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: i64,
}

impl SequentialIdGenerator {
    #[must_use]
    pub const fn starting_at(first: i64) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> LineItemId {
        let id = LineItemId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
