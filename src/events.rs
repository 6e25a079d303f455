//! Event source contract and the in-memory event source.

use std::collections::VecDeque;

use crate::error::Error;
use crate::event::{Event, EventKind, MarkedEvent};
use crate::location::Location;

/// A source of parse events, consumed in strict order.
///
/// `peek` is non-destructive; `next` returns the same event `peek` would have returned.
pub trait Events {
    /// Look at the next event without consuming it. `Ok(None)` means the source is exhausted.
    fn peek(&mut self) -> Result<Option<&MarkedEvent>, Error>;

    /// Consume the next event.
    fn next(&mut self) -> Result<Option<MarkedEvent>, Error>;

    /// Location of the last consumed event, for end-of-input diagnostics.
    fn last_location(&self) -> Location;

    /// True if the next event is of the given kind.
    fn check(&mut self, kind: EventKind) -> Result<bool, Error> {
        Ok(self.peek()?.is_some_and(|ev| ev.kind() == kind))
    }
}

/// Events replayed from memory.
///
/// Useful for events produced by another parser, for tests, and for re-composing a graph
/// from events derived from it.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    buf: VecDeque<MarkedEvent>,
    last_location: Location,
}

impl EventQueue {
    pub fn new(events: impl IntoIterator<Item = MarkedEvent>) -> Self {
        Self {
            buf: events.into_iter().collect(),
            last_location: Location::UNKNOWN,
        }
    }

    /// Build a queue from unmarked events; all locations are unknown.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        Self::new(events.into_iter().map(MarkedEvent::from))
    }

    /// Wrap the events of a single document with stream and document markers.
    pub fn document(events: impl IntoIterator<Item = Event>) -> Self {
        let mut all = vec![
            Event::StreamStart,
            Event::DocumentStart { explicit: false },
        ];
        all.extend(events);
        all.push(Event::DocumentEnd { explicit: false });
        all.push(Event::StreamEnd);
        Self::from_events(all)
    }

    pub fn push(&mut self, ev: impl Into<MarkedEvent>) {
        self.buf.push_back(ev.into());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Events for EventQueue {
    fn peek(&mut self) -> Result<Option<&MarkedEvent>, Error> {
        Ok(self.buf.front())
    }

    fn next(&mut self) -> Result<Option<MarkedEvent>, Error> {
        let ev = self.buf.pop_front();
        if let Some(ev) = &ev {
            self.last_location = ev.end;
        }
        Ok(ev)
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}

impl<E: Events + ?Sized> Events for &mut E {
    fn peek(&mut self) -> Result<Option<&MarkedEvent>, Error> {
        (**self).peek()
    }

    fn next(&mut self) -> Result<Option<MarkedEvent>, Error> {
        (**self).next()
    }

    fn last_location(&self) -> Location {
        (**self).last_location()
    }

    fn check(&mut self, kind: EventKind) -> Result<bool, Error> {
        (**self).check(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_then_next_yields_the_same_event() {
        let mut q = EventQueue::from_events([Event::StreamStart, Event::StreamEnd]);
        assert!(q.check(EventKind::StreamStart).unwrap());
        let peeked = q.peek().unwrap().cloned();
        assert_eq!(q.next().unwrap(), peeked);
        assert!(q.check(EventKind::StreamEnd).unwrap());
        assert!(q.next().unwrap().is_some());
        assert!(q.next().unwrap().is_none());
        assert!(!q.check(EventKind::StreamEnd).unwrap());
    }

    #[test]
    fn document_wraps_markers() {
        let q = EventQueue::document([Event::plain("x")]);
        assert_eq!(q.len(), 5);
    }
}
