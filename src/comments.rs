//! Buffering of comment events ahead of the next node event.

use crate::error::Error;
use crate::event::{CommentKind, CommentLine, Event, MarkedEvent};
use crate::events::Events;

/// Collects consecutive comment events of the accepted kinds from an event source.
///
/// The composer keeps two collectors: one for block comments and blank lines (attached before
/// a node, or at the end of a document), one for in-line comments (attached after a value).
#[derive(Debug)]
pub struct CommentCollector {
    accepts: &'static [CommentKind],
    buffer: Vec<CommentLine>,
}

impl CommentCollector {
    /// Collector for comments on their own line and for blank lines.
    pub fn block() -> Self {
        Self::new(&[CommentKind::BlankLine, CommentKind::Block])
    }

    /// Collector for comments trailing a value.
    pub fn inline() -> Self {
        Self::new(&[CommentKind::InLine])
    }

    pub fn new(accepts: &'static [CommentKind]) -> Self {
        Self {
            accepts,
            buffer: Vec::new(),
        }
    }

    /// Move pending comments of an accepted kind from `events` into the buffer. Stops at the
    /// first event that is not such a comment and leaves it unconsumed.
    pub fn collect<E: Events + ?Sized>(&mut self, events: &mut E) -> Result<&mut Self, Error> {
        loop {
            let accepted = match events.peek()? {
                Some(ev) => match &ev.event {
                    Event::Comment(line) => self.accepts.contains(&line.kind),
                    _ => false,
                },
                None => false,
            };
            if !accepted {
                return Ok(self);
            }
            match events.next()? {
                Some(MarkedEvent {
                    event: Event::Comment(line),
                    start,
                    end,
                }) => {
                    let line = if line.start.is_known() {
                        line
                    } else {
                        line.at(start, end)
                    };
                    self.buffer.push(line);
                }
                _ => return Ok(self),
            }
        }
    }

    /// Drain the buffer.
    pub fn consume(&mut self) -> Vec<CommentLine> {
        std::mem::take(&mut self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::events::EventQueue;
    use crate::location::Location;

    fn comment(kind: CommentKind, text: &str) -> MarkedEvent {
        Event::Comment(CommentLine::new(kind, text)).into()
    }

    #[test]
    fn block_collector_stops_at_inline_comment() {
        let mut q = EventQueue::new([
            comment(CommentKind::Block, "one"),
            comment(CommentKind::BlankLine, ""),
            comment(CommentKind::InLine, "trailing"),
            Event::plain("v").into(),
        ]);
        let mut block = CommentCollector::block();
        let lines = block.collect(&mut q).unwrap().consume();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].value, "one");
        assert!(block.is_empty());
        assert!(q.check(EventKind::Comment).unwrap());

        let mut inline = CommentCollector::inline();
        inline.collect(&mut q).unwrap();
        assert!(!inline.is_empty());
        assert_eq!(inline.consume()[0].value, "trailing");
        assert!(q.check(EventKind::Scalar).unwrap());
    }

    #[test]
    fn collected_lines_take_the_event_location() {
        let start = Location::new(4, 3, 20);
        let end = Location::new(4, 9, 26);
        let own = Location::new(7, 1, 40);
        let mut q = EventQueue::new([
            MarkedEvent::new(
                Event::Comment(CommentLine::new(CommentKind::Block, "marked")),
                start,
                end,
            ),
            MarkedEvent::new(
                Event::Comment(CommentLine::new(CommentKind::Block, "own").at(own, own)),
                start,
                end,
            ),
        ]);
        let lines = CommentCollector::block().collect(&mut q).unwrap().consume();
        assert_eq!((lines[0].start, lines[0].end), (start, end));
        assert_eq!(lines[1].start, own);
    }
}
