//! Live events: the [`Events`] contract over `saphyr_parser::Parser`.
//!
//! Responsibilities
//! - Translate parser events one-to-one into owned [`MarkedEvent`]s, stream and document
//!   markers included.
//! - Recover anchor names and flow style from the source text.
//! - Track source locations for diagnostics.
//! - Maintain one-item lookahead (`look`).
//!
//! Anchors
//! - The parser reports anchors as numeric ids, and a node's span starts after its
//!   properties. The declared name is the last `&name` token between the previous event and
//!   the node's content; otherwise the id itself becomes the name. Aliases take the name
//!   recorded for their id, so both sides always agree.
//!
//! Tags
//! - Tags are rebuilt as handle prefix followed by suffix. The non-specific `!` comes out as
//!   `!`, verbatim tags as written.
//!
//! Comments
//! - The parser drops comments, so this source never yields comment events.

use std::borrow::Cow;
use std::collections::HashMap;

use saphyr_parser::{Event as RawEvent, Parser, ScalarStyle as RawStyle, StrInput, Tag as RawTag};
use tracing::trace;

use crate::error::Error;
use crate::event::{Event, FlowStyle, MarkedEvent, ScalarStyle};
use crate::events::Events;
use crate::location::{Location, location_from_span};

/// Live event source that wraps `saphyr_parser::Parser`.
pub struct LiveEvents<'a> {
    /// Underlying streaming parser that produces raw events from the input.
    parser: Parser<'a, StrInput<'a>>,
    /// Source text, for anchor names and flow indicators.
    input: &'a str,
    /// Single-item lookahead buffer (peeked event not yet consumed).
    look: Option<MarkedEvent>,
    /// Anchor id -> declared name.
    names: HashMap<usize, String>,
    /// Byte offset past the last translated event; anchor properties are searched after it.
    cursor: usize,
    /// Location of the last yielded event (for better error reporting).
    last_location: Location,
}

impl<'a> LiveEvents<'a> {
    /// Create a new live event source over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            parser: Parser::new_from_str(input),
            input,
            look: None,
            names: HashMap::new(),
            cursor: 0,
            last_location: Location::UNKNOWN,
        }
    }

    /// Pull the next parser event and translate it.
    ///
    /// Returns `Ok(None)` once the parser is exhausted.
    fn next_impl(&mut self) -> Result<Option<MarkedEvent>, Error> {
        while let Some(item) = self.parser.next() {
            let (raw, span) = item.map_err(Error::from_scan_error)?;
            let (start, end) = location_from_span(&span);
            let at = span.start.byte_offset();

            let event = match raw {
                RawEvent::Nothing => continue,
                RawEvent::StreamStart => Event::StreamStart,
                RawEvent::StreamEnd => Event::StreamEnd,
                RawEvent::DocumentStart(explicit) => Event::DocumentStart { explicit },
                RawEvent::DocumentEnd => Event::DocumentEnd {
                    explicit: self.text_at(at).starts_with("..."),
                },
                RawEvent::Alias(anchor_id) => Event::Alias {
                    anchor: self.alias_name(anchor_id),
                },
                RawEvent::Scalar(value, style, anchor_id, tag) => {
                    let value = match value {
                        Cow::Borrowed(v) => v.to_string(),
                        Cow::Owned(v) => v,
                    };
                    let style = convert_style(style);
                    Event::Scalar {
                        anchor: self.declare_anchor(anchor_id, at),
                        implicit: style == ScalarStyle::Plain && tag.is_none(),
                        tag: tag.as_deref().map(tag_text),
                        value,
                        style,
                    }
                }
                RawEvent::SequenceStart(anchor_id, tag) => Event::SequenceStart {
                    anchor: self.declare_anchor(anchor_id, at),
                    implicit: tag.is_none(),
                    tag: tag.as_deref().map(tag_text),
                    flow: self.flow_at(at, b'['),
                },
                RawEvent::SequenceEnd => Event::SequenceEnd,
                RawEvent::MappingStart(anchor_id, tag) => Event::MappingStart {
                    anchor: self.declare_anchor(anchor_id, at),
                    implicit: tag.is_none(),
                    tag: tag.as_deref().map(tag_text),
                    flow: self.flow_at(at, b'{'),
                },
                RawEvent::MappingEnd => Event::MappingEnd,
            };
            if matches!(event, Event::DocumentStart { .. }) {
                self.names.clear();
            }
            let bounds = [at, span.end.byte_offset()];
            self.cursor = bounds.into_iter().flatten().fold(self.cursor, usize::max);
            trace!(kind = event.kind().describe(), %start, "parser event");
            return Ok(Some(MarkedEvent::new(event, start, end)));
        }
        Ok(None)
    }

    /// Source text from byte offset `at` to the end of input. Empty if the offset is unavailable.
    fn text_at(&self, at: Option<usize>) -> &'a str {
        at.and_then(|offset| self.input.get(offset..)).unwrap_or("")
    }

    /// Record the name of an anchor declared for the node whose content starts at `at`.
    /// Id 0 means no anchor.
    fn declare_anchor(&mut self, anchor_id: usize, at: Option<usize>) -> Option<String> {
        if anchor_id == 0 {
            return None;
        }
        let name = self
            .properties_before(at)
            .and_then(last_anchor)
            .map(str::to_owned)
            .unwrap_or_else(|| anchor_id.to_string());
        self.names.insert(anchor_id, name.clone());
        Some(name)
    }

    /// Source text from the cursor to the end of the properties at `at`.
    fn properties_before(&self, at: Option<usize>) -> Option<&'a str> {
        let at = at?;
        let rest = self.text_at(Some(at));
        let end = at + (rest.len() - skip_properties(rest).len());
        self.input.get(self.cursor.min(at)..end)
    }

    fn alias_name(&self, anchor_id: usize) -> String {
        self.names
            .get(&anchor_id)
            .cloned()
            .unwrap_or_else(|| anchor_id.to_string())
    }

    /// Flow if the node content, past any properties, opens with `open`.
    fn flow_at(&self, at: Option<usize>, open: u8) -> FlowStyle {
        match skip_properties(self.text_at(at)).as_bytes().first() {
            Some(&b) if b == open => FlowStyle::Flow,
            _ => FlowStyle::Block,
        }
    }
}

fn convert_style(style: RawStyle) -> ScalarStyle {
    match style {
        RawStyle::Plain => ScalarStyle::Plain,
        RawStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        RawStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        RawStyle::Literal => ScalarStyle::Literal,
        RawStyle::Folded => ScalarStyle::Folded,
    }
}

fn is_property_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

/// Split a leading property token (`&anchor` or `!tag`) off `text`.
fn property_token(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with(['&', '!']) {
        return None;
    }
    let len = text
        .bytes()
        .position(is_property_end)
        .unwrap_or(text.len());
    Some(text.split_at(len))
}

/// Skip node properties and the whitespace around them.
fn skip_properties(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        match property_token(text) {
            Some((_, rest)) => text = rest,
            None => return text,
        }
    }
}

/// Name of the last `&anchor` token in `text`, ignoring comments.
fn last_anchor(text: &str) -> Option<&str> {
    let mut found = None;
    for line in text.lines() {
        let mut prev = b' ';
        for (i, b) in line.bytes().enumerate() {
            let starts_token = prev.is_ascii_whitespace() || matches!(prev, b',' | b'[' | b'{');
            if b == b'#' && prev.is_ascii_whitespace() {
                break;
            }
            if b == b'&' && starts_token {
                let name = &line[i + 1..];
                let len = name
                    .bytes()
                    .position(is_property_end)
                    .unwrap_or(name.len());
                if len > 0 {
                    found = Some(&name[..len]);
                }
            }
            prev = b;
        }
    }
    found
}

/// Full text of a resolved parser tag. The parser has already expanded `!!` and `%TAG` handles.
fn tag_text(tag: &RawTag) -> String {
    format!("{}{}", tag.handle, tag.suffix)
}

impl<'a> Events for LiveEvents<'a> {
    /// Peek at the next event without consuming it, filling the lookahead buffer if empty.
    fn peek(&mut self) -> Result<Option<&MarkedEvent>, Error> {
        if self.look.is_none() {
            self.look = self.next_impl()?;
        }
        Ok(self.look.as_ref())
    }

    /// Get the next event, using the lookahead buffer if present.
    /// Updates last_location to the yielded event's end.
    fn next(&mut self) -> Result<Option<MarkedEvent>, Error> {
        let ev = match self.look.take() {
            Some(ev) => Some(ev),
            None => self.next_impl()?,
        };
        if let Some(ev) = &ev {
            self.last_location = ev.end;
        }
        Ok(ev)
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn kinds(input: &str) -> Vec<EventKind> {
        let mut events = LiveEvents::new(input);
        let mut out = Vec::new();
        while let Some(ev) = events.next().unwrap() {
            out.push(ev.kind());
        }
        out
    }

    #[test]
    fn markers_are_passed_through() {
        assert_eq!(
            kinds("a: 1\n"),
            vec![
                EventKind::StreamStart,
                EventKind::DocumentStart,
                EventKind::MappingStart,
                EventKind::Scalar,
                EventKind::Scalar,
                EventKind::MappingEnd,
                EventKind::DocumentEnd,
                EventKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn property_scanning() {
        assert_eq!(skip_properties("&a !!seq [1]"), "[1]");
        assert_eq!(skip_properties("{a: 1}"), "{a: 1}");
        assert_eq!(last_anchor(": !t &base "), Some("base"));
        assert_eq!(last_anchor("&x,"), Some("x"));
        assert_eq!(last_anchor(": &outer\n  &inner "), Some("inner"));
        assert_eq!(last_anchor(" # not &here\n"), None);
        assert_eq!(last_anchor("plain"), None);
    }

    fn scalar_tags(input: &str) -> Vec<Option<String>> {
        let mut events = LiveEvents::new(input);
        std::iter::from_fn(|| events.next().unwrap())
            .filter_map(|ev| match ev.event {
                Event::Scalar { tag, .. } => Some(tag),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tags_are_rebuilt_from_handle_and_suffix() {
        let tags = scalar_tags("- !!str 42\n- ! 12\n- !<tag:yaml.org,2002:int> 5\n- !local x\n- y\n");
        assert_eq!(
            tags,
            vec![
                Some("tag:yaml.org,2002:str".to_owned()),
                Some("!".to_owned()),
                Some("tag:yaml.org,2002:int".to_owned()),
                Some("!local".to_owned()),
                None,
            ]
        );
    }

    #[test]
    fn anchor_names_are_read_from_the_source() {
        let mut events = LiveEvents::new("a: &first [1]\nb: !!str &second x\nc: *first\n");
        let mut anchors = Vec::new();
        let mut aliases = Vec::new();
        while let Some(ev) = events.next().unwrap() {
            match ev.event {
                Event::SequenceStart { anchor: Some(a), .. } | Event::Scalar { anchor: Some(a), .. } => {
                    anchors.push(a)
                }
                Event::Alias { anchor } => aliases.push(anchor),
                _ => {}
            }
        }
        assert_eq!(anchors, vec!["first", "second"]);
        assert_eq!(aliases, vec!["first"]);
    }

    #[test]
    fn plain_scalars_are_implicit() {
        let mut events = LiveEvents::new("'quoted'\n");
        let scalar = std::iter::from_fn(|| events.next().unwrap())
            .find(|ev| ev.kind() == EventKind::Scalar)
            .unwrap();
        match scalar.event {
            Event::Scalar {
                implicit, style, ..
            } => {
                assert!(!implicit);
                assert_eq!(style, ScalarStyle::SingleQuoted);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(scalar.start.line(), 1);
        assert_eq!(scalar.start.column(), 1);
    }
}
