//! Parse events consumed by the composer.
//!
//! The model mirrors the YAML event stream: stream and document boundaries, node events
//! (scalar, alias, collection start/end) and comment events. Anchors are carried by name,
//! tags in their textual form as written (or as reported by the parser).

use crate::location::Location;

/// Presentation style of a scalar. Opaque to composition; kept on the node for downstream use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// Whether a collection is written in block or flow (`[..]`, `{..}`) style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowStyle {
    #[default]
    Block,
    Flow,
}

impl FlowStyle {
    #[inline]
    pub fn is_flow(self) -> bool {
        matches!(self, FlowStyle::Flow)
    }
}

/// Kind of a comment event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// An empty line, kept to preserve vertical spacing.
    BlankLine,
    /// A comment on its own line.
    Block,
    /// A comment trailing a value on the same line.
    InLine,
}

/// One comment line as reported by the parser, without the leading `#`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentLine {
    pub kind: CommentKind,
    pub value: String,
    pub start: Location,
    pub end: Location,
}

impl CommentLine {
    pub fn new(kind: CommentKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            start: Location::UNKNOWN,
            end: Location::UNKNOWN,
        }
    }

    pub fn at(mut self, start: Location, end: Location) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// A parse event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart {
        explicit: bool,
    },
    DocumentEnd {
        explicit: bool,
    },
    /// `*name`
    Alias {
        anchor: String,
    },
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        value: String,
        /// The tag may be omitted for the plain form of this scalar (plain style, no tag).
        implicit: bool,
        style: ScalarStyle,
    },
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        flow: FlowStyle,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        flow: FlowStyle,
    },
    MappingEnd,
    Comment(CommentLine),
}

/// Discriminant of [`Event`], used for `check`-style lookahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    Alias,
    Scalar,
    SequenceStart,
    SequenceEnd,
    MappingStart,
    MappingEnd,
    Comment,
}

impl EventKind {
    /// Human readable name used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            EventKind::StreamStart => "stream start",
            EventKind::StreamEnd => "stream end",
            EventKind::DocumentStart => "document start",
            EventKind::DocumentEnd => "document end",
            EventKind::Alias => "alias",
            EventKind::Scalar => "scalar",
            EventKind::SequenceStart => "sequence start",
            EventKind::SequenceEnd => "sequence end",
            EventKind::MappingStart => "mapping start",
            EventKind::MappingEnd => "mapping end",
            EventKind::Comment => "comment",
        }
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::StreamStart => EventKind::StreamStart,
            Event::StreamEnd => EventKind::StreamEnd,
            Event::DocumentStart { .. } => EventKind::DocumentStart,
            Event::DocumentEnd { .. } => EventKind::DocumentEnd,
            Event::Alias { .. } => EventKind::Alias,
            Event::Scalar { .. } => EventKind::Scalar,
            Event::SequenceStart { .. } => EventKind::SequenceStart,
            Event::SequenceEnd => EventKind::SequenceEnd,
            Event::MappingStart { .. } => EventKind::MappingStart,
            Event::MappingEnd => EventKind::MappingEnd,
            Event::Comment(_) => EventKind::Comment,
        }
    }

    /// Anchor declared by a node event, if any. Aliases reference an anchor but do not declare one.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Event::Scalar { anchor, .. }
            | Event::SequenceStart { anchor, .. }
            | Event::MappingStart { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }

    /// Plain, untagged scalar without anchor.
    pub fn plain(value: impl Into<String>) -> Self {
        Event::Scalar {
            anchor: None,
            tag: None,
            value: value.into(),
            implicit: true,
            style: ScalarStyle::Plain,
        }
    }

    pub fn alias(anchor: impl Into<String>) -> Self {
        Event::Alias {
            anchor: anchor.into(),
        }
    }

    /// Untagged block sequence start with an optional anchor.
    pub fn sequence_start(anchor: Option<&str>) -> Self {
        Event::SequenceStart {
            anchor: anchor.map(str::to_owned),
            tag: None,
            implicit: true,
            flow: FlowStyle::Block,
        }
    }

    /// Untagged block mapping start with an optional anchor.
    pub fn mapping_start(anchor: Option<&str>) -> Self {
        Event::MappingStart {
            anchor: anchor.map(str::to_owned),
            tag: None,
            implicit: true,
            flow: FlowStyle::Block,
        }
    }
}

/// An event together with its source range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedEvent {
    pub event: Event,
    pub start: Location,
    pub end: Location,
}

impl MarkedEvent {
    pub fn new(event: Event, start: Location, end: Location) -> Self {
        Self { event, start, end }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

impl From<Event> for MarkedEvent {
    fn from(event: Event) -> Self {
        Self::new(event, Location::UNKNOWN, Location::UNKNOWN)
    }
}
