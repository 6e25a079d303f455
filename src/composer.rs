//! Composer: turns an event stream into node graphs, one [`Document`] at a time.
//!
//! Responsibilities
//! - Drive document iteration over stream/document markers.
//! - Build scalar, sequence and mapping nodes, resolving tags through a [`Resolver`].
//! - Keep the anchor table and resolve aliases against it.
//! - Detect cycles: an alias to a node that is still being composed flags the node for
//!   two-step construction instead of recursing.
//! - Enforce the nesting-depth and collection-alias limits.
//! - Attach block, in-line and end comments to nodes.
//!
//! Anchors and aliases
//! - A node declaring an anchor is registered before its children are composed, so an element
//!   can alias its own ancestor.
//! - The recursion set holds the nodes currently open as parents on the path from the root.
//!   An alias resolving into that set closes a cycle.
//!
//! Document boundaries
//! - The anchor table, recursion set, node arena and depth counter are reset before and after
//!   every document, including documents that fail. The collection-alias counter lives as long
//!   as the composer.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};

use crate::comments::CommentCollector;
use crate::error::Error;
use crate::event::{CommentLine, Event, EventKind, FlowStyle, MarkedEvent};
use crate::events::Events;
use crate::limits::{LimitBreach, LimitGuard, LimitReport, Limits};
use crate::location::Location;
use crate::node::{Document, Node, NodeId, NodeKind, NodeValue};
use crate::options::Options;
use crate::resolver::{CoreResolver, Resolver};
use crate::tags::{Tag, needs_resolution};

/// Composes node graphs from an [`Events`] source.
///
/// ```rust
/// use saphyr_composer::{Composer, Event, EventQueue, Tag};
///
/// let events = EventQueue::document([
///     Event::mapping_start(Some("a")),
///     Event::plain("self"),
///     Event::alias("a"),
///     Event::MappingEnd,
/// ]);
/// let doc = Composer::new(events).single_document().unwrap().unwrap();
/// let root = doc.root_node();
/// assert_eq!(root.tag(), &Tag::MAP);
/// assert!(root.is_two_step());
/// assert_eq!(root.pairs()[0].1, doc.root());
/// ```
pub struct Composer<E, R = CoreResolver> {
    events: E,
    resolver: R,
    /// Arena of the document being composed.
    nodes: Vec<Node>,
    /// Anchor name -> node, for the current document.
    anchors: AHashMap<String, NodeId>,
    /// Nodes currently open as parents on the composition path.
    recursive: AHashSet<NodeId>,
    guard: LimitGuard,
    block_comments: CommentCollector,
    inline_comments: CommentCollector,
    /// Set once iteration has yielded an error.
    failed: bool,
}

impl<E: Events> Composer<E, CoreResolver> {
    /// Composer with the default resolver and default limits.
    pub fn new(events: E) -> Self {
        Self::with_resolver(events, CoreResolver::default(), Limits::default())
    }

    pub fn with_options(events: E, options: &Options) -> Self {
        Self::with_resolver(events, options.resolver(), options.limits)
    }
}

impl<E: Events, R: Resolver> Composer<E, R> {
    pub fn with_resolver(events: E, resolver: R, limits: Limits) -> Self {
        Self {
            events,
            resolver,
            nodes: Vec::new(),
            anchors: AHashMap::new(),
            recursive: AHashSet::new(),
            guard: LimitGuard::new(limits),
            block_comments: CommentCollector::block(),
            inline_comments: CommentCollector::inline(),
            failed: false,
        }
    }

    /// Check whether another document is available.
    ///
    /// Drops a pending stream-start event. Returns false at stream end, and also when the
    /// source is exhausted without a stream-end event.
    pub fn has_more_documents(&mut self) -> Result<bool, Error> {
        if self.events.check(EventKind::StreamStart)? {
            self.events.next()?;
        }
        Ok(match self.events.peek()? {
            Some(ev) => ev.kind() != EventKind::StreamEnd,
            None => false,
        })
    }

    /// Compose the next document and return it.
    ///
    /// If only comments remain before stream end, the result is a comment holder: a mapping
    /// tagged [`Tag::COMMENT`] with no children, carrying the comments as block comments
    /// (see [`Document::is_comment_holder`]).
    pub fn next_document(&mut self) -> Result<Document, Error> {
        self.reset_document_state();
        let result = self.compose_document();
        if let Err(err) = &result {
            debug!(error = %err, "document composition failed");
        }
        self.reset_document_state();
        result
    }

    /// Compose the only document of the stream.
    ///
    /// Returns `Ok(None)` for an empty stream and fails if the stream holds a second document.
    pub fn single_document(&mut self) -> Result<Option<Document>, Error> {
        if self.events.check(EventKind::StreamStart)? {
            self.events.next()?;
        }
        let mut document = None;
        if !self.events.check(EventKind::StreamEnd)? {
            let mut doc = self.next_document()?;
            let trailing = self.block_comments.collect(&mut self.events)?.consume();
            if !trailing.is_empty() {
                doc.append_end_comments(trailing);
            }
            document = Some(doc);
        }
        match self.events.next()? {
            Some(ev) if ev.kind() == EventKind::StreamEnd => Ok(document),
            Some(ev) => {
                let err = Error::structural(
                    "expected a single document in the stream, but found another document",
                    ev.start,
                );
                Err(match &document {
                    Some(doc) => err.with_context("the first document", doc.start()),
                    None => err,
                })
            }
            None => Err(Error::Eof {
                location: self.events.last_location(),
            }),
        }
    }

    /// Counters of the depth/alias guard.
    pub fn report(&self) -> LimitReport {
        self.guard.report()
    }

    pub fn limits(&self) -> &Limits {
        self.guard.limits()
    }

    /// Give back the event source.
    pub fn into_events(self) -> E {
        self.events
    }

    fn reset_document_state(&mut self) {
        self.nodes.clear();
        self.anchors.clear();
        self.recursive.clear();
        self.guard.reset_depth();
        self.block_comments.consume();
        self.inline_comments.consume();
    }

    fn compose_document(&mut self) -> Result<Document, Error> {
        if self.events.check(EventKind::StreamStart)? {
            self.events.next()?;
        }
        // Comments between documents.
        self.block_comments.collect(&mut self.events)?;
        if self.events.check(EventKind::StreamEnd)? {
            return self.comment_holder();
        }

        let start = self.expect(EventKind::DocumentStart, "document start")?.start;
        let root = self.compose_node(None)?;
        self.block_comments.collect(&mut self.events)?;
        if !self.block_comments.is_empty() {
            self.nodes[root.0].end_comments = self.block_comments.consume();
        }
        self.expect(EventKind::DocumentEnd, "document end")?;

        debug!(
            nodes = self.nodes.len(),
            anchors = self.anchors.len(),
            "composed document"
        );
        Ok(Document::new(std::mem::take(&mut self.nodes), root, start))
    }

    /// Sentinel document for comments trailing the last document.
    fn comment_holder(&mut self) -> Result<Document, Error> {
        let comments = self.block_comments.consume();
        let (start, end) = match (comments.first(), comments.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => {
                let location = match self.events.peek()? {
                    Some(ev) => ev.start,
                    None => self.events.last_location(),
                };
                return Err(Error::Unexpected {
                    expected: "document start",
                    found: EventKind::StreamEnd,
                    location,
                });
            }
        };
        let mut node = Node::new(
            Tag::COMMENT,
            false,
            NodeValue::Mapping {
                pairs: Vec::new(),
                flow: FlowStyle::Block,
                merged: false,
            },
            start,
        );
        node.set_end(end);
        node.block_comments = comments;
        Ok(Document::new(vec![node], NodeId(0), start))
    }

    fn compose_node(&mut self, parent: Option<NodeId>) -> Result<NodeId, Error> {
        if let Some(parent) = parent {
            self.recursive.insert(parent);
        }
        self.collect_comments()?;

        let id = if self.events.check(EventKind::Alias)? {
            self.compose_alias()?
        } else {
            let (kind, anchor, start) = match self.events.peek()? {
                Some(ev) => (ev.kind(), ev.event.anchor().map(str::to_owned), ev.start),
                None => {
                    return Err(Error::Eof {
                        location: self.events.last_location(),
                    });
                }
            };
            self.guard
                .enter()
                .map_err(|breach| limit_error(breach, start))?;
            let id = match kind {
                EventKind::Scalar => {
                    let block_comments = self.block_comments.consume();
                    self.compose_scalar(anchor, block_comments)?
                }
                EventKind::SequenceStart => self.compose_sequence(anchor)?,
                EventKind::MappingStart => self.compose_mapping(anchor)?,
                found => {
                    return Err(Error::Unexpected {
                        expected: "a node",
                        found,
                        location: start,
                    });
                }
            };
            self.guard.leave().map_err(|_| Error::Internal {
                msg: "nesting depth cannot be negative",
            })?;
            id
        };

        if let Some(parent) = parent {
            self.recursive.remove(&parent);
        }
        Ok(id)
    }

    fn compose_alias(&mut self) -> Result<NodeId, Error> {
        let ev = self.expect(EventKind::Alias, "alias")?;
        let Event::Alias { anchor } = ev.event else {
            return Err(Error::Internal {
                msg: "alias event expected",
            });
        };
        let Some(&id) = self.anchors.get(&anchor) else {
            return Err(Error::UndefinedAlias {
                anchor,
                location: ev.start,
            });
        };
        if self.nodes[id.0].kind() != NodeKind::Scalar {
            self.guard
                .observe_collection_alias()
                .map_err(|breach| limit_error(breach, ev.start))?;
        }
        if self.recursive.contains(&id) {
            trace!(anchor = %anchor, "alias closes a cycle");
            self.nodes[id.0].two_step = true;
        }
        // Aliases cannot carry comments of their own.
        self.block_comments.consume();
        self.inline_comments.collect(&mut self.events)?.consume();
        Ok(id)
    }

    fn compose_scalar(
        &mut self,
        anchor: Option<String>,
        block_comments: Vec<CommentLine>,
    ) -> Result<NodeId, Error> {
        let MarkedEvent { event, start, end } = self.expect(EventKind::Scalar, "scalar")?;
        let Event::Scalar {
            tag,
            value,
            implicit,
            style,
            ..
        } = event
        else {
            return Err(Error::Internal {
                msg: "scalar event expected",
            });
        };
        let (tag, resolved) = self.resolve_tag(NodeKind::Scalar, tag, Some(&value), implicit);
        let mut node = Node::new(tag, resolved, NodeValue::Scalar { value, style }, start);
        node.set_end(end);
        node.block_comments = block_comments;
        node.inline_comments = self.inline_comments.collect(&mut self.events)?.consume();
        Ok(self.register(node, anchor))
    }

    fn compose_sequence(&mut self, anchor: Option<String>) -> Result<NodeId, Error> {
        let MarkedEvent { event, start, .. } =
            self.expect(EventKind::SequenceStart, "sequence start")?;
        let Event::SequenceStart {
            tag,
            implicit,
            flow,
            ..
        } = event
        else {
            return Err(Error::Internal {
                msg: "sequence start event expected",
            });
        };
        let (tag, resolved) = self.resolve_tag(NodeKind::Sequence, tag, None, implicit);
        let mut node = Node::new(
            tag,
            resolved,
            NodeValue::Sequence {
                items: Vec::new(),
                flow,
            },
            start,
        );
        if flow.is_flow() {
            node.block_comments = self.block_comments.consume();
        }
        let id = self.register(node, anchor);

        while !self.events.check(EventKind::SequenceEnd)? {
            self.collect_comments()?;
            if self.events.check(EventKind::SequenceEnd)? {
                break;
            }
            let child = self.compose_node(Some(id))?;
            if let NodeValue::Sequence { items, .. } = &mut self.nodes[id.0].value {
                items.push(child);
            }
        }
        self.finish_collection(id, flow, EventKind::SequenceEnd, "sequence end")
    }

    fn compose_mapping(&mut self, anchor: Option<String>) -> Result<NodeId, Error> {
        let MarkedEvent { event, start, .. } =
            self.expect(EventKind::MappingStart, "mapping start")?;
        let Event::MappingStart {
            tag,
            implicit,
            flow,
            ..
        } = event
        else {
            return Err(Error::Internal {
                msg: "mapping start event expected",
            });
        };
        let (tag, resolved) = self.resolve_tag(NodeKind::Mapping, tag, None, implicit);
        let mut node = Node::new(
            tag,
            resolved,
            NodeValue::Mapping {
                pairs: Vec::new(),
                flow,
                merged: false,
            },
            start,
        );
        if flow.is_flow() {
            node.block_comments = self.block_comments.consume();
        }
        let id = self.register(node, anchor);

        while !self.events.check(EventKind::MappingEnd)? {
            self.collect_comments()?;
            if self.events.check(EventKind::MappingEnd)? {
                break;
            }
            self.compose_mapping_pair(id)?;
        }
        self.finish_collection(id, flow, EventKind::MappingEnd, "mapping end")
    }

    fn compose_mapping_pair(&mut self, mapping: NodeId) -> Result<(), Error> {
        let key = self.compose_node(Some(mapping))?;
        let is_merge = self.nodes[key.0].tag == Tag::MERGE;
        let value = self.compose_node(Some(mapping))?;
        if let NodeValue::Mapping { pairs, merged, .. } = &mut self.nodes[mapping.0].value {
            *merged |= is_merge;
            pairs.push((key, value));
        }
        Ok(())
    }

    /// Consume the end event of a collection and attach its trailing comments.
    fn finish_collection(
        &mut self,
        id: NodeId,
        flow: FlowStyle,
        end_kind: EventKind,
        expected: &'static str,
    ) -> Result<NodeId, Error> {
        if flow.is_flow() {
            let comments = self.inline_comments.collect(&mut self.events)?.consume();
            self.nodes[id.0].inline_comments = comments;
        }
        let end = self.expect(end_kind, expected)?.end;
        self.nodes[id.0].set_end(end);
        // A comment on the same line, after the closing delimiter.
        self.inline_comments.collect(&mut self.events)?;
        if !self.inline_comments.is_empty() {
            let comments = self.inline_comments.consume();
            self.nodes[id.0].inline_comments.extend(comments);
        }
        Ok(id)
    }

    /// Push a finished or open node into the arena and bind its anchor.
    fn register(&mut self, mut node: Node, anchor: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(anchor) = anchor {
            // Redefinition rebinds the anchor for later aliases.
            self.anchors.insert(anchor.clone(), id);
            node.anchor = Some(anchor);
        }
        self.nodes.push(node);
        id
    }

    fn resolve_tag(
        &self,
        kind: NodeKind,
        tag: Option<String>,
        value: Option<&str>,
        implicit: bool,
    ) -> (Tag, bool) {
        match tag {
            Some(tag) if !needs_resolution(Some(&tag)) => (Tag::new(tag), false),
            _ => (self.resolver.resolve(kind, value, implicit), true),
        }
    }

    /// Buffer comments standing where a node or a collection end is expected. Block comments
    /// go to the next node; a stray in-line comment is kept for the next value.
    fn collect_comments(&mut self) -> Result<(), Error> {
        loop {
            self.block_comments.collect(&mut self.events)?;
            self.inline_comments.collect(&mut self.events)?;
            if !self.events.check(EventKind::Comment)? {
                return Ok(());
            }
        }
    }

    /// Consume the next event, which must be of `kind`.
    fn expect(&mut self, kind: EventKind, expected: &'static str) -> Result<MarkedEvent, Error> {
        match self.events.next()? {
            Some(ev) if ev.kind() == kind => Ok(ev),
            Some(ev) => Err(Error::Unexpected {
                expected,
                found: ev.kind(),
                location: ev.start,
            }),
            None => Err(Error::Eof {
                location: self.events.last_location(),
            }),
        }
    }
}

fn limit_error(breach: LimitBreach, location: Location) -> Error {
    debug!(?breach, "composition limit exceeded");
    Error::from(breach).with_location(location)
}

impl<E: Events, R: Resolver> Iterator for Composer<E, R> {
    type Item = Result<Document, Error>;

    /// Yields documents until stream end; stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.has_more_documents() {
            Ok(false) => return None,
            Ok(true) => self.next_document(),
            Err(err) => Err(err),
        };
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CommentKind, ScalarStyle};
    use crate::events::EventQueue;

    fn compose(events: Vec<Event>) -> Result<Document, Error> {
        let mut composer = Composer::new(EventQueue::document(events));
        assert!(composer.has_more_documents()?);
        composer.next_document()
    }

    #[test]
    fn anchored_mapping_with_nested_sequence() {
        let doc = compose(vec![
            Event::mapping_start(Some("a")),
            Event::plain("k"),
            Event::sequence_start(None),
            Event::plain("1"),
            Event::plain("2"),
            Event::SequenceEnd,
            Event::MappingEnd,
        ])
        .unwrap();
        let root = doc.root_node();
        assert_eq!(root.kind(), NodeKind::Mapping);
        assert_eq!(root.anchor(), Some("a"));
        assert_eq!(root.len(), 1);
        let (k, v) = root.pairs()[0];
        assert_eq!(doc[k].as_str(), Some("k"));
        let values: Vec<_> = doc[v].items().iter().map(|&i| doc[i].as_str()).collect();
        assert_eq!(values, vec![Some("1"), Some("2")]);
        assert_eq!(doc[doc[v].items()[0]].tag(), &Tag::INT);
        assert!(doc.is_tree());
    }

    #[test]
    fn explicit_tag_is_kept_verbatim() {
        let doc = compose(vec![Event::Scalar {
            anchor: None,
            tag: Some("!!str".into()),
            value: "42".into(),
            implicit: false,
            style: ScalarStyle::Plain,
        }])
        .unwrap();
        assert_eq!(doc.root_node().tag(), &Tag::STR);
        assert!(!doc.root_node().is_resolved());
    }

    #[test]
    fn non_specific_tag_is_resolved() {
        let doc = compose(vec![Event::Scalar {
            anchor: None,
            tag: Some("!".into()),
            value: "42".into(),
            implicit: false,
            style: ScalarStyle::DoubleQuoted,
        }])
        .unwrap();
        assert_eq!(doc.root_node().tag(), &Tag::STR);
        assert!(doc.root_node().is_resolved());
    }

    #[test]
    fn merge_key_flags_mapping() {
        let doc = compose(vec![
            Event::mapping_start(None),
            Event::mapping_start(Some("base")),
            Event::plain("x"),
            Event::plain("1"),
            Event::MappingEnd,
            Event::plain("unused"),
            Event::plain("<<"),
            Event::alias("base"),
            Event::MappingEnd,
        ])
        .unwrap();
        assert!(doc.root_node().is_merged());
        assert_eq!(doc.root_node().len(), 2);
        assert!(!doc.is_tree());
    }

    #[test]
    fn trailing_comment_before_end_is_not_a_child() {
        let doc = compose(vec![
            Event::sequence_start(None),
            Event::plain("a"),
            Event::Comment(CommentLine::new(CommentKind::Block, "tail")),
            Event::SequenceEnd,
        ])
        .unwrap();
        assert_eq!(doc.root_node().len(), 1);
        assert_eq!(doc.root_node().end_comments()[0].value, "tail");
    }

    #[test]
    fn end_comments_are_attached_to_the_root() {
        let doc = compose(vec![
            Event::plain("a"),
            Event::Comment(CommentLine::new(CommentKind::Block, "bye")),
        ])
        .unwrap();
        assert_eq!(doc.root_node().end_comments()[0].value, "bye");
    }

    #[test]
    fn truncated_stream_is_eof() {
        let mut composer = Composer::new(EventQueue::from_events([
            Event::StreamStart,
            Event::DocumentStart { explicit: true },
            Event::sequence_start(None),
            Event::plain("a"),
        ]));
        let err = composer.next_document().unwrap_err();
        assert!(matches!(err, Error::Eof { .. }), "{err}");
    }

    #[test]
    fn collection_end_in_node_position_is_unexpected() {
        let err = compose(vec![Event::SequenceEnd]).unwrap_err();
        assert!(matches!(
            err,
            Error::Unexpected {
                found: EventKind::SequenceEnd,
                ..
            }
        ));
    }

    #[test]
    fn state_is_reset_after_a_failed_document() {
        let mut composer = Composer::with_resolver(
            EventQueue::from_events([
                Event::StreamStart,
                Event::DocumentStart { explicit: true },
                Event::sequence_start(Some("a")),
                Event::alias("missing"),
                Event::SequenceEnd,
                Event::DocumentEnd { explicit: false },
                Event::DocumentStart { explicit: true },
                Event::alias("a"),
                Event::DocumentEnd { explicit: false },
                Event::StreamEnd,
            ]),
            CoreResolver::default(),
            Limits::default(),
        );
        assert!(matches!(
            composer.next_document(),
            Err(Error::UndefinedAlias { .. })
        ));
        assert_eq!(composer.report().depth, 0);
    }
}
