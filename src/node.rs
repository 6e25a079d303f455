//! The composed node graph.
//!
//! Nodes of one document live in a single arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Children are stored as ids, so an alias simply makes a second parent refer to
//! the same id; cycles are ordinary shared indices.

use std::ops::Index;

use crate::event::{CommentLine, FlowStyle, ScalarStyle};
use crate::location::Location;
use crate::tags::Tag;

/// Index of a node in its document's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Structural kind of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

/// Kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeValue {
    Scalar {
        value: String,
        style: ScalarStyle,
    },
    Sequence {
        items: Vec<NodeId>,
        flow: FlowStyle,
    },
    Mapping {
        pairs: Vec<(NodeId, NodeId)>,
        flow: FlowStyle,
        /// A key resolved to the merge tag (`<<`). Expansion is left to the consumer.
        merged: bool,
    },
}

/// One node of the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) tag: Tag,
    pub(crate) resolved: bool,
    pub(crate) value: NodeValue,
    pub(crate) start: Location,
    pub(crate) end: Option<Location>,
    pub(crate) anchor: Option<String>,
    pub(crate) two_step: bool,
    pub(crate) block_comments: Vec<CommentLine>,
    pub(crate) inline_comments: Vec<CommentLine>,
    pub(crate) end_comments: Vec<CommentLine>,
}

impl Node {
    pub(crate) fn new(tag: Tag, resolved: bool, value: NodeValue, start: Location) -> Self {
        Self {
            tag,
            resolved,
            value,
            start,
            end: None,
            anchor: None,
            two_step: false,
            block_comments: Vec::new(),
            inline_comments: Vec::new(),
            end_comments: Vec::new(),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// True when the tag was resolved implicitly rather than given explicitly.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn kind(&self) -> NodeKind {
        match self.value {
            NodeValue::Scalar { .. } => NodeKind::Scalar,
            NodeValue::Sequence { .. } => NodeKind::Sequence,
            NodeValue::Mapping { .. } => NodeKind::Mapping,
        }
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn start(&self) -> Location {
        self.start
    }

    /// End of the node; [`Location::UNKNOWN`] for nodes without a known end.
    pub fn end(&self) -> Location {
        self.end.unwrap_or(Location::UNKNOWN)
    }

    pub(crate) fn set_end(&mut self, end: Location) {
        debug_assert!(self.end.is_none(), "end mark set twice");
        self.end = Some(end);
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Set when an alias inside this node's own subtree referred back to it: the node is part
    /// of a cycle and its children must be materialized after the node itself.
    pub fn is_two_step(&self) -> bool {
        self.two_step
    }

    pub fn block_comments(&self) -> &[CommentLine] {
        &self.block_comments
    }

    /// Comments on the same line as the value. For a collection this keeps both the comments
    /// before its closing event and those right after it.
    pub fn inline_comments(&self) -> &[CommentLine] {
        &self.inline_comments
    }

    /// Comments between the end of the document's root and the end of the document.
    pub fn end_comments(&self) -> &[CommentLine] {
        &self.end_comments
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn scalar_style(&self) -> Option<ScalarStyle> {
        match &self.value {
            NodeValue::Scalar { style, .. } => Some(*style),
            _ => None,
        }
    }

    pub fn flow_style(&self) -> Option<FlowStyle> {
        match &self.value {
            NodeValue::Sequence { flow, .. } | NodeValue::Mapping { flow, .. } => Some(*flow),
            NodeValue::Scalar { .. } => None,
        }
    }

    pub fn items(&self) -> &[NodeId] {
        match &self.value {
            NodeValue::Sequence { items, .. } => items,
            _ => &[],
        }
    }

    pub fn pairs(&self) -> &[(NodeId, NodeId)] {
        match &self.value {
            NodeValue::Mapping { pairs, .. } => pairs,
            _ => &[],
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self.value, NodeValue::Mapping { merged: true, .. })
    }

    /// Number of children: items of a sequence, pairs of a mapping, zero for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            NodeValue::Scalar { .. } => 0,
            NodeValue::Sequence { items, .. } => items.len(),
            NodeValue::Mapping { pairs, .. } => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all direct children in document order; keys and values interleave for mappings.
    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let items = self.items().iter().copied();
        let pairs = self.pairs().iter().flat_map(|&(k, v)| [k, v]);
        items.chain(pairs)
    }
}

/// One composed document: the node arena and its root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    start: Location,
}

impl Document {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId, start: Location) -> Self {
        Self { nodes, root, start }
    }

    /// Where the document starts: its document-start marker, or the first trailing comment of
    /// a comment holder.
    pub fn start(&self) -> Location {
        self.start
    }

    pub(crate) fn append_end_comments(&mut self, comments: Vec<CommentLine>) {
        let root = self.root.0;
        self.nodes[root].end_comments.extend(comments);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self[self.root]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of distinct nodes. Aliased nodes are counted once.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Node bound to `anchor`. If the input redefined the anchor, the last definition wins.
    pub fn anchored(&self, anchor: &str) -> Option<NodeId> {
        self.iter()
            .filter(|(_, n)| n.anchor() == Some(anchor))
            .map(|(id, _)| id)
            .last()
    }

    /// True for the sentinel returned when only comments trailed the last document.
    pub fn is_comment_holder(&self) -> bool {
        self.root_node().tag == Tag::COMMENT
    }

    /// Look up a mapping value by the text of a scalar key.
    pub fn get_value(&self, mapping: NodeId, key: &str) -> Option<NodeId> {
        self[mapping]
            .pairs()
            .iter()
            .find(|(k, _)| self[*k].as_str() == Some(key))
            .map(|(_, v)| *v)
    }

    /// For each node, how many parent slots refer to it. The root has none; a node reached
    /// through aliases has more than one.
    pub fn parent_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for node in &self.nodes {
            for child in node.child_ids() {
                counts[child.0] += 1;
            }
        }
        counts
    }

    /// True if every node except the root has exactly one parent and the root has none.
    pub fn is_tree(&self) -> bool {
        self.parent_counts()
            .iter()
            .enumerate()
            .all(|(i, &count)| if i == self.root.0 { count == 0 } else { count == 1 })
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(value: &str) -> Node {
        Node::new(
            Tag::STR,
            true,
            NodeValue::Scalar {
                value: value.into(),
                style: ScalarStyle::Plain,
            },
            Location::UNKNOWN,
        )
    }

    #[test]
    fn tree_detection_counts_parent_slots() {
        let seq = Node::new(
            Tag::SEQ,
            true,
            NodeValue::Sequence {
                items: vec![NodeId(1), NodeId(1)],
                flow: FlowStyle::Block,
            },
            Location::UNKNOWN,
        );
        let doc = Document::new(vec![seq, scalar("x")], NodeId(0), Location::UNKNOWN);
        assert_eq!(doc.parent_counts(), vec![0, 2]);
        assert!(!doc.is_tree());
        assert_eq!(doc.root_node().child_ids().count(), 2);
    }

    #[test]
    fn end_defaults_to_unknown() {
        let mut node = scalar("x");
        assert_eq!(node.end(), Location::UNKNOWN);
        node.set_end(Location::new(1, 2, 1));
        assert_eq!(node.end(), Location::new(1, 2, 1));
    }
}
