//! YAML tags as they appear on composed nodes.

use std::borrow::Cow;
use std::fmt;

/// Prefix of the tags in the `tag:yaml.org,2002:` namespace.
pub const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// The non-specific tag `!`. A node carrying it has its tag resolved as if it had none.
pub(crate) const NON_SPECIFIC: &str = "!";

/// Semantic type identifier of a node.
///
/// Tags in the YAML core namespace are stored in their canonical, fully expanded form: `!!int`
/// and `tag:yaml.org,2002:int` compare equal to [`Tag::INT`] once built with [`Tag::new`].
/// Local tags (`!custom`) are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    pub const STR: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:str"));
    pub const INT: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:int"));
    pub const FLOAT: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:float"));
    pub const BOOL: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:bool"));
    pub const NULL: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:null"));
    pub const TIMESTAMP: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:timestamp"));
    pub const BINARY: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:binary"));
    pub const SEQ: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:seq"));
    pub const MAP: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:map"));
    /// The `<<` merge key.
    pub const MERGE: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:merge"));
    /// Root tag of the sentinel node that holds comments trailing the last document.
    pub const COMMENT: Tag = Tag(Cow::Borrowed("tag:yaml.org,2002:comment"));

    /// Build a tag from its textual form, expanding `!!name` into the YAML core namespace.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        match tag.strip_prefix("!!") {
            Some(suffix) => Tag(Cow::Owned(format!("{YAML_TAG_PREFIX}{suffix}"))),
            None => Tag(Cow::Owned(tag)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for tags in the `tag:yaml.org,2002:` namespace.
    pub fn is_core(&self) -> bool {
        self.0.starts_with(YAML_TAG_PREFIX)
    }

    /// The `!!name` shorthand for core tags, or the tag itself otherwise.
    pub fn short(&self) -> Cow<'_, str> {
        match self.0.strip_prefix(YAML_TAG_PREFIX) {
            Some(suffix) => Cow::Owned(format!("!!{suffix}")),
            None => Cow::Borrowed(&self.0),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::new(value)
    }
}

/// True when the tag is absent or non-specific and must be resolved from the node itself.
pub(crate) fn needs_resolution(tag: Option<&str>) -> bool {
    match tag {
        None => true,
        Some(t) => t == NON_SPECIFIC,
    }
}
