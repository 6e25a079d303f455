use serde::{Deserialize, Serialize};

use crate::limits::Limits;
use crate::resolver::CoreResolver;

/// Composer configuration options.
///
/// Example: compose with a tighter alias ceiling and strict booleans.
///
/// ```rust
/// # #[cfg(feature = "saphyr")] {
/// let options = saphyr_composer::options! {
///     limits: saphyr_composer::limits! {
///         max_aliases_for_collections: 2,
///     },
///     strict_booleans: true,
/// };
///
/// let doc = saphyr_composer::compose_str_with_options("enabled: yes\n", options)
///     .unwrap()
///     .unwrap();
/// let value = doc.get_value(doc.root(), "enabled").unwrap();
/// assert_eq!(doc[value].tag(), &saphyr_composer::Tag::STR);
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Nesting-depth and alias ceilings.
    pub limits: Limits,
    /// If true, the default resolver only accepts `true`/`false` booleans. YAML 1.1 forms like
    /// `yes`/`no`/`on`/`off` resolve to strings.
    /// Default: false (accept YAML 1.1 boolean forms).
    pub strict_booleans: bool,
}

impl Options {
    /// Resolver configured by these options.
    pub fn resolver(&self) -> CoreResolver {
        CoreResolver::new(self.strict_booleans)
    }
}
