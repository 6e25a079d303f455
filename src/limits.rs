//! Resource limits enforced while composing.
//!
//! Two counters protect the composer against pathological inputs: the nesting depth of the
//! node currently being composed (stack/CPU) and the number of aliases that resolve to
//! collections (alias amplification, "billion laughs").

use serde::{Deserialize, Serialize};

/// Limits for composing a YAML stream.
///
/// The defaults are permissive for typical configuration files while stopping obvious
/// resource-amplifying inputs. Tune them per application.
///
/// ```rust
/// # #[cfg(feature = "saphyr")] {
/// use saphyr_composer::{compose_str_with_options, Limits, Options};
///
/// let options = Options {
///     limits: Limits {
///         max_depth: 8,
///         ..Limits::default()
///     },
///     ..Options::default()
/// };
///
/// let doc = compose_str_with_options("name: My Application\nretries: 5\n", options)
///     .unwrap()
///     .unwrap();
/// assert_eq!(doc.root_node().len(), 2);
/// # }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum nesting depth. The guard fails when the depth already exceeds this value before
    /// entering another node, so a chain of `max_depth + 1` nested nodes is accepted.
    ///
    /// Default: 256
    pub max_depth: usize,
    /// Maximum number of aliases resolving to a sequence or mapping, counted over the whole
    /// stream. Aliases to scalars are free.
    ///
    /// Default: 50
    pub max_aliases_for_collections: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,                  // keeps recursion well inside a thread stack
            max_aliases_for_collections: 50, // alias bombs need many collection aliases
        }
    }
}

/// What tripped a limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitBreach {
    /// The nesting depth exceeded [`Limits::max_depth`].
    Depth {
        /// Depth at the moment of the breach.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Aliases to collections exceeded [`Limits::max_aliases_for_collections`].
    CollectionAliases {
        /// Count including the alias that crossed the threshold.
        aliases: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Snapshot of the guard counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LimitReport {
    /// Current nesting depth.
    pub depth: usize,
    /// Deepest nesting reached since the guard was created.
    pub max_depth_reached: usize,
    /// Aliases to collections observed since the guard was created.
    pub collection_aliases: usize,
}

/// Stateful helper that enforces [`Limits`] during composition.
#[derive(Debug)]
pub struct LimitGuard {
    limits: Limits,
    depth: usize,
    max_depth_reached: usize,
    collection_aliases: usize,
}

/// Returned by [`LimitGuard::leave`] when leaving more nodes than were entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthUnderflow;

impl LimitGuard {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            depth: 0,
            max_depth_reached: 0,
            collection_aliases: 0,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Enter a node. Fails if the depth already exceeds the maximum.
    pub fn enter(&mut self) -> Result<(), LimitBreach> {
        if self.depth > self.limits.max_depth {
            return Err(LimitBreach::Depth {
                depth: self.depth,
                max: self.limits.max_depth,
            });
        }
        self.depth += 1;
        if self.depth > self.max_depth_reached {
            self.max_depth_reached = self.depth;
        }
        Ok(())
    }

    /// Leave a node entered with [`LimitGuard::enter`].
    pub fn leave(&mut self) -> Result<(), DepthUnderflow> {
        self.depth = self.depth.checked_sub(1).ok_or(DepthUnderflow)?;
        Ok(())
    }

    /// Count one alias resolving to a collection. Fails on the alias that crosses the maximum.
    pub fn observe_collection_alias(&mut self) -> Result<(), LimitBreach> {
        self.collection_aliases = self.collection_aliases.saturating_add(1);
        if self.collection_aliases > self.limits.max_aliases_for_collections {
            return Err(LimitBreach::CollectionAliases {
                aliases: self.collection_aliases,
                max: self.limits.max_aliases_for_collections,
            });
        }
        Ok(())
    }

    /// Forget the current depth. Used after a document is finished or abandoned.
    pub fn reset_depth(&mut self) {
        self.depth = 0;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn report(&self) -> LimitReport {
        LimitReport {
            depth: self.depth,
            max_depth_reached: self.max_depth_reached,
            collection_aliases: self.collection_aliases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_boundary_allows_max_plus_one() {
        let mut guard = LimitGuard::new(Limits {
            max_depth: 2,
            ..Limits::default()
        });
        for _ in 0..3 {
            guard.enter().unwrap();
        }
        assert_eq!(
            guard.enter(),
            Err(LimitBreach::Depth { depth: 3, max: 2 })
        );
        assert_eq!(guard.report().max_depth_reached, 3);
    }

    #[test]
    fn leave_below_zero_is_an_underflow() {
        let mut guard = LimitGuard::new(Limits::default());
        guard.enter().unwrap();
        guard.leave().unwrap();
        assert_eq!(guard.leave(), Err(DepthUnderflow));
    }

    #[test]
    fn collection_aliases_trip_on_the_crossing_alias() {
        let mut guard = LimitGuard::new(Limits {
            max_aliases_for_collections: 2,
            ..Limits::default()
        });
        guard.observe_collection_alias().unwrap();
        guard.observe_collection_alias().unwrap();
        assert!(matches!(
            guard.observe_collection_alias(),
            Err(LimitBreach::CollectionAliases { aliases: 3, max: 2 })
        ));
    }

    #[test]
    fn reset_depth_keeps_alias_count() {
        let mut guard = LimitGuard::new(Limits::default());
        guard.enter().unwrap();
        guard.observe_collection_alias().unwrap();
        guard.reset_depth();
        let report = guard.report();
        assert_eq!(report.depth, 0);
        assert_eq!(report.collection_aliases, 1);
    }
}
