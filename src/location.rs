//! Source location utilities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Row/column location within the source YAML stream (1-indexed, character-based).
///
/// Every event and every composed node carries a start and an end `Location`. The `index`
/// counts Unicode scalar values from the beginning of the stream, matching what
/// `saphyr-parser` reports.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "saphyr")] {
/// let err = saphyr_composer::compose_str("a: *missing\n").unwrap_err();
/// if let Some(loc) = err.location() {
///     println!("Error at line {}, col {}", loc.line(), loc.column());
/// }
/// # }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
    /// 0-indexed character offset in the input stream.
    #[serde(default)]
    pub(crate) index: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not available, e.g. for events built by hand.
    pub const UNKNOWN: Self = Self {
        line: 0,
        column: 0,
        index: 0,
    };

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `line`: 1-indexed line.
    /// - `column`: 1-indexed column.
    /// - `index`: 0-indexed character offset.
    pub const fn new(line: usize, column: usize, index: usize) -> Self {
        // 4 Gb is larger than any YAML document we expect to compose, and locations are
        // diagnostics only.
        Self {
            line: line as u32,
            column: column as u32,
            index: index as u32,
        }
    }

    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    /// Character offset from the start of the stream.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index as u64
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self != &Self::UNKNOWN
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Formats ` at line X, column Y` when the location is known, and nothing otherwise.
pub(crate) struct At<'a>(pub(crate) &'a Location);

impl fmt::Display for At<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_known() {
            write!(f, " at {}", self.0)
        } else {
            Ok(())
        }
    }
}

/// Convert a `saphyr_parser::Span` to 1-indexed start and end [`Location`]s.
///
/// Called by:
/// - The live events adapter for each raw parser event.
#[cfg(feature = "saphyr")]
pub(crate) fn location_from_span(span: &saphyr_parser::Span) -> (Location, Location) {
    let (start, end) = (&span.start, &span.end);
    (
        Location::new(start.line(), start.col() + 1, start.index()),
        Location::new(end.line(), end.col() + 1, end.index()),
    )
}
