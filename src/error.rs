//! Defines the composition error and its location.

use crate::event::EventKind;
use crate::limits::LimitBreach;
use crate::location::{At, Location};

/// Errors raised while composing a document.
///
/// All of them are fatal to the document being composed: no partial graph is returned.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The event sequence is well formed but not what was expected here, e.g. a second document
    /// where only one was permitted.
    #[error("{problem}{}{}", ContextSuffix(.context), At(.location))]
    Structural {
        problem: String,
        /// Description and location of the prior context (e.g. where the first document starts).
        context: Option<(String, Location)>,
        location: Location,
    },

    /// Some other event was seen where the composer expected `expected`.
    #[error("unexpected {}: expected {expected}{}", .found.describe(), At(.location))]
    Unexpected {
        expected: &'static str,
        found: EventKind,
        location: Location,
    },

    /// The event source ended in the middle of a document.
    #[error("unexpected end of event stream{}", At(.location))]
    Eof { location: Location },

    /// An alias references an anchor not (yet) defined in the current document.
    #[error("found undefined alias `{anchor}`{}", At(.location))]
    UndefinedAlias { anchor: String, location: Location },

    /// A resource limit was exceeded.
    #[error("{}{}", BreachMessage(.breach), At(.location))]
    Limit {
        breach: LimitBreach,
        location: Location,
    },

    /// The underlying parser rejected the input.
    #[error("{msg}{}", At(.location))]
    Scan { msg: String, location: Location },

    /// Broken internal invariant.
    #[error("internal error: {msg}")]
    Internal { msg: &'static str },
}

impl Error {
    pub(crate) fn structural(problem: impl Into<String>, location: Location) -> Self {
        Error::Structural {
            problem: problem.into(),
            context: None,
            location,
        }
    }

    pub(crate) fn with_context(mut self, what: impl Into<String>, at: Location) -> Self {
        if let Error::Structural { context, .. } = &mut self {
            *context = Some((what.into(), at));
        }
        self
    }

    /// Attach a location if none is set yet.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Structural { location, .. }
            | Error::Unexpected { location, .. }
            | Error::Eof { location }
            | Error::UndefinedAlias { location, .. }
            | Error::Limit { location, .. }
            | Error::Scan { location, .. } => {
                if !location.is_known() {
                    *location = set_location;
                }
            }
            Error::Internal { .. } => {}
        }
        self
    }

    /// Return the primary location, if known.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Structural { location, .. }
            | Error::Unexpected { location, .. }
            | Error::Eof { location }
            | Error::UndefinedAlias { location, .. }
            | Error::Limit { location, .. }
            | Error::Scan { location, .. } => location.is_known().then_some(*location),
            Error::Internal { .. } => None,
        }
    }

    /// Location of the prior context of a structural error, if any.
    pub fn context_location(&self) -> Option<Location> {
        match self {
            Error::Structural {
                context: Some((_, location)),
                ..
            } if location.is_known() => Some(*location),
            _ => None,
        }
    }

    /// True for nesting-depth and alias-count breaches: an abuse signal rather than a data error.
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, Error::Limit { .. })
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    #[cfg(feature = "saphyr")]
    pub(crate) fn from_scan_error(err: saphyr_parser::ScanError) -> Self {
        let mark = err.marker();
        Error::Scan {
            msg: err.info().to_owned(),
            location: Location::new(mark.line(), mark.col() + 1, mark.index()),
        }
    }
}

impl From<LimitBreach> for Error {
    fn from(breach: LimitBreach) -> Self {
        Error::Limit {
            breach,
            location: Location::UNKNOWN,
        }
    }
}

struct ContextSuffix<'a>(&'a Option<(String, Location)>);

impl std::fmt::Display for ContextSuffix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some((what, location)) if location.is_known() => write!(f, " ({what} at {location})"),
            Some((what, _)) => write!(f, " ({what})"),
            None => Ok(()),
        }
    }
}

struct BreachMessage<'a>(&'a LimitBreach);

impl std::fmt::Display for BreachMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            LimitBreach::Depth { max, .. } => write!(f, "nesting depth exceeded max {max}"),
            LimitBreach::CollectionAliases { max, .. } => write!(
                f,
                "number of aliases for non-scalar nodes exceeds the specified max={max}"
            ),
        }
    }
}
