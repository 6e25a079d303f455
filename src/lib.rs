//! Compose YAML event streams into node graphs.
//!
//! The composer sits between a YAML parser and a constructor: it turns parse events into a
//! rooted graph of scalar, sequence and mapping nodes, resolving anchors and aliases (cycles
//! included), resolving implicit tags and attaching comments.

pub use comments::CommentCollector;
pub use composer::Composer;
pub use error::Error;
pub use event::{CommentKind, CommentLine, Event, EventKind, FlowStyle, MarkedEvent, ScalarStyle};
pub use events::{EventQueue, Events};
pub use limits::{LimitBreach, LimitGuard, LimitReport, Limits};
#[cfg(feature = "saphyr")]
pub use live_events::LiveEvents;
pub use location::Location;
pub use node::{Document, Node, NodeId, NodeKind, NodeValue};
pub use options::Options;
pub use resolver::{CoreResolver, Resolver};
pub use tags::Tag;

mod comments;
mod composer;
mod error;
mod event;
mod events;
pub mod limits;
#[cfg(feature = "saphyr")]
mod live_events;
mod location;
mod macros;
#[cfg(feature = "miette")]
pub mod miette;
mod node;
mod options;
pub mod resolver;
mod tags;

/// Compose the single YAML document held in `input`.
///
/// Returns `Ok(None)` for an empty stream. If the input contains more than one document, this
/// returns a structural error pointing at the second one; use [`compose_all_str`] instead.
///
/// ```rust
/// let yaml = r#"
/// base: &base
///   retries: 5
/// service:
///   settings: *base
/// "#;
///
/// let doc = saphyr_composer::compose_str(yaml).unwrap().unwrap();
/// let base = doc.get_value(doc.root(), "base").unwrap();
/// let service = doc.get_value(doc.root(), "service").unwrap();
/// assert_eq!(doc.get_value(service, "settings"), Some(base));
/// assert!(!doc.is_tree());
/// ```
#[cfg(feature = "saphyr")]
pub fn compose_str(input: &str) -> Result<Option<Document>, Error> {
    compose_str_with_options(input, Options::default())
}

/// Compose a single document with custom [`Options`].
#[cfg(feature = "saphyr")]
pub fn compose_str_with_options(input: &str, options: Options) -> Result<Option<Document>, Error> {
    Composer::with_options(LiveEvents::new(input), &options).single_document()
}

/// Compose every document of a YAML stream.
///
/// Anchors do not carry over from one document to the next.
///
/// ```rust
/// let yaml = r#"
/// name: First
/// ---
/// name: Second
/// "#;
///
/// let docs = saphyr_composer::compose_all_str(yaml).unwrap();
/// assert_eq!(docs.len(), 2);
/// let name = docs[1].get_value(docs[1].root(), "name").unwrap();
/// assert_eq!(docs[1][name].as_str(), Some("Second"));
/// ```
#[cfg(feature = "saphyr")]
pub fn compose_all_str(input: &str) -> Result<Vec<Document>, Error> {
    compose_all_str_with_options(input, Options::default())
}

/// Compose every document of a YAML stream with custom [`Options`].
#[cfg(feature = "saphyr")]
pub fn compose_all_str_with_options(input: &str, options: Options) -> Result<Vec<Document>, Error> {
    Composer::with_options(LiveEvents::new(input), &options).collect()
}
