//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! These macros keep call sites ergonomic while allowing the option structs to grow new fields
//! without breaking callers.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// ```rust
/// let options = saphyr_composer::options! {
///     strict_booleans: true,
/// };
/// assert!(options.strict_booleans);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            #[allow(deprecated)]
            {
                opt.$field = $value;
            }
        )*
        opt
    }};
}

/// Construct [`crate::Limits`] from `Default` and a list of field assignments.
///
/// ```rust
/// let limits = saphyr_composer::limits! {
///     max_depth: 16,
/// };
/// assert_eq!(limits.max_depth, 16);
/// assert_eq!(limits.max_aliases_for_collections, 50);
/// ```
#[macro_export]
macro_rules! limits {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut limits = $crate::Limits::default();
        $(
            #[allow(deprecated)]
            {
                limits.$field = $value;
            }
        )*
        limits
    }};
}
