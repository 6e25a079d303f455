//! Implicit tag resolution.
//!
//! The composer asks a [`Resolver`] for the tag of every node that carries no explicit tag (or
//! the non-specific `!`). [`CoreResolver`] implements the YAML 1.1 conventions most configuration
//! files rely on: `yes`/`no` booleans, `0x`/`0o`/`0b` and legacy octal integers, `.inf`/`.nan`
//! floats, `<<` merge keys and dates.

use crate::node::NodeKind;
use crate::tags::Tag;

/// Maps a node's kind and textual form to a semantic tag.
pub trait Resolver {
    /// Resolve the tag of a node.
    ///
    /// - `value`: the scalar text; `None` for collections.
    /// - `implicit`: for scalars, whether the tag may be omitted for the plain form (plain
    ///   style, no tag); for collections, whether the tag was omitted.
    fn resolve(&self, kind: NodeKind, value: Option<&str>, implicit: bool) -> Tag;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, kind: NodeKind, value: Option<&str>, implicit: bool) -> Tag {
        (**self).resolve(kind, value, implicit)
    }
}

/// Default resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreResolver {
    /// If true, only the exact literals `true` and `false` (and their capitalized forms) resolve
    /// to `bool`. YAML 1.1 forms like `yes`/`no`/`on`/`off` resolve to `str`.
    pub strict_booleans: bool,
}

impl CoreResolver {
    pub fn new(strict_booleans: bool) -> Self {
        Self { strict_booleans }
    }

    fn resolve_plain(&self, value: &str) -> Tag {
        if is_null(value) {
            Tag::NULL
        } else if self.is_bool(value) {
            Tag::BOOL
        } else if is_int(value) {
            Tag::INT
        } else if is_float(value) {
            Tag::FLOAT
        } else if value == "<<" {
            Tag::MERGE
        } else if is_timestamp(value) {
            Tag::TIMESTAMP
        } else {
            Tag::STR
        }
    }

    fn is_bool(&self, value: &str) -> bool {
        if self.strict_booleans {
            return matches!(value, "true" | "True" | "TRUE" | "false" | "False" | "FALSE");
        }
        // Handles the "Norway problem" the YAML 1.1 way: case variants of each literal, not
        // arbitrary casing.
        matches!(
            value,
            "y" | "Y"
                | "yes"
                | "Yes"
                | "YES"
                | "n"
                | "N"
                | "no"
                | "No"
                | "NO"
                | "true"
                | "True"
                | "TRUE"
                | "false"
                | "False"
                | "FALSE"
                | "on"
                | "On"
                | "ON"
                | "off"
                | "Off"
                | "OFF"
        )
    }
}

impl Resolver for CoreResolver {
    fn resolve(&self, kind: NodeKind, value: Option<&str>, implicit: bool) -> Tag {
        match kind {
            NodeKind::Scalar => match value {
                Some(value) if implicit => self.resolve_plain(value),
                _ => Tag::STR,
            },
            NodeKind::Sequence => Tag::SEQ,
            NodeKind::Mapping => Tag::MAP,
        }
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value)
}

/// Digits of the given radix, `_` separators allowed, at least one digit.
fn all_digits(digits: &str, radix: u32) -> bool {
    let mut saw = false;
    for c in digits.chars() {
        match c {
            '_' => continue,
            c if c.is_digit(radix) => saw = true,
            _ => return false,
        }
    }
    saw
}

fn is_int(value: &str) -> bool {
    let body = strip_sign(value);
    if let Some(hex) = body.strip_prefix("0x") {
        return all_digits(hex, 16);
    }
    if let Some(oct) = body.strip_prefix("0o") {
        return all_digits(oct, 8);
    }
    if let Some(bin) = body.strip_prefix("0b") {
        return all_digits(bin, 2);
    }
    if body.len() > 1 && body.starts_with('0') {
        // Legacy YAML 1.1 octal: `0755`.
        return all_digits(&body[1..], 8);
    }
    !body.starts_with('_') && all_digits(body, 10)
}

fn is_float(value: &str) -> bool {
    let body = strip_sign(value);
    if matches!(body, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }
    // YAML 1.1 floats need a `.`; `inf` and `nan` spelled the Rust way are strings.
    let starts_numeric = body
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    if !starts_numeric || !body.contains('.') || !body.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let cleaned: String = body.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().is_ok()
}

/// `YYYY-MM-DD`, optionally followed by a time part (`T` or space separated).
fn is_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    let date_ok = bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit);
    if !date_ok {
        return false;
    }
    match bytes.get(10) {
        None => true,
        Some(b'T' | b't' | b' ' | b'\t') => bytes.get(11).is_some_and(u8::is_ascii_digit),
        Some(_) => false,
    }
}
