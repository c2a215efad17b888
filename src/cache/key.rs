//! Composite list keys.
//!
//! A list is identified by an ordered tuple of parts: `["all"]`, a ref key
//! with a value (`["_flow", "abc123"]`), a ref key with a set of values
//! (`["_id", ["a", "b"]]`), or longer chained key/value sequences. Two keys
//! are equal only if every position matches. Keys serialize to a canonical
//! string and index one flat map, and they also determine the REST route
//! the server expects for that subset.

use std::fmt;

/// One position of a list key: a scalar or an array of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArg {
  Scalar(String),
  Values(Vec<String>),
}

impl From<&str> for ListArg {
  fn from(s: &str) -> Self {
    ListArg::Scalar(s.to_string())
  }
}

impl From<String> for ListArg {
  fn from(s: String) -> Self {
    ListArg::Scalar(s)
  }
}

impl From<Vec<String>> for ListArg {
  fn from(values: Vec<String>) -> Self {
    ListArg::Values(values)
  }
}

impl From<Vec<&str>> for ListArg {
  fn from(values: Vec<&str>) -> Self {
    ListArg::Values(values.into_iter().map(String::from).collect())
  }
}

impl fmt::Display for ListArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ListArg::Scalar(s) => f.write_str(s),
      ListArg::Values(values) => write!(f, "[{}]", values.join(",")),
    }
  }
}

/// Ordered tuple identifying a named subset of a resource collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListKey {
  parts: Vec<ListArg>,
}

// Unit separator keeps canonical keys collision-free for ordinary ids.
const PART_SEP: char = '\u{1f}';

impl ListKey {
  /// The unfiltered collection.
  pub fn all() -> Self {
    Self {
      parts: vec![ListArg::Scalar("all".to_string())],
    }
  }

  /// Build a key from parts. An empty tuple normalizes to `all`.
  pub fn new<I, A>(parts: I) -> Self
  where
    I: IntoIterator<Item = A>,
    A: Into<ListArg>,
  {
    let parts: Vec<ListArg> = parts.into_iter().map(Into::into).collect();
    if parts.is_empty() {
      Self::all()
    } else {
      Self { parts }
    }
  }

  /// Equality filter on a ref key, e.g. `by("_flow", "f1")`.
  pub fn by(key: &str, value: &str) -> Self {
    Self::new([ListArg::from(key), ListArg::from(value)])
  }

  /// Membership filter on a ref key, e.g. `by_values("_id", ids)`.
  pub fn by_values<V: Into<String>>(key: &str, values: impl IntoIterator<Item = V>) -> Self {
    Self::new([
      ListArg::from(key),
      ListArg::Values(values.into_iter().map(Into::into).collect()),
    ])
  }

  /// Parse CLI-style parts: a part containing a comma becomes an array.
  pub fn parse(parts: &[String]) -> Self {
    Self::new(parts.iter().map(|p| {
      if p.contains(',') {
        ListArg::Values(p.split(',').map(|v| v.trim().to_string()).collect())
      } else {
        ListArg::Scalar(p.clone())
      }
    }))
  }

  pub fn parts(&self) -> &[ListArg] {
    &self.parts
  }

  /// True for the bare collection key.
  pub fn is_all(&self) -> bool {
    matches!(self.parts.as_slice(), [ListArg::Scalar(s)] if s == "all")
  }

  /// Canonical string form used as the flat index key. Positional: two keys
  /// map to the same string only if every part matches.
  pub fn canonical(&self) -> String {
    let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
    rendered.join(&PART_SEP.to_string())
  }

  /// Build the REST route the server expects for this subset.
  ///
  /// - `all` → `/api/{collection}`
  /// - one ref key → `/api/{collection}/by-{k}`
  /// - key + array → `/api/{collection}/by-{k}-list?{k}=v1&{k}=v2&`
  /// - key + value → `/api/{collection}/by-{k}/{v}` (the literal string
  ///   `"null"` passes through as an explicit null filter)
  /// - longer tuples → chained `/by-{k0}/{k1}/{k2}/...` path segments; the
  ///   server decodes alternating key/value pairs after the first two.
  pub fn route(&self, collection: &str) -> String {
    let mut target = format!("/api/{}", collection);
    if self.is_all() {
      return target;
    }
    match self.parts.as_slice() {
      [only] => {
        target.push_str(&format!("/by-{}", only));
      }
      [ListArg::Scalar(key), ListArg::Values(values)] => {
        target.push_str(&format!("/by-{}-list?", key));
        for value in values {
          target.push_str(&format!("{}={}&", key, value));
        }
      }
      [first, second] => {
        target.push_str(&format!("/by-{}/{}", first, second));
      }
      [first, second, rest @ ..] => {
        target.push_str(&format!("/by-{}/{}", first, second));
        for part in rest {
          target.push_str(&format!("/{}", part));
        }
      }
      [] => unreachable!("empty tuples normalize to all"),
    }
    target
  }
}

impl fmt::Display for ListKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
    write!(f, "({})", rendered.join(", "))
  }
}

impl Default for ListKey {
  fn default() -> Self {
    Self::all()
  }
}
