//! Fully-qualified type names.
//!
//! This module provides the [`Fqn`] type, the dotted path that uniquely
//! identifies a declared type: `package.Outer.Inner`. Nested types append
//! their simple name to the owner's FQN, so the prefix of a nested FQN is a
//! type name, not a package path.

use std::{borrow::Borrow, fmt};

/// A fully-qualified type name.
///
/// Ordering is lexicographic on the dotted string, which is what the index
/// relies on for deterministic iteration.
///
/// # Examples
///
/// ```
/// use classmap_core::fqn::Fqn;
///
/// let outer = Fqn::top_level("com.acme", "Order");
/// assert_eq!(outer, "com.acme.Order");
///
/// let inner = outer.nested("Line");
/// assert_eq!(inner, "com.acme.Order.Line");
/// assert_eq!(inner.simple_name(), "Line");
/// assert_eq!(inner.owner(), Some("com.acme.Order"));
///
/// // Types in the unnamed package have no prefix at all.
/// assert_eq!(Fqn::top_level("", "Main"), "Main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fqn(String);

impl Fqn {
    /// Creates an `Fqn` from an already dotted name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates the FQN of a top-level type declared in `package`.
    ///
    /// An empty `package` denotes the unnamed package.
    pub fn top_level(package: &str, name: &str) -> Self {
        if package.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{package}.{name}"))
        }
    }

    /// Creates the FQN of a type nested directly inside `self`.
    pub fn nested(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Returns the last dotted segment.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.0)
    }

    /// Returns everything before the last dot, or `None` for a single segment.
    ///
    /// This is a purely structural split: the result may be a package path or
    /// the FQN of an enclosing type, and only an index can tell which.
    pub fn owner(&self) -> Option<&str> {
        self.0.rfind('.').map(|dot| &self.0[..dot])
    }

    /// Returns the dotted name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Fqn` and returns the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Returns the substring after the last `.` of `name`, or `name` itself.
///
/// # Examples
///
/// ```
/// use classmap_core::fqn::simple_name;
///
/// assert_eq!(simple_name("java.util.List"), "List");
/// assert_eq!(simple_name("List"), "List");
/// ```
pub fn simple_name(name: &str) -> &str {
    name.rfind('.').map_or(name, |dot| &name[dot + 1..])
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fqn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Fqn {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fqn {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Fqn {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Fqn {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Fqn {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
