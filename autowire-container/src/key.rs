//! Type identifiers.
//!
//! [`DependencyKey`] names a type the [`Introspector`](crate::reflect::Introspector)
//! can resolve to a concrete or abstract type. Keys are plain names: two keys
//! are equal iff their names are equal.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifies a type in the container.
///
/// Cloning is cheap (the name is shared).
///
/// # Examples
/// ```
/// use autowire_container::key::DependencyKey;
///
/// let key = DependencyKey::new("app::Mailer");
/// assert_eq!(key.as_str(), "app::Mailer");
/// assert_eq!(key, DependencyKey::from("app::Mailer"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey(Arc<str>);

impl DependencyKey {
    /// Creates a key from a type name.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the type name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DependencyKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

impl AsRef<str> for DependencyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DependencyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyKey({})", self.0)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
