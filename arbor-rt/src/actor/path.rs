// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Hierarchical name identifying an actor in the supervision tree.
///
/// A path is the owning system's name plus the chain of child names from the
/// root down to the actor. Paths are immutable; a child path is derived from
/// its parent's at spawn time.
///
/// # Examples
///
/// ```rust
/// use arbor_rt::actor::ActorPath;
///
/// let root = ActorPath::root("app");
/// let worker = root.child("pool").child("worker-1");
/// assert_eq!(worker.to_string(), "app://pool/worker-1");
/// assert_eq!(worker.name(), Some("worker-1"));
/// assert!(root.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorPath {
    system: String,
    parts: Vec<String>,
}

impl ActorPath {
    /// The root path of a system.
    pub fn root(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            parts: Vec::new(),
        }
    }

    /// This path extended by a child name.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut parts = self.parts.clone();
        parts.push(name.into());
        Self {
            system: self.system.clone(),
            parts,
        }
    }

    /// The final segment, absent for the root.
    pub fn name(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Whether this is the system root.
    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    /// The owning system's name.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The child-name chain from the root down.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Depth below the root.
    pub fn depth(&self) -> usize {
        self.parts.len()
    }
}

impl Display for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.system, self.parts.join("/"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let root = ActorPath::root("sys");
        assert!(root.is_root());
        assert_eq!(root.name(), None);
        assert_eq!(root.depth(), 0);
        assert_eq!(root.to_string(), "sys://");
    }

    #[test]
    fn test_child_extends_parent() {
        let root = ActorPath::root("sys");
        let a = root.child("a");
        let b = a.child("b");

        assert_eq!(a.name(), Some("a"));
        assert_eq!(b.name(), Some("b"));
        assert_eq!(b.depth(), 2);
        assert_eq!(b.parts(), &["a".to_owned(), "b".to_owned()]);
        assert_eq!(b.to_string(), "sys://a/b");
        // Deriving a child leaves the parent untouched.
        assert_eq!(a.depth(), 1);
    }

    #[test]
    fn test_paths_compare_by_value() {
        let left = ActorPath::root("sys").child("a");
        let right = ActorPath::root("sys").child("a");
        assert_eq!(left, right);
        assert_ne!(left, ActorPath::root("sys").child("b"));
        assert_ne!(left, ActorPath::root("other").child("a"));
    }

    #[test]
    fn test_system_accessor() {
        let path = ActorPath::root("app").child("x");
        assert_eq!(path.system(), "app");
    }
}
