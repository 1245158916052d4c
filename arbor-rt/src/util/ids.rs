//! Scoped identifier tokens.
//!
//! Actor cells and temporary reply references are both addressed by random
//! 128-bit tokens, but they key different tables: the system map and the
//! query correlation table. The scope tag keeps the two namespaces apart at
//! compile time, and each id carries a labelled short token used for
//! generated path segments and compact log fields.

// Layer 1: Standard library imports
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Namespace tag for a [`ScopedId`].
pub trait IdScope {
    /// Label prefixed to the id's compact rendering.
    const LABEL: &'static str;
}

/// Ids in this scope key actor cells in the system map.
pub enum ActorScope {}

impl IdScope for ActorScope {
    const LABEL: &'static str = "actor";
}

/// Ids in this scope key temporary reply references in the correlation
/// table.
pub enum TempScope {}

impl IdScope for TempScope {
    const LABEL: &'static str = "temp";
}

/// A random identifier tagged with the namespace it addresses.
///
/// Equality, hashing, and ordering look only at the token, so ids are cheap
/// `Copy` map keys with a stable order for diagnostics. An id from one scope
/// cannot be used where another scope's id is expected.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct ScopedId<Scope> {
    token: Uuid,
    scope: PhantomData<fn() -> Scope>,
}

/// Identifier of one actor cell.
pub type ActorId = ScopedId<ActorScope>;

/// Identifier of one temporary reply reference.
pub type TempId = ScopedId<TempScope>;

impl<Scope> ScopedId<Scope> {
    /// Mint a fresh random id.
    pub fn new() -> Self {
        Self {
            token: Uuid::new_v4(),
            scope: PhantomData,
        }
    }

    /// Compact lowercase hex token: enough entropy to stay unique among an
    /// actor's siblings, short enough for a generated path segment.
    pub fn short_token(&self) -> String {
        let mut buffer = Uuid::encode_buffer();
        self.token.simple().encode_lower(&mut buffer)[..12].to_owned()
    }
}

impl<Scope> Default for ScopedId<Scope> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Scope> Clone for ScopedId<Scope> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Scope> Copy for ScopedId<Scope> {}

impl<Scope> PartialEq for ScopedId<Scope> {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl<Scope> Eq for ScopedId<Scope> {}

impl<Scope> PartialOrd for ScopedId<Scope> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Scope> Ord for ScopedId<Scope> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.token.cmp(&other.token)
    }
}

impl<Scope> Hash for ScopedId<Scope> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl<Scope: IdScope> fmt::Debug for ScopedId<Scope> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Scope::LABEL, self.short_token())
    }
}

impl<Scope> fmt::Display for ScopedId<Scope> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_per_mint() {
        assert_ne!(ActorId::new(), ActorId::new());
        assert_ne!(TempId::new(), TempId::new());
    }

    #[test]
    fn test_short_token_is_a_stable_path_segment() {
        let id = ActorId::new();
        let token = id.short_token();
        assert_eq!(token.len(), 12);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        // Stable across calls on the same id.
        assert_eq!(token, id.short_token());
    }

    #[test]
    fn test_debug_carries_the_scope_label() {
        let actor = ActorId::new();
        let temp = TempId::new();
        assert!(format!("{actor:?}").starts_with("actor:"));
        assert!(format!("{temp:?}").starts_with("temp:"));
    }

    #[test]
    fn test_display_is_the_full_token() {
        let id = ActorId::new();
        let rendered = id.to_string();
        assert!(rendered.contains('-')); // canonical UUID form
        assert!(rendered.starts_with(&id.short_token()[..8]));
    }

    #[test]
    fn test_ordering_is_total_and_consistent_with_eq() {
        let a = ActorId::new();
        let b = ActorId::new();
        assert_eq!(a.cmp(&a), Ordering::Equal);
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn test_copy_semantics() {
        let id = TempId::new();
        let copied = id;
        assert_eq!(id, copied);
    }
}
