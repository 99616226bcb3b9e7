//! Cache key naming and invalidation patterns for live profiles.
//!
//! Keys are `<entityType>:<entityId>:<facet>`. Every key that belongs to one
//! entity shares the `<entityType>:<entityId>:` prefix, so a single glob
//! pattern removes all of them.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use crate::domain::foundation::{EntityId, EntityType};

/// Facet name of the live profile entry.
pub const PROFILE_FACET: &str = "profile";

/// Deterministic cache key for one facet of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key of the live profile, e.g. `seller:<id>:profile`.
    pub fn profile(entity_type: EntityType, entity_id: &EntityId) -> Self {
        Self::facet(entity_type, entity_id, PROFILE_FACET)
    }

    /// Key of an arbitrary facet of an entity.
    pub fn facet(entity_type: EntityType, entity_id: &EntityId, facet: &str) -> Self {
        Self(format!("{}:{}:{}", entity_type.as_str(), entity_id.as_str(), facet))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Glob expression covering a family of cache keys.
///
/// Syntax follows Redis `MATCH`: `*` matches any run of characters, `?`
/// matches exactly one, `[...]` is a class, and `\` escapes the next
/// character. Separators carry no special meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidationPattern(String);

impl InvalidationPattern {
    /// Pattern covering every key of one entity: `seller:<id>:*`.
    ///
    /// The id is escaped, so an id containing `*` can only ever match itself.
    pub fn for_entity(entity_type: EntityType, entity_id: &EntityId) -> Self {
        Self(format!(
            "{}:{}:*",
            entity_type.as_str(),
            escape_glob(entity_id.as_str())
        ))
    }

    /// Wraps a pattern received from elsewhere (store adapters, tooling).
    pub fn from_raw(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Returns the pattern as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compile the pattern for matching many keys.
    pub fn matcher(&self) -> Result<GlobMatcher, globset::Error> {
        Ok(GlobBuilder::new(&self.0)
            .literal_separator(false)
            .backslash_escape(true)
            .build()?
            .compile_matcher())
    }

    /// Whether `key` belongs to the family this pattern denotes.
    ///
    /// A pattern that does not compile matches nothing.
    pub fn matches(&self, key: &str) -> bool {
        self.matcher().is_ok_and(|m| m.is_match(key))
    }
}

impl fmt::Display for InvalidationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape glob metacharacters so `s` matches only itself.
pub fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
