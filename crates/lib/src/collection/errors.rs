//! Error types for the ordered collection.
//!
//! The collection operations themselves never fail: a missing key on lookup is
//! `None` and a missing key on removal is a no-op. The only error produced here
//! comes from the link diagnostics in [`OrderedMap::check_links`].
//!
//! [`OrderedMap::check_links`]: super::OrderedMap::check_links

use thiserror::Error;

/// Errors reported by the ordered collection diagnostics.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The linked order no longer agrees with the key index.
    #[error("Ordered map link corruption: {reason}")]
    LinkCorruption {
        /// Description of the broken invariant
        reason: String,
    },
}

impl CollectionError {
    /// Check if this error indicates the internal structure is inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, CollectionError::LinkCorruption { .. })
    }
}

impl From<CollectionError> for crate::Error {
    fn from(err: CollectionError) -> Self {
        crate::Error::Collection(err)
    }
}
