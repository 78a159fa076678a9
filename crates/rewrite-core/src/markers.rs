//! Extensible per-node metadata.
//!
//! A [`Markers`] value is an immutable, shared list of marker objects. Any
//! type implementing [`Marker`] can be attached; lookups are by concrete type.
//! Adding or removing a marker returns a new list and leaves the original
//! untouched, so markers follow the same persistent discipline as tree nodes.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A piece of metadata that can be attached to a tree node.
pub trait Marker: fmt::Debug + Send + Sync + 'static {}

trait ErasedMarker: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Marker> ErasedMarker for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Immutable list of markers attached to a node.
#[derive(Clone, Default)]
pub struct Markers {
    items: Arc<Vec<Arc<dyn ErasedMarker>>>,
}

impl Markers {
    /// An empty marker list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Find the first marker of type `T`.
    pub fn find<T: Marker>(&self) -> Option<&T> {
        self.items.iter().find_map(|m| m.as_any().downcast_ref::<T>())
    }

    pub fn has<T: Marker>(&self) -> bool {
        self.find::<T>().is_some()
    }

    /// Return a new list with `marker` appended.
    pub fn add<T: Marker>(&self, marker: T) -> Markers {
        let mut items: Vec<Arc<dyn ErasedMarker>> = self.items.as_ref().clone();
        items.push(Arc::new(marker));
        Markers {
            items: Arc::new(items),
        }
    }

    /// Return a new list with every marker of type `T` removed.
    ///
    /// Returns a clone sharing the same storage when no such marker exists.
    pub fn remove<T: Marker>(&self) -> Markers {
        if !self.has::<T>() {
            return self.clone();
        }
        let items = self
            .items
            .iter()
            .filter(|m| m.as_any().downcast_ref::<T>().is_none())
            .cloned()
            .collect();
        Markers {
            items: Arc::new(items),
        }
    }

    /// True if both lists share storage.
    pub fn ptr_eq(&self, other: &Markers) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl fmt::Debug for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

/// Marks a node found by a search visitor.
///
/// Applicability tests attach a `SearchResult` to the compilation unit, which
/// changes the unit's identity and so signals "applicable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub description: Option<String>,
}

impl SearchResult {
    pub fn new() -> Self {
        SearchResult { description: None }
    }

    pub fn with_description(description: impl Into<String>) -> Self {
        SearchResult {
            description: Some(description.into()),
        }
    }
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::new()
    }
}

impl Marker for SearchResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Generated(&'static str);
    impl Marker for Generated {}

    #[test]
    fn add_is_persistent() {
        let empty = Markers::new();
        let one = empty.add(SearchResult::new());
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert!(one.has::<SearchResult>());
        assert!(!one.has::<Generated>());
    }

    #[test]
    fn find_by_type() {
        let markers = Markers::new()
            .add(Generated("parser"))
            .add(SearchResult::with_description("found"));
        assert_eq!(markers.find::<Generated>(), Some(&Generated("parser")));
        assert_eq!(
            markers.find::<SearchResult>().and_then(|s| s.description.as_deref()),
            Some("found")
        );
    }

    #[test]
    fn remove_missing_marker_shares_storage() {
        let markers = Markers::new().add(Generated("x"));
        let same = markers.remove::<SearchResult>();
        assert!(same.ptr_eq(&markers));
        let removed = markers.remove::<Generated>();
        assert!(removed.is_empty());
        assert!(!removed.ptr_eq(&markers));
    }
}
