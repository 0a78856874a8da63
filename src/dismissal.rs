//! Outside-click dismissal
//!
//! Clicking inside a chart or its paired table is how a highlight gets set.
//! Clicking anywhere else means the user is done with it. Every pointer-down
//! in the document is reported here. When it lands outside every live
//! region and a highlight is active, the whole selection (highlight and
//! hover) is cleared.
//!
//! What "inside" means belongs to the UI layer, so containment goes through
//! the [`LiveRegion`] trait. Two implementations ship:
//!
//! - [`Bounds`]: an axis-aligned rectangle tested against a [`Point`]
//! - [`ElementRegion`]: a container element tested against the
//!   [`ElementPath`] from the event origin up to the document root
//!
//! The registry must track what is actually mounted. When tabs switch,
//! call [`DismissalPolicy::replace_regions`] with the new set so a region
//! that is gone cannot keep an unreachable highlight alive.

use crate::selection::SelectionCoordinator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait LiveRegion {
    type Target: ?Sized;

    fn contains(&self, target: &Self::Target) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Rectangle in page coordinates. Edges count as inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LiveRegion for Bounds {
    type Target = Point;

    fn contains(&self, p: &Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// The event origin followed by each of its ancestors
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementPath(pub Vec<ElementId>);

/// A mounted container element; everything beneath it is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRegion {
    pub root: ElementId,
}

impl LiveRegion for ElementRegion {
    type Target = ElementPath;

    fn contains(&self, path: &ElementPath) -> bool {
        path.0.contains(&self.root)
    }
}

/// Registry of live regions, keyed by a caller-chosen name
#[derive(Debug, Clone)]
pub struct DismissalPolicy<R: LiveRegion> {
    regions: BTreeMap<String, R>,
}

impl<R: LiveRegion> Default for DismissalPolicy<R> {
    fn default() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }
}

impl<R: LiveRegion> DismissalPolicy<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or move) a region. Returns the region it replaced.
    pub fn register(&mut self, id: impl Into<String>, region: R) -> Option<R> {
        self.regions.insert(id.into(), region)
    }

    pub fn deregister(&mut self, id: &str) -> Option<R> {
        self.regions.remove(id)
    }

    /// Swap in the full set of currently mounted regions
    pub fn replace_regions<I, S>(&mut self, regions: I)
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(|(id, r)| (id.into(), r)).collect();
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.regions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn is_inside(&self, target: &R::Target) -> bool {
        self.regions.values().any(|r| r.contains(target))
    }

    /// Handle a document-wide pointer-down. Returns whether the selection
    /// was dismissed.
    pub fn on_global_pointer_down(
        &self,
        target: &R::Target,
        selection: &mut SelectionCoordinator,
    ) -> bool {
        if !selection.has_highlight() || self.is_inside(target) {
            return false;
        }
        tracing::trace!("pointer-down outside all live regions, clearing selection");
        selection.clear();
        true
    }
}
