//! Vervuilingsvlaggen en cache-sloten voor duur herbouwbare geometrie.
//!
//! Elk slot is expliciet `Dirty` of `Clean(Arc<T>)`. Herbouwen gebeurt nooit
//! speculatief: een query op een vuil slot bouwt, slaat op en levert de
//! gedeelde referentie; een mislukte bouw laat het slot vuil zodat de
//! volgende query het opnieuw probeert.

use std::collections::HashMap;
use std::sync::Arc;

use crate::geom::Shape;

/// Toestand van één cache-slot.
#[derive(Debug, Clone)]
pub enum CacheSlot<T> {
    Dirty,
    Clean(Arc<T>),
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::Dirty
    }
}

impl<T> CacheSlot<T> {
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self, Self::Dirty)
    }

    pub fn invalidate(&mut self) {
        *self = Self::Dirty;
    }

    /// De gecachte waarde, als het slot schoon is.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        match self {
            Self::Clean(value) => Some(Arc::clone(value)),
            Self::Dirty => None,
        }
    }

    /// Markeert het slot schoon met `value` en retourneert de gedeelde
    /// referentie.
    pub fn store(&mut self, value: T) -> Arc<T> {
        let shared = Arc::new(value);
        *self = Self::Clean(Arc::clone(&shared));
        shared
    }
}

/// Sleutel voor de paarsgewijze segmentfusiecache.
pub type SegmentPair = (usize, usize);

/// De cache-sloten van één component.
///
/// De sloten zijn onafhankelijk: de schillen kunnen schoon blijven terwijl
/// het samengestelde geheel herbouwd wordt, en omgekeerd. De paarcache is
/// aanwezigheidsgebaseerd: een ontbrekende sleutel is vuil.
#[derive(Debug, Clone, Default)]
pub struct ComponentCaches {
    pub fused: CacheSlot<Shape>,
    pub upper_shell: CacheSlot<Shape>,
    pub lower_shell: CacheSlot<Shape>,
    pub fused_pairs: HashMap<SegmentPair, Arc<Shape>>,
}

impl ComponentCaches {
    /// Markeert alle sloten vuil.
    pub fn invalidate_all(&mut self) {
        self.fused.invalidate();
        self.upper_shell.invalidate();
        self.lower_shell.invalidate();
        self.fused_pairs.clear();
    }

    #[must_use]
    pub fn all_dirty(&self) -> bool {
        self.fused.is_dirty()
            && self.upper_shell.is_dirty()
            && self.lower_shell.is_dirty()
            && self.fused_pairs.is_empty()
    }
}
