//! Strategy selection.
//!
//! The resolver walks an ordered list of [`StrategyKind`]s and returns the
//! first one that claims the target. Later claims are ignored even when they
//! would also apply; ties are settled by position, never reported.
//!
//! # Example
//!
//! ```rust
//! use loctext_core::{Record, Resolver, StrategyKind, Target};
//!
//! let record = Record::from_json(r#"{"online_format": "audio", "image_url": [],
//!     "resources": [{"fulltext_file": "https://example.org/t.xml"}]}"#).unwrap();
//!
//! let resolver = Resolver::default();
//! assert_eq!(resolver.resolve(&Target::Record(&record)).unwrap(), StrategyKind::ResourceLink);
//! ```

use crate::endpoints::Endpoints;
use crate::strategy::{Strategy, StrategyKind, Target};
use crate::{LoctextError, Result};

/// Picks the strategy for a record or item page. Immutable once built.
#[derive(Debug, Clone)]
pub struct Resolver {
    priority: Vec<StrategyKind>,
    endpoints: Endpoints,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(StrategyKind::ALL.to_vec(), Endpoints::default())
    }
}

impl Resolver {
    /// Creates a resolver that tries `priority` in order. Duplicates are dropped.
    pub fn new(priority: Vec<StrategyKind>, endpoints: Endpoints) -> Self {
        let mut deduped = Vec::with_capacity(priority.len());
        for kind in priority {
            if !deduped.contains(&kind) {
                deduped.push(kind);
            }
        }
        Self { priority: deduped, endpoints }
    }

    /// Default priority order against the given hosts.
    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self::new(StrategyKind::ALL.to_vec(), endpoints)
    }

    pub fn priority(&self) -> &[StrategyKind] {
        &self.priority
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Returns the first strategy in priority order that applies to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`LoctextError::UnresolvedRecord`] when none applies.
    pub fn resolve(&self, target: &Target<'_>) -> Result<StrategyKind> {
        self.priority
            .iter()
            .copied()
            .find(|kind| kind.applies_to(target, &self.endpoints))
            .ok_or_else(|| LoctextError::UnresolvedRecord { id: target.display_id() })
    }

    /// Every strategy that applies to `target`, in priority order.
    pub fn candidates(&self, target: &Target<'_>) -> Vec<StrategyKind> {
        self.priority
            .iter()
            .copied()
            .filter(|kind| kind.applies_to(target, &self.endpoints))
            .collect()
    }
}
