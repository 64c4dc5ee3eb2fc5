//! Error routes, resolved by nearest failure-kind ancestor.

use std::fmt;
use std::sync::Arc;

use crate::routing::failure::FailureKind;
use crate::routing::handler::ErrorHandler;

/// A failure kind bound to the handler that answers it.
pub struct ErrorRouteEntry {
    kind: &'static FailureKind,
    handler: Arc<dyn ErrorHandler>,
}

impl ErrorRouteEntry {
    pub(crate) fn new(kind: &'static FailureKind, handler: Arc<dyn ErrorHandler>) -> Self {
        Self { kind, handler }
    }

    pub fn kind(&self) -> &'static FailureKind {
        self.kind
    }

    pub(crate) fn handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.handler
    }
}

impl fmt::Debug for ErrorRouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRouteEntry").field("kind", &self.kind.name()).finish()
    }
}

/// The frozen error route table.
#[derive(Debug, Clone)]
pub struct ErrorRouteTable {
    entries: Arc<[ErrorRouteEntry]>,
}

impl ErrorRouteTable {
    pub(crate) fn new(entries: Vec<ErrorRouteEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn entries(&self) -> &[ErrorRouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick the entry for a failure of `kind`: among entries not yet tried,
    /// the one whose kind is the nearest ancestor, lowest index on ties.
    ///
    /// `tried` is indexed like the table; missing positions count as untried.
    pub fn resolve(&self, kind: &FailureKind, tried: &[bool]) -> Option<usize> {
        self.resolve_within(kind, tried, None)
    }

    /// Like [`resolve`](Self::resolve), but only entries whose kind is
    /// `ceiling` or one of its ancestors qualify. A re-raise uses the kind of
    /// the entry that re-raised, so escalation only ever moves outward.
    pub fn resolve_within(
        &self,
        kind: &FailureKind,
        tried: &[bool],
        ceiling: Option<&FailureKind>,
    ) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(index, _)| !tried.get(*index).copied().unwrap_or(false))
            .filter(|(_, entry)| ceiling.map_or(true, |ceiling| ceiling.is_a(entry.kind)))
            .filter_map(|(index, entry)| kind.distance_to(entry.kind).map(|distance| (distance, index)))
            .min()
            .map(|(_, index)| index)
    }
}
