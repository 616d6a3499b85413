use glam::IVec3;
use thiserror::Error;
use tracing::error;

/// Divergence between bookkeeping of an [`crate::Entry`] and the actual state
/// of a grid.
///
/// Such state can be reached only due to a bug (or use of an entry with a
/// grid which did not issue it), thus these errors are not propagated to the
/// callers. See [`report`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InvariantViolation {
    #[error("Cell {coords} is expected to hold the element but it does not exist.")]
    CellMissing { coords: IVec3 },
    #[error("Cell {coords} does not hold the element.")]
    NodeMissing { coords: IVec3 },
    #[error("The entry was issued by a different grid.")]
    ForeignEntry,
    #[error("The entry refers to an element which is not stored in the grid.")]
    StaleNode,
}

/// Reports an invariant violation. It panics in debug builds.
///
/// Continuing after the violation might leave elements stuck in cells they
/// were supposed to leave, so the violation is at least logged in release
/// builds.
pub(crate) fn report(violation: InvariantViolation) {
    error!("Spatial hash grid invariant violated: {violation}");
    if cfg!(debug_assertions) {
        panic!("Spatial hash grid invariant violated: {violation}");
    }
}
