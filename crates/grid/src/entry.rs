//! Handles of elements inserted to a grid.

use std::{
    cell::RefCell,
    sync::atomic::{AtomicU64, Ordering},
};

use glam::Vec3;
use tracing::error;

use crate::{grid::SpatialHashGrid, node::NodeId, range::CellRange};

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct GridId(u64);

impl GridId {
    pub(crate) fn next() -> Self {
        Self(NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A handle of a single insertion of an element to a [`SpatialHashGrid`]. It
/// does not remove the element when dropped, wrap it in a [`ScopedEntry`]
/// (see [`ScopedEntry::insert`]) to get removal on drop.
///
/// The entry records the element's node and the range of cells the node was
/// placed into. It is the only way to remove or move the element, which
/// guarantees that the element is removed from exactly the cells it was
/// inserted to.
///
/// Entries cannot be cloned and [`SpatialHashGrid::remove`] consumes them,
/// thus every insertion is matched by at most one removal. An entry dropped
/// without being removed leaves its element in the grid and an error is
/// logged.
#[must_use = "the element stays in the grid until the entry is passed to `SpatialHashGrid::remove`"]
#[derive(Debug)]
pub struct Entry {
    grid: GridId,
    node: NodeId,
    range: CellRange,
    released: bool,
}

impl Entry {
    pub(crate) fn new(grid: GridId, node: NodeId, range: CellRange) -> Self {
        Self {
            grid,
            node,
            range,
            released: false,
        }
    }

    /// Identity of the inserted element within the grid.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Range of cells the element is currently placed into.
    pub fn cell_range(&self) -> CellRange {
        self.range
    }

    pub(crate) fn grid(&self) -> GridId {
        self.grid
    }

    pub(crate) fn set_range(&mut self, range: CellRange) {
        self.range = range;
    }

    pub(crate) fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn release(&mut self) {
        self.released = true;
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        if !self.released {
            error!(
                "Spatial hash entry of node {:?} dropped without removal, the element stays in \
                 cells {:?}.",
                self.node, self.range
            );
        }
    }
}

/// An [`Entry`] bound to a grid, it removes its element from the grid once
/// dropped.
///
/// The guard borrows the grid, thus it cannot outlive it.
pub struct ScopedEntry<'g, T> {
    grid: &'g RefCell<SpatialHashGrid<T>>,
    entry: Entry,
}

impl<'g, T> ScopedEntry<'g, T> {
    /// Inserts an element to the grid. See [`SpatialHashGrid::insert`].
    ///
    /// # Panics
    ///
    /// Panics if the grid is currently borrowed.
    pub fn insert(grid: &'g RefCell<SpatialHashGrid<T>>, element: T, corners: &[Vec3; 8]) -> Self {
        let entry = grid.borrow_mut().insert(element, corners);
        Self { grid, entry }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Moves the element to cells overlapping a new bounding box. See
    /// [`SpatialHashGrid::update`].
    ///
    /// # Panics
    ///
    /// Panics if the grid is currently borrowed.
    pub fn update(&mut self, corners: &[Vec3; 8]) -> bool {
        self.grid.borrow_mut().update(&mut self.entry, corners)
    }

    /// Removes the element from the grid right away. Returns true if the
    /// element was removed from all expected cells.
    ///
    /// # Panics
    ///
    /// Panics if the grid is currently borrowed.
    pub fn remove(mut self) -> bool {
        self.grid.borrow_mut().detach(&mut self.entry)
    }
}

impl<'g, T> Drop for ScopedEntry<'g, T> {
    fn drop(&mut self) {
        if self.entry.is_released() {
            return;
        }

        match self.grid.try_borrow_mut() {
            Ok(mut grid) => {
                grid.detach(&mut self.entry);
            }
            Err(_) => error!(
                "Could not remove node {:?} from a spatial hash grid, the grid is borrowed.",
                self.entry.node()
            ),
        }
    }
}
