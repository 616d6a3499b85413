//! This module contains implementation of a generic 3D spatial hash grid.

use ahash::{AHashMap, AHashSet};
use glam::{IVec3, Vec3};
use parry3d::bounding_volume::Aabb;
use sg_conf::GridConf;
use tracing::{debug, trace};

use crate::{
    cell::{Cell, CellPool, CellRef},
    coords::bucket_key,
    entry::{Entry, GridId},
    error::{report, InvariantViolation},
    node::{NodeId, NodeTable},
    range::CellRange,
    segment::LineCells,
};

/// Number of cells the bucket map is pre-allocated for by default.
pub const DEFAULT_ESTIMATED_CELLS: usize = 10_000;

/// Unbounded uniform 3D grid of element buckets.
///
/// Each element is placed into all cells overlapped by its bounding box. Only
/// non-empty cells are kept. Cells are stored in a hash map keyed by packed
/// cell coordinates, the packing is lossy, thus each map value is a small
/// list of cells which is always searched by exact coordinates.
///
/// The grid is not thread safe, all operations require exclusive or shared
/// access to the grid as usual.
pub struct SpatialHashGrid<T> {
    id: GridId,
    cell_size: Vec3,
    buckets: AHashMap<u64, Vec<Cell>>,
    cell_count: usize,
    pool: CellPool,
    nodes: NodeTable<T>,
}

impl<T> SpatialHashGrid<T> {
    /// Creates a new empty grid.
    ///
    /// # Arguments
    ///
    /// * `cell_size` - world-space size of a single cell. Cells need not be
    ///   cubes.
    ///
    /// # Panics
    ///
    /// Panics if any component of `cell_size` is not a finite positive
    /// number.
    pub fn new(cell_size: Vec3) -> Self {
        Self::with_capacity(cell_size, DEFAULT_ESTIMATED_CELLS)
    }

    /// Creates a new empty grid with the cell map pre-allocated for
    /// `estimated_cells` cells.
    ///
    /// # Panics
    ///
    /// Panics if any component of `cell_size` is not a finite positive
    /// number.
    pub fn with_capacity(cell_size: Vec3, estimated_cells: usize) -> Self {
        assert!(
            cell_size.is_finite() && cell_size.cmpgt(Vec3::ZERO).all(),
            "Cell size must be finite and positive, got {cell_size}."
        );

        Self {
            id: GridId::next(),
            cell_size,
            buckets: AHashMap::with_capacity(estimated_cells),
            cell_count: 0,
            pool: CellPool::new(),
            nodes: NodeTable::new(),
        }
    }

    /// Creates a new empty grid from a (validated) configuration.
    pub fn from_conf(conf: &GridConf) -> Self {
        Self::with_capacity(conf.cell_size(), conf.estimated_cells())
    }

    /// World-space size of a single cell.
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Inserts an element to the grid.
    ///
    /// # Arguments
    ///
    /// * `element` - element to be inserted. Elements are compared by
    ///   identity of the insertion, not by value.
    ///
    /// * `corners` - world-space corners of the (possibly oriented) bounding
    ///   box of the element. See [`crate::obb_corners`].
    ///
    /// # Returns
    ///
    /// An entry which must be later passed to [`Self::remove`] or
    /// [`Self::update`] of this grid.
    pub fn insert(&mut self, element: T, corners: &[Vec3; 8]) -> Entry {
        let range = CellRange::from_corners(corners, self.cell_size);
        let node = self.nodes.insert(element);
        for coords in range {
            self.insert_to_cell(node, coords);
        }

        trace!("Inserted node {node:?} to cells {range:?}.");
        Entry::new(self.id, node, range)
    }

    /// Removes an element from the grid and returns true if the element was
    /// removed from all cells it was expected to be in.
    ///
    /// Any divergence between the entry and the grid is a bug: it is logged
    /// and panics in debug builds.
    pub fn remove(&mut self, mut entry: Entry) -> bool {
        self.detach(&mut entry)
    }

    /// Removes the element of an entry from the grid and marks the entry as
    /// released.
    pub(crate) fn detach(&mut self, entry: &mut Entry) -> bool {
        debug_assert!(!entry.is_released());
        entry.release();

        if !self.validate(entry) {
            return false;
        }

        let node = entry.node();
        let mut all_removed = true;
        for coords in entry.cell_range() {
            all_removed &= self.remove_from_cell(node, coords);
        }
        self.nodes.remove(node);

        trace!("Removed node {node:?} from cells {:?}.", entry.cell_range());
        all_removed
    }

    /// Moves an element to cells overlapped by a new bounding box. Returns
    /// false if the element was not found in some of the cells it was
    /// expected to be in.
    ///
    /// The element keeps its node, only the cells which are not overlapped by
    /// both the old and the new bounding box are touched.
    ///
    /// # Arguments
    ///
    /// * `entry` - entry issued by this grid for the element.
    ///
    /// * `corners` - new world-space corners of the bounding box of the
    ///   element.
    pub fn update(&mut self, entry: &mut Entry, corners: &[Vec3; 8]) -> bool {
        if !self.validate(entry) {
            return false;
        }

        let old_cells = entry.cell_range();
        let new_cells = CellRange::from_corners(corners, self.cell_size);

        // Most of the time elements move within the same cell range.
        if old_cells == new_cells {
            return true;
        }

        let node = entry.node();
        let intersection = old_cells.intersection(&new_cells);
        let mut all_removed = true;
        for coords in old_cells {
            if intersection.excludes(coords) {
                all_removed &= self.remove_from_cell(node, coords);
            }
        }
        for coords in new_cells {
            if intersection.excludes(coords) {
                self.insert_to_cell(node, coords);
            }
        }
        entry.set_range(new_cells);

        trace!("Moved node {node:?} from cells {old_cells:?} to cells {new_cells:?}.");
        all_removed
    }

    /// Returns the element of a node or `None` if the node is not stored in
    /// the grid.
    pub fn element(&self, node: NodeId) -> Option<&T> {
        self.nodes.get(node)
    }

    /// Returns a non-empty cell at given coordinates or `None` if there is no
    /// element in the cell.
    pub fn cell(&self, coords: IVec3) -> Option<CellRef<'_, T>> {
        self.find_cell(coords)
            .map(|cell| CellRef::new(cell, &self.nodes))
    }

    /// Appends all non-empty cells intersecting a line segment to `out`.
    ///
    /// The cells are appended by increasing distance from `start`, each at
    /// most once.
    pub fn lookup_cells_overlapping_line<'a>(
        &'a self,
        start: Vec3,
        end: Vec3,
        out: &mut Vec<CellRef<'a, T>>,
    ) {
        self.lookup_cells(LineCells::new(start, end, self.cell_size), out);
    }

    /// Appends all non-empty cells overlapping an axis aligned bounding box
    /// to `out`.
    pub fn lookup_cells_for_aabb<'a>(&'a self, aabb: &Aabb, out: &mut Vec<CellRef<'a, T>>) {
        self.lookup_cells(CellRange::from_aabb(aabb, self.cell_size), out);
    }

    /// Appends all non-empty cells overlapping a bounding box given by its 8
    /// world-space corners to `out`.
    pub fn lookup_cells_for_obb<'a>(&'a self, corners: &[Vec3; 8], out: &mut Vec<CellRef<'a, T>>) {
        self.lookup_cells(CellRange::from_corners(corners, self.cell_size), out);
    }

    /// Appends all cells occupied by the element of an entry to `out`.
    ///
    /// This is meant for debugging and visualization of the grid.
    pub fn lookup_cells_for_entry<'a>(&'a self, entry: &Entry, out: &mut Vec<CellRef<'a, T>>) {
        if self.validate(entry) {
            self.lookup_cells(entry.cell_range(), out);
        }
    }

    /// Appends all distinct nodes sharing at least one cell with the element
    /// of an entry to `out`.
    ///
    /// # Arguments
    ///
    /// * `entry` - entry issued by this grid.
    ///
    /// * `filter_out_source` - if true, the node of the entry itself is not
    ///   appended.
    ///
    /// * `out` - the nodes are appended to this vector.
    pub fn lookup_nodes_in_cells<'a>(
        &'a self,
        entry: &Entry,
        filter_out_source: bool,
        out: &mut Vec<(NodeId, &'a T)>,
    ) {
        if !self.validate(entry) {
            return;
        }

        let mut encountered = AHashSet::new();
        if filter_out_source {
            encountered.insert(entry.node());
        }

        for coords in entry.cell_range() {
            let Some(cell) = self.find_cell(coords) else {
                continue;
            };

            for &node in cell.nodes() {
                if encountered.insert(node) {
                    if let Some(element) = self.nodes.get(node) {
                        out.push((node, element));
                    }
                }
            }
        }
    }

    /// Returns true if there is no element in the grid.
    pub fn is_empty(&self) -> bool {
        self.cell_count == 0
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Number of distinct (packed) cell keys, i.e. number of hash map
    /// entries.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of elements stored in the grid.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of recycled cells ready for reuse.
    pub fn pooled_cells(&self) -> usize {
        self.pool.len()
    }

    pub fn log_debug_information(&self) {
        let largest_bucket = self.buckets.values().map(Vec::len).max().unwrap_or(0);
        debug!(
            "Spatial hash grid {{ \"Cells\": {}, \"Buckets\": {}, \"LargestBucket\": {}, \
             \"Nodes\": {}, \"PooledCells\": {}, \"Capacity\": {} }}",
            self.cell_count,
            self.buckets.len(),
            largest_bucket,
            self.nodes.len(),
            self.pool.len(),
            self.buckets.capacity(),
        );
    }

    fn lookup_cells<'a>(
        &'a self,
        cells: impl IntoIterator<Item = IVec3>,
        out: &mut Vec<CellRef<'a, T>>,
    ) {
        out.extend(
            cells
                .into_iter()
                .filter_map(|coords| self.find_cell(coords))
                .map(|cell| CellRef::new(cell, &self.nodes)),
        );
    }

    /// Returns true if the entry was issued by this grid and its node is
    /// still stored. Violations are reported.
    fn validate(&self, entry: &Entry) -> bool {
        if entry.grid() != self.id {
            report(InvariantViolation::ForeignEntry);
            false
        } else if !self.nodes.contains(entry.node()) {
            report(InvariantViolation::StaleNode);
            false
        } else {
            true
        }
    }

    fn find_cell(&self, coords: IVec3) -> Option<&Cell> {
        self.buckets
            .get(&bucket_key(coords))
            .and_then(|bucket| bucket.iter().find(|cell| cell.coords() == coords))
    }

    fn insert_to_cell(&mut self, node: NodeId, coords: IVec3) {
        let bucket = self.buckets.entry(bucket_key(coords)).or_default();
        match bucket.iter_mut().find(|cell| cell.coords() == coords) {
            Some(cell) => cell.push(node),
            None => {
                let mut cell = self.pool.acquire(coords);
                cell.push(node);
                bucket.push(cell);
                self.cell_count += 1;
            }
        }
    }

    fn remove_from_cell(&mut self, node: NodeId, coords: IVec3) -> bool {
        let key = bucket_key(coords);
        let Some(bucket) = self.buckets.get_mut(&key) else {
            report(InvariantViolation::CellMissing { coords });
            return false;
        };
        let Some(index) = bucket.iter().position(|cell| cell.coords() == coords) else {
            report(InvariantViolation::CellMissing { coords });
            return false;
        };

        let cell = &mut bucket[index];
        if !cell.remove(node) {
            report(InvariantViolation::NodeMissing { coords });
            return false;
        }

        if cell.is_empty() {
            let cell = bucket.swap_remove(index);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
            self.cell_count -= 1;
            self.pool.release(cell);
        }

        true
    }
}
