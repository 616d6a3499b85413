use glam::{IVec3, Vec3};
use parry3d::bounding_volume::Aabb;

use crate::coords::cell_coords;

/// Box shaped, half-open range of grid cells.
///
/// The cells are iterated row-by-row and layer-by-layer, for example: (1, 1,
/// 1) -> (2, 1, 1) -> (1, 2, 1) -> (2, 2, 1) -> (1, 1, 2) -> ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    start: IVec3,
    end: IVec3,
}

impl CellRange {
    /// # Arguments
    ///
    /// * `start` - inclusive range start.
    ///
    /// * `end` - exclusive range end.
    pub fn new(start: IVec3, end: IVec3) -> Self {
        Self { start, end }
    }

    /// Creates minimum cell range covering a continuous box.
    ///
    /// Along each axis the range spans from `floor(min / size)` (inclusive) to
    /// `ceil(max / size)` (exclusive). Degenerate (flat or point) boxes and
    /// boxes whose maximum lies exactly on a cell boundary still cover at
    /// least one cell along every axis.
    pub fn from_bounds(min: Vec3, max: Vec3, cell_size: Vec3) -> Self {
        let start = cell_coords(min, cell_size);
        let end = (max / cell_size).ceil().as_ivec3();
        Self::new(start, end.max(start + IVec3::ONE))
    }

    /// Creates minimum cell range covering all 8 corners of an (oriented)
    /// bounding box.
    ///
    /// Cells are axis aligned, thus projection of the corners onto the grid
    /// axes is just a component-wise minimum and maximum.
    pub fn from_corners(corners: &[Vec3; 8], cell_size: Vec3) -> Self {
        let (min, max) = corners
            .iter()
            .fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |(min, max), &corner| {
                (min.min(corner), max.max(corner))
            });
        Self::from_bounds(min, max, cell_size)
    }

    /// Creates minimum cell range covering an axis aligned bounding box.
    pub fn from_aabb(aabb: &Aabb, cell_size: Vec3) -> Self {
        Self::from_bounds(aabb.mins.into(), aabb.maxs.into(), cell_size)
    }

    /// Inclusive start of the range.
    pub fn start(&self) -> IVec3 {
        self.start
    }

    /// Exclusive end of the range.
    pub fn end(&self) -> IVec3 {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.cmpge(self.end).any()
    }

    /// Number of cells in the range. It saturates at `usize::MAX`.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let size = |axis: usize| (self.end[axis] as i64 - self.start[axis] as i64) as usize;
        size(0).saturating_mul(size(1)).saturating_mul(size(2))
    }

    /// Returns true if the given cell is contained in the range.
    pub fn contains(&self, cell: IVec3) -> bool {
        !self.excludes(cell)
    }

    /// Returns true if the given cell is not contained in the range.
    pub fn excludes(&self, cell: IVec3) -> bool {
        self.start.cmpgt(cell).any() || self.end.cmple(cell).any()
    }

    /// Returns intersecting cell range. The result might be empty.
    pub fn intersection(&self, other: &CellRange) -> CellRange {
        Self::new(self.start.max(other.start), self.end.min(other.end))
    }

    pub fn iter(&self) -> CellRangeIter {
        CellRangeIter::new(*self)
    }
}

impl IntoIterator for CellRange {
    type Item = IVec3;
    type IntoIter = CellRangeIter;

    fn into_iter(self) -> CellRangeIter {
        CellRangeIter::new(self)
    }
}

/// Iterator over all cells of a [`CellRange`].
pub struct CellRangeIter {
    range: CellRange,
    next: IVec3,
    exhausted: bool,
}

impl CellRangeIter {
    fn new(range: CellRange) -> Self {
        Self {
            range,
            next: range.start,
            exhausted: range.is_empty(),
        }
    }
}

impl Iterator for CellRangeIter {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.exhausted {
            return None;
        }

        let current = self.next;
        let last = self.range.end - IVec3::ONE;
        if current.x < last.x {
            self.next.x += 1;
        } else if current.y < last.y {
            self.next.x = self.range.start.x;
            self.next.y += 1;
        } else if current.z < last.z {
            self.next.x = self.range.start.x;
            self.next.y = self.range.start.y;
            self.next.z += 1;
        } else {
            self.exhausted = true;
        }
        Some(current)
    }
}
