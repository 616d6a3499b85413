//! Tools for retrieving cells intersecting a line segment.

use glam::{IVec3, Vec3};

use crate::coords::{cell_coords, MAX_CELL};

/// Iterator over cells intersecting a line segment.
///
/// The cells are iterated by increasing distance between the segment start
/// and the intersection of the cell with the segment. Each cell is yielded at
/// most once. Cells are topologically closed, thus cells merely touched by the
/// segment (for example when the segment passes exactly through a cell
/// corner) might be included.
pub(crate) struct LineCells {
    cell: IVec3,
    last_cell: IVec3,
    step: IVec3,
    /// Segment parameter (0 at the start, 1 at the end) at which the next
    /// cell boundary is crossed along each axis.
    next_crossing: Vec3,
    /// Segment parameter difference between two consecutive cell boundaries
    /// along each axis.
    crossing_delta: Vec3,
    finished: bool,
}

impl LineCells {
    pub(crate) fn new(start: Vec3, stop: Vec3, cell_size: Vec3) -> Self {
        let cell = cell_coords(start, cell_size);
        let dir = stop - start;

        let mut step = IVec3::ZERO;
        let mut next_crossing = Vec3::INFINITY;
        let mut crossing_delta = Vec3::INFINITY;

        for axis in 0..3 {
            if dir[axis] == 0. {
                continue;
            }

            let boundary = if dir[axis] > 0. {
                step[axis] = 1;
                (cell[axis] as f32 + 1.) * cell_size[axis]
            } else {
                step[axis] = -1;
                cell[axis] as f32 * cell_size[axis]
            };

            next_crossing[axis] = (boundary - start[axis]) / dir[axis];
            crossing_delta[axis] = cell_size[axis] / dir[axis].abs();
        }

        Self {
            cell,
            last_cell: cell_coords(stop, cell_size),
            step,
            next_crossing,
            crossing_delta,
            finished: false,
        }
    }
}

impl Iterator for LineCells {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.finished {
            return None;
        }

        let current = self.cell;
        if current == self.last_cell {
            self.finished = true;
            return Some(current);
        }

        let axis = if self.next_crossing.x <= self.next_crossing.y
            && self.next_crossing.x <= self.next_crossing.z
        {
            0
        } else if self.next_crossing.y <= self.next_crossing.z {
            1
        } else {
            2
        };

        // Avoid rounding issues near the end of the segment.
        if self.next_crossing[axis] > 1. {
            self.finished = true;
        } else {
            match self.cell[axis].checked_add(self.step[axis]) {
                Some(next) if next <= MAX_CELL => {
                    self.cell[axis] = next;
                    self.next_crossing[axis] += self.crossing_delta[axis];
                }
                // Leaving the representable part of the grid.
                _ => self.finished = true,
            }
        }

        Some(current)
    }
}
