#![allow(rustdoc::private_intra_doc_links)]
//! This crate implements a generic 3D spatial hash grid for fast geometric
//! lookup, for example collision broad-phase or ray picking.
//!
//! The core structure is an unbounded uniform grid of cells, only non-empty
//! cells are kept (in a hash map keyed by packed cell coordinates). Each
//! element is placed into every cell overlapped by its bounding box.
//! Insertion returns an [`Entry`] which is later used to move or remove the
//! element.
//!
//! ```
//! use glam::Vec3;
//! use parry3d::{bounding_volume::Aabb, math::Point};
//! use sg_grid::{aabb_corners, SpatialHashGrid};
//!
//! let mut grid = SpatialHashGrid::new(Vec3::splat(10.));
//! let aabb = Aabb::new(Point::new(1., 1., 1.), Point::new(12., 2., 2.));
//! let entry = grid.insert("ship", &aabb_corners(&aabb));
//!
//! let mut cells = Vec::new();
//! grid.lookup_cells_overlapping_line(Vec3::new(15., 1.5, -20.), Vec3::new(15., 1.5, 20.), &mut cells);
//! assert_eq!(cells.len(), 1);
//! assert_eq!(cells[0].elements().collect::<Vec<_>>(), vec![&"ship"]);
//!
//! assert!(grid.remove(entry));
//! assert!(grid.is_empty());
//! ```

mod cell;
mod coords;
mod entry;
mod error;
mod grid;
mod node;
mod range;
mod segment;
mod shape;

pub use self::{
    cell::CellRef,
    entry::{Entry, ScopedEntry},
    grid::{SpatialHashGrid, DEFAULT_ESTIMATED_CELLS},
    node::NodeId,
    range::{CellRange, CellRangeIter},
    shape::{aabb_corners, obb_corners},
};
