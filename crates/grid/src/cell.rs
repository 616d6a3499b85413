use glam::IVec3;

use crate::node::{NodeId, NodeTable};

/// A single grid cell: a bucket of nodes whose bounding boxes overlap the
/// cell.
///
/// Cells reachable from a grid are never empty.
pub(crate) struct Cell {
    coords: IVec3,
    nodes: Vec<NodeId>,
}

impl Cell {
    fn new(coords: IVec3) -> Self {
        Self {
            coords,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn coords(&self) -> IVec3 {
        self.coords
    }

    pub(crate) fn nodes(&self) -> &[NodeId] {
        self.nodes.as_slice()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    /// Removes a node from the cell. Returns false if the node is not present
    /// in the cell.
    pub(crate) fn remove(&mut self, node: NodeId) -> bool {
        match self.nodes.iter().position(|&candidate| candidate == node) {
            Some(index) => {
                self.nodes.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

/// Free-list of cells. It keeps the node buckets (and their allocations) of
/// recycled cells for reuse.
pub(crate) struct CellPool {
    free: Vec<Cell>,
}

impl CellPool {
    pub(crate) fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Returns an empty cell placed at `coords`, either recycled or newly
    /// created.
    pub(crate) fn acquire(&mut self, coords: IVec3) -> Cell {
        match self.free.pop() {
            Some(mut cell) => {
                cell.coords = coords;
                cell.nodes.clear();
                cell
            }
            None => Cell::new(coords),
        }
    }

    pub(crate) fn release(&mut self, mut cell: Cell) {
        debug_assert!(cell.is_empty(), "Released a non-empty cell.");
        cell.nodes.clear();
        self.free.push(cell);
    }

    pub(crate) fn len(&self) -> usize {
        self.free.len()
    }
}

/// Read-only view of a non-empty grid cell.
pub struct CellRef<'a, T> {
    cell: &'a Cell,
    nodes: &'a NodeTable<T>,
}

impl<'a, T> CellRef<'a, T> {
    pub(crate) fn new(cell: &'a Cell, nodes: &'a NodeTable<T>) -> Self {
        Self { cell, nodes }
    }

    /// Integer coordinates of the cell.
    pub fn coords(&self) -> IVec3 {
        self.cell.coords()
    }

    /// Number of nodes in the cell. It is always at least one.
    pub fn len(&self) -> usize {
        self.cell.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.cell.nodes().contains(&node)
    }

    /// Returns an iterator over IDs of all nodes in the cell.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.cell.nodes().iter().copied()
    }

    /// Returns an iterator over all nodes (ID and element) in the cell.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &'a T)> + 'a {
        let nodes = self.nodes;
        self.cell
            .nodes()
            .iter()
            .filter_map(move |&id| nodes.get(id).map(|element| (id, element)))
    }

    /// Returns an iterator over all elements in the cell.
    pub fn elements(&self) -> impl Iterator<Item = &'a T> + 'a {
        self.nodes().map(|(_, element)| element)
    }
}

impl<'a, T> Clone for CellRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for CellRef<'a, T> {}
