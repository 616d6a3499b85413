//! Flat table of grid elements. Cells refer to elements only via [`NodeId`],
//! a single element spanning many cells is stored exactly once.

/// Identity of an element inserted to a grid.
///
/// Two distinct insertions always produce distinct node IDs, even when the
/// inserted elements compare equal. Slots are reused after removal, the
/// generation makes IDs of removed nodes stale instead of aliasing newer
/// nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

pub(crate) struct NodeTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> NodeTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, element: T) -> NodeId {
        self.len += 1;

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                debug_assert!(slot.element.is_none());
                slot.element = Some(element);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index =
                    u32::try_from(self.slots.len()).expect("Too many elements in a single grid.");
                self.slots.push(Slot {
                    generation: 0,
                    element: Some(element),
                });
                NodeId::new(index, 0)
            }
        }
    }

    /// Removes a node and returns its element. Returns `None` if the node is
    /// not (or no longer) stored in the table.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        let element = slot.element.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(element)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

struct Slot<T> {
    generation: u32,
    element: Option<T>,
}
