//! Simulation of a swarm of boxes flying within a bounded cubic world. All
//! boxes are kept in a spatial hash grid which is used for collision
//! broad-phase and ray picking.

use ahash::AHashSet;
use fastrand::Rng;
use glam::Vec3;
use parry3d::{
    bounding_volume::Aabb,
    math::{Isometry, Point, Vector},
};
use sg_conf::{DemoConf, GridConf};
use sg_grid::{obb_corners, Entry, SpatialHashGrid};
use tracing::{debug, trace, warn};

/// Maximum rotation (in radians) of an object around the y axis during a
/// single step.
const MAX_SPIN: f32 = 0.1;

struct Object {
    local_aabb: Aabb,
    center: Vec3,
    heading: f32,
    velocity: Vec3,
    spin: f32,
    entry: Entry,
}

impl Object {
    fn corners(&self) -> [Vec3; 8] {
        obb_corners(&self.local_aabb, &self.position())
    }

    fn position(&self) -> Isometry<f32> {
        Isometry::new(
            Vector::new(self.center.x, self.center.y, self.center.z),
            Vector::new(0., self.heading, 0.),
        )
    }
}

/// Statistics gathered during a single simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StepStats {
    /// Number of objects whose cell range changed during the step.
    pub(crate) relocated: usize,
    /// Number of distinct object pairs sharing at least one cell.
    pub(crate) candidate_pairs: usize,
    /// Number of non-empty cells intersected by the probe ray.
    pub(crate) ray_cells: usize,
    /// Number of distinct objects in cells intersected by the probe ray.
    pub(crate) ray_objects: usize,
}

pub(crate) struct Swarm {
    conf: DemoConf,
    rng: Rng,
    grid: SpatialHashGrid<usize>,
    objects: Vec<Object>,
}

impl Swarm {
    /// Spawns all objects at pseudo random positions and inserts them to a
    /// new grid.
    pub(crate) fn new(grid_conf: &GridConf, conf: &DemoConf) -> Self {
        let mut rng = Rng::with_seed(conf.seed());
        let mut grid = SpatialHashGrid::from_conf(grid_conf);

        let spawn_extent = conf.world_extent() - conf.object_half_extent();
        let objects = (0..conf.objects())
            .map(|index| {
                let half_extent = random_unit(&mut rng) * conf.object_half_extent();
                let local_aabb = Aabb::new(
                    Point::new(-half_extent.x, -half_extent.y, -half_extent.z),
                    Point::new(half_extent.x, half_extent.y, half_extent.z),
                );
                let center = (random_unit(&mut rng) * 2. - 1.) * spawn_extent;
                let heading = rng.f32() * std::f32::consts::TAU;
                let position = Isometry::new(
                    Vector::new(center.x, center.y, center.z),
                    Vector::new(0., heading, 0.),
                );
                let entry = grid.insert(index, &obb_corners(&local_aabb, &position));

                Object {
                    local_aabb,
                    center,
                    heading,
                    velocity: (random_unit(&mut rng) * 2. - 1.) * conf.max_speed(),
                    spin: (rng.f32() * 2. - 1.) * MAX_SPIN,
                    entry,
                }
            })
            .collect();

        debug!("Spawned {} objects.", conf.objects());
        Self {
            conf: conf.clone(),
            rng,
            grid,
            objects,
        }
    }

    pub(crate) fn grid(&self) -> &SpatialHashGrid<usize> {
        &self.grid
    }

    /// Moves all objects, updates the grid and runs a broad-phase and a ray
    /// query.
    pub(crate) fn step(&mut self) -> StepStats {
        let mut stats = StepStats {
            relocated: self.advance(),
            ..Default::default()
        };
        stats.candidate_pairs = self.candidate_pairs();
        (stats.ray_cells, stats.ray_objects) = self.cast_probe();
        stats
    }

    /// Removes all objects from the grid. Returns true if the grid ended up
    /// empty and consistent.
    pub(crate) fn despawn(mut self) -> bool {
        let mut consistent = true;
        for object in self.objects.drain(..) {
            consistent &= self.grid.remove(object.entry);
        }
        consistent && self.grid.is_empty()
    }

    fn advance(&mut self) -> usize {
        let limit = self.conf.world_extent() - self.conf.object_half_extent();

        let mut relocated = 0;
        for object in self.objects.iter_mut() {
            object.center += object.velocity;
            for axis in 0..3 {
                if object.center[axis].abs() > limit {
                    object.center[axis] = object.center[axis].clamp(-limit, limit);
                    object.velocity[axis] = -object.velocity[axis];
                }
            }
            object.heading += object.spin;

            let old_range = object.entry.cell_range();
            let corners = object.corners();
            if !self.grid.update(&mut object.entry, &corners) {
                warn!("Object {:?} was not fully moved.", object.entry.node());
            }
            if object.entry.cell_range() != old_range {
                relocated += 1;
            }
        }

        trace!("{relocated} objects changed their cells.");
        relocated
    }

    fn candidate_pairs(&self) -> usize {
        let mut neighbours = Vec::new();
        let mut pairs = 0;
        for (index, object) in self.objects.iter().enumerate() {
            neighbours.clear();
            self.grid
                .lookup_nodes_in_cells(&object.entry, true, &mut neighbours);
            // Each pair is counted only from its lower index.
            pairs += neighbours
                .iter()
                .filter(|(_, other)| **other > index)
                .count();
        }
        pairs
    }

    fn cast_probe(&mut self) -> (usize, usize) {
        let extent = self.conf.world_extent();
        let start = (random_unit(&mut self.rng) * 2. - 1.) * extent;
        let dir = random_unit(&mut self.rng) * 2. - 1.;
        let dir = if dir.length() < 0.0001 {
            Vec3::X
        } else {
            dir.normalize()
        };
        let end = start + dir * self.conf.ray_length();

        let mut cells = Vec::new();
        self.grid.lookup_cells_overlapping_line(start, end, &mut cells);
        let objects: AHashSet<usize> = cells
            .iter()
            .flat_map(|cell| cell.elements().copied())
            .collect();
        (cells.len(), objects.len())
    }
}

fn random_unit(rng: &mut Rng) -> Vec3 {
    Vec3::new(rng.f32(), rng.f32(), rng.f32())
}
