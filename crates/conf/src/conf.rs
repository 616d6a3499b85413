//! This module implements final (i.e. parsed and validated) configuration
//! objects and their building from persistent configuration.

use anyhow::{ensure, Context, Error, Result};
use glam::Vec3;

use crate::persisted;

/// Configuration of a spatial hash grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConf {
    cell_size: Vec3,
    estimated_cells: usize,
}

impl GridConf {
    /// Creates a new validated grid configuration.
    ///
    /// # Arguments
    ///
    /// * `cell_size` - size of every cell along all three axes. All
    ///   components must be finite and positive.
    ///
    /// * `estimated_cells` - expected number of simultaneously occupied
    ///   cells. It is used to pre-allocate internal storage.
    pub fn new(cell_size: Vec3, estimated_cells: usize) -> Result<Self> {
        ensure!(
            cell_size.is_finite(),
            "`cell_size` must be finite, got {cell_size}."
        );
        ensure!(
            cell_size.cmpgt(Vec3::ZERO).all(),
            "`cell_size` must be positive along all axes, got {cell_size}."
        );
        ensure!(estimated_cells > 0, "`estimated_cells` must be positive.");

        Ok(Self {
            cell_size,
            estimated_cells,
        })
    }

    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    pub fn estimated_cells(&self) -> usize {
        self.estimated_cells
    }
}

impl Default for GridConf {
    fn default() -> Self {
        Self {
            cell_size: Vec3::splat(10.),
            estimated_cells: 10_000,
        }
    }
}

impl TryFrom<persisted::Grid> for GridConf {
    type Error = Error;

    fn try_from(persisted: persisted::Grid) -> Result<Self> {
        let defaults = Self::default();
        Self::new(
            persisted
                .cell_size
                .map(Vec3::from)
                .unwrap_or(defaults.cell_size),
            persisted
                .estimated_cells
                .unwrap_or(defaults.estimated_cells),
        )
    }
}

/// Configuration of the swarm simulation driving the grid in the demo
/// binary.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConf {
    objects: usize,
    ticks: u32,
    world_extent: f32,
    object_half_extent: f32,
    max_speed: f32,
    ray_length: f32,
    seed: u64,
}

impl DemoConf {
    /// Number of simulated objects.
    pub fn objects(&self) -> usize {
        self.objects
    }

    /// Number of simulation steps.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Objects are spawned and kept within a cube with half size equal to
    /// this value, centered at the origin.
    pub fn world_extent(&self) -> f32 {
        self.world_extent
    }

    /// Maximum half size of object bounding boxes along any axis.
    pub fn object_half_extent(&self) -> f32 {
        self.object_half_extent
    }

    /// Maximum distance travelled by an object during a single step.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Length of line segments used for ray queries.
    pub fn ray_length(&self) -> f32 {
        self.ray_length
    }

    /// Seed of the pseudo random number generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for DemoConf {
    fn default() -> Self {
        Self {
            objects: 1000,
            ticks: 100,
            world_extent: 500.,
            object_half_extent: 4.,
            max_speed: 3.,
            ray_length: 200.,
            seed: 42,
        }
    }
}

impl TryFrom<persisted::Demo> for DemoConf {
    type Error = Error;

    fn try_from(persisted: persisted::Demo) -> Result<Self> {
        let defaults = Self::default();
        let conf = Self {
            objects: persisted.objects.unwrap_or(defaults.objects),
            ticks: persisted.ticks.unwrap_or(defaults.ticks),
            world_extent: persisted.world_extent.unwrap_or(defaults.world_extent),
            object_half_extent: persisted
                .object_half_extent
                .unwrap_or(defaults.object_half_extent),
            max_speed: persisted.max_speed.unwrap_or(defaults.max_speed),
            ray_length: persisted.ray_length.unwrap_or(defaults.ray_length),
            seed: persisted.seed.unwrap_or(defaults.seed),
        };

        ensure!(
            conf.world_extent.is_finite() && conf.world_extent > 0.,
            "`world_extent` must be finite and positive, got {}.",
            conf.world_extent
        );
        ensure!(
            conf.object_half_extent.is_finite() && conf.object_half_extent >= 0.,
            "`object_half_extent` must be finite and non-negative, got {}.",
            conf.object_half_extent
        );
        ensure!(
            conf.object_half_extent < conf.world_extent,
            "`object_half_extent` must be smaller than `world_extent`."
        );
        ensure!(
            conf.max_speed.is_finite() && conf.max_speed >= 0.,
            "`max_speed` must be finite and non-negative, got {}.",
            conf.max_speed
        );
        ensure!(
            conf.ray_length.is_finite() && conf.ray_length > 0.,
            "`ray_length` must be finite and positive, got {}.",
            conf.ray_length
        );

        Ok(conf)
    }
}

/// Complete validated configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    grid: GridConf,
    demo: DemoConf,
}

impl Configuration {
    pub fn grid(&self) -> &GridConf {
        &self.grid
    }

    pub fn demo(&self) -> &DemoConf {
        &self.demo
    }
}

impl TryFrom<persisted::Configuration> for Configuration {
    type Error = Error;

    fn try_from(persisted: persisted::Configuration) -> Result<Self> {
        Ok(Self {
            grid: GridConf::try_from(persisted.grid.unwrap_or_default())
                .context("Invalid `grid` configuration")?,
            demo: DemoConf::try_from(persisted.demo.unwrap_or_default())
                .context("Invalid `demo` configuration")?,
        })
    }
}
