//! This module contains configuration object which can be (de)serialized from
//! a configuration file. It does not contain final configuration object which
//! must be build and validated from the objects here.

use serde::Deserialize;

#[derive(Deserialize, Default)]
pub(super) struct Configuration {
    pub(super) grid: Option<Grid>,
    pub(super) demo: Option<Demo>,
}

#[derive(Deserialize, Default)]
pub(super) struct Grid {
    pub(super) cell_size: Option<[f32; 3]>,
    pub(super) estimated_cells: Option<usize>,
}

#[derive(Deserialize, Default)]
pub(super) struct Demo {
    pub(super) objects: Option<usize>,
    pub(super) ticks: Option<u32>,
    pub(super) world_extent: Option<f32>,
    pub(super) object_half_extent: Option<f32>,
    pub(super) max_speed: Option<f32>,
    pub(super) ray_length: Option<f32>,
    pub(super) seed: Option<u64>,
}
