use ahash::AHashSet;
use glam::{IVec3, Vec3};
use ntest::timeout;
use parry3d::{bounding_volume::Aabb, math::Point};
use sg_grid::{CellRange, SpatialHashGrid};
use sg_test_utils::{box_corners, load_boxes, NumPoints};

/// Returns coordinates and sorted element lists of all non-empty cells within
/// a large region around the origin.
fn snapshot(grid: &SpatialHashGrid<u32>) -> Vec<(IVec3, Vec<u32>)> {
    let region = Aabb::new(Point::new(-400., -400., -400.), Point::new(400., 400., 400.));
    let mut cells = Vec::new();
    grid.lookup_cells_for_aabb(&region, &mut cells);

    let mut snapshot: Vec<(IVec3, Vec<u32>)> = cells
        .iter()
        .map(|cell| {
            let mut elements: Vec<u32> = cell.elements().copied().collect();
            elements.sort_unstable();
            (cell.coords(), elements)
        })
        .collect();
    snapshot.sort_unstable_by_key(|(coords, _)| coords.to_array());
    snapshot
}

#[test]
fn test_positive_range() {
    let mut grid = SpatialHashGrid::new(Vec3::splat(2.));
    let entry = grid.insert(
        1,
        &box_corners(Vec3::new(0.25, 0.25, 0.25), Vec3::new(3., 0.5, 0.5)),
    );

    let range = entry.cell_range();
    assert_eq!(range.start().x, 0);
    assert_eq!(range.end().x, 2);
    assert!(grid.cell(IVec3::new(0, 0, 0)).is_some());
    assert!(grid.cell(IVec3::new(1, 0, 0)).is_some());
    assert!(grid.cell(IVec3::new(2, 0, 0)).is_none());
    assert_eq!(grid.cell_count(), 2);

    assert!(grid.remove(entry));
}

#[test]
fn test_negative_range() {
    let mut grid = SpatialHashGrid::new(Vec3::splat(2.));
    let entry = grid.insert(
        1,
        &box_corners(Vec3::new(-3., 0.25, 0.25), Vec3::new(-0.5, 0.5, 0.5)),
    );

    let range = entry.cell_range();
    assert_eq!(range.start().x, -2);
    assert_eq!(range.end().x, 0);
    assert!(grid.cell(IVec3::new(-2, 0, 0)).is_some());
    assert!(grid.cell(IVec3::new(-1, 0, 0)).is_some());
    assert!(grid.cell(IVec3::new(0, 0, 0)).is_none());
    assert!(grid.cell(IVec3::new(-3, 0, 0)).is_none());

    assert!(grid.remove(entry));
}

#[test]
fn test_overlapping_removal() {
    let mut grid = SpatialHashGrid::new(Vec3::ONE);
    let a = grid.insert(1, &box_corners(Vec3::splat(0.1), Vec3::splat(1.9)));
    let b = grid.insert(2, &box_corners(Vec3::splat(1.1), Vec3::splat(2.9)));
    assert_eq!(grid.cell_count(), 15);
    assert_eq!(
        grid.cell(IVec3::ONE)
            .unwrap()
            .elements()
            .copied()
            .collect::<AHashSet<u32>>(),
        AHashSet::from_iter([1, 2])
    );

    assert!(grid.remove(a));
    let shared = grid.cell(IVec3::ONE).unwrap();
    assert_eq!(shared.elements().collect::<Vec<_>>(), vec![&2]);
    assert!(shared.contains(b.node()));
    assert!(grid.cell(IVec3::ZERO).is_none());
    assert_eq!(grid.cell_count(), 8);
    assert_eq!(grid.pooled_cells(), 7);

    assert!(grid.remove(b));
    assert!(grid.is_empty());
}

#[test]
#[timeout(10000)]
fn test_single_cell_multiplicity() {
    let mut grid = SpatialHashGrid::new(Vec3::splat(10.));
    let mut entries: Vec<_> = (0..1000u32)
        .map(|i| {
            let offset = (i % 7) as f32;
            let entry = grid.insert(
                i,
                &box_corners(Vec3::splat(1. + offset), Vec3::splat(2. + offset)),
            );
            (i, entry)
        })
        .collect();
    assert_eq!(grid.cell_count(), 1);
    assert_eq!(grid.cell(IVec3::ZERO).unwrap().len(), 1000);

    let mut rng = fastrand::Rng::with_seed(3);
    rng.shuffle(&mut entries);
    let (survivor, survivor_entry) = entries.pop().unwrap();

    for (removed, (_, entry)) in entries.into_iter().enumerate() {
        assert!(grid.remove(entry));
        let cell = grid.cell(IVec3::ZERO).unwrap();
        assert_eq!(cell.len(), 999 - removed);
    }

    let cell = grid.cell(IVec3::ZERO).unwrap();
    assert_eq!(cell.elements().collect::<Vec<_>>(), vec![&survivor]);
    assert!(cell.contains(survivor_entry.node()));
    assert_eq!(grid.pooled_cells(), 0);
    assert_eq!(grid.node_count(), 1);

    assert!(grid.remove(survivor_entry));
    assert!(grid.is_empty());
    assert_eq!(grid.pooled_cells(), 1);
}

#[test]
fn test_line_through_occupied_cells() {
    let mut grid = SpatialHashGrid::new(Vec3::ONE);
    let a = grid.insert(1, &box_corners(Vec3::splat(0.1), Vec3::splat(1.9)));
    let b = grid.insert(2, &box_corners(Vec3::splat(1.1), Vec3::splat(2.9)));

    let expected = AHashSet::from_iter([
        IVec3::new(0, 1, 1),
        IVec3::new(1, 1, 1),
        IVec3::new(2, 1, 1),
    ]);

    let mut cells = Vec::new();
    grid.lookup_cells_overlapping_line(
        Vec3::new(-5., 1.5, 1.5),
        Vec3::new(10., 1.5, 1.5),
        &mut cells,
    );
    let coords: Vec<IVec3> = cells.iter().map(|cell| cell.coords()).collect();
    assert_eq!(coords.len(), 3);
    assert_eq!(AHashSet::from_iter(coords.iter().copied()), expected);

    cells.clear();
    grid.lookup_cells_overlapping_line(
        Vec3::new(2.5, 1.6, 1.4),
        Vec3::new(0.5, 1.5, 1.5),
        &mut cells,
    );
    let coords: Vec<IVec3> = cells.iter().map(|cell| cell.coords()).collect();
    assert_eq!(
        coords,
        vec![IVec3::new(2, 1, 1), IVec3::new(1, 1, 1), IVec3::new(0, 1, 1)]
    );

    assert!(grid.remove(a));
    assert!(grid.remove(b));
}

#[test]
fn test_round_trip() {
    let mut grid = SpatialHashGrid::new(Vec3::new(10., 5., 20.));
    let boxes = load_boxes(&NumPoints::OneHundred, 200., 15.);
    let entries: Vec<_> = boxes
        .iter()
        .enumerate()
        .map(|(i, corners)| grid.insert(i as u32, corners))
        .collect();

    let before = snapshot(&grid);
    let cell_count = grid.cell_count();

    for (i, corners) in load_boxes(&NumPoints::OneThousand, 300., 25.)
        .iter()
        .take(50)
        .enumerate()
    {
        let entry = grid.insert(1000 + i as u32, corners);
        assert!(grid.remove(entry));
        assert_eq!(grid.cell_count(), cell_count);
    }
    assert_eq!(snapshot(&grid), before);

    for entry in entries {
        assert!(grid.remove(entry));
    }
    assert!(grid.is_empty());
    assert!(snapshot(&grid).is_empty());
}

#[test]
fn test_coverage() {
    let cell_size = Vec3::new(8., 4., 16.);
    let mut grid = SpatialHashGrid::new(cell_size);
    let boxes = load_boxes(&NumPoints::OneHundred, 100., 20.);
    let entries: Vec<_> = boxes
        .iter()
        .enumerate()
        .map(|(i, corners)| grid.insert(i as u32, corners))
        .collect();

    for (corners, entry) in boxes.iter().zip(entries.iter()) {
        let min = corners[0];
        let max = corners[7];
        let range = entry.cell_range();
        assert_eq!(range, CellRange::from_corners(corners, cell_size));

        // Every cell whose volume intersects the box holds the element.
        for coords in range {
            let cell_min = coords.as_vec3() * cell_size;
            let cell_max = cell_min + cell_size;
            assert!(cell_min.cmple(max + 1e-3).all() && cell_max.cmpge(min - 1e-3).all());
            assert!(grid.cell(coords).unwrap().contains(entry.node()));
        }

        // The shell of cells just outside of the range does not.
        let shell = CellRange::new(range.start() - IVec3::ONE, range.end() + IVec3::ONE);
        for coords in shell {
            if range.excludes(coords) {
                if let Some(cell) = grid.cell(coords) {
                    assert!(!cell.contains(entry.node()));
                }
            }
        }
    }

    for entry in entries {
        assert!(grid.remove(entry));
    }
}

#[test]
fn test_negative_coordinates_mirror() {
    let cell_size = Vec3::new(3., 7., 5.);
    for corners in load_boxes(&NumPoints::OneHundred, 50., 10.) {
        let range = CellRange::from_corners(&corners, cell_size);
        let mirrored = CellRange::from_corners(&corners.map(|corner| -corner), cell_size);
        assert_eq!(mirrored.start(), -range.end());
        assert_eq!(mirrored.end(), -range.start());
    }

    let mut grid = SpatialHashGrid::new(Vec3::splat(10.));
    let positive = grid.insert(1, &box_corners(Vec3::splat(4.), Vec3::splat(6.)));
    let negative = grid.insert(2, &box_corners(Vec3::splat(-6.), Vec3::splat(-4.)));
    assert_eq!(positive.cell_range().start(), IVec3::ZERO);
    assert_eq!(negative.cell_range().start(), IVec3::splat(-1));
    assert_eq!(
        grid.cell(IVec3::splat(-1)).unwrap().elements().collect::<Vec<_>>(),
        vec![&2]
    );
    assert!(grid.remove(positive));
    assert!(grid.remove(negative));
}

#[test]
fn test_pool_reuse() {
    let mut grid = SpatialHashGrid::new(Vec3::splat(10.));
    let first = grid.insert(1, &box_corners(Vec3::splat(-15.), Vec3::splat(-5.)));
    assert!(grid.remove(first));
    let pooled = grid.pooled_cells();
    assert_eq!(pooled, 8);

    let second = grid.insert(2, &box_corners(Vec3::splat(101.), Vec3::splat(102.)));
    assert_eq!(grid.pooled_cells(), pooled - 1);

    let cell = grid.cell(IVec3::splat(10)).unwrap();
    assert_eq!(cell.coords(), IVec3::splat(10));
    assert_eq!(cell.elements().collect::<Vec<_>>(), vec![&2]);
    assert!(grid.cell(IVec3::splat(-1)).is_none());
    assert!(grid.remove(second));
}

#[test]
#[timeout(20000)]
fn test_churn() {
    let mut grid = SpatialHashGrid::new(Vec3::splat(16.));
    let boxes = load_boxes(&NumPoints::OneThousand, 500., 12.);
    let mut entries: Vec<_> = boxes
        .iter()
        .enumerate()
        .map(|(i, corners)| grid.insert(i as u32, corners))
        .collect();

    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..20 {
        for (corners, entry) in boxes.iter().zip(entries.iter_mut()) {
            let offset = Vec3::new(rng.f32(), rng.f32(), rng.f32()) * 100. - 50.;
            let moved = corners.map(|corner| corner + offset);
            assert!(grid.update(entry, &moved));
            assert_eq!(entry.cell_range(), CellRange::from_corners(&moved, grid.cell_size()));
        }
    }

    for entry in entries.iter() {
        for coords in entry.cell_range() {
            assert!(grid.cell(coords).unwrap().contains(entry.node()));
        }
    }
    let mut nodes = Vec::new();
    grid.lookup_nodes_in_cells(&entries[0], true, &mut nodes);
    assert!(nodes.iter().all(|(node, _)| *node != entries[0].node()));

    for entry in entries {
        assert!(grid.remove(entry));
    }
    assert!(grid.is_empty());
    assert_eq!(grid.node_count(), 0);
}
