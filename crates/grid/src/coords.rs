//! Conversions between world-space positions, integer cell coordinates and
//! hash map bucket keys.

use glam::{IVec3, Vec3};

/// Largest cell coordinate along any axis. It is one less than `i32::MAX` so
/// that the exclusive end of a cell range is always representable.
pub(crate) const MAX_CELL: i32 = i32::MAX - 1;

/// Returns coordinates of the cell containing a world-space point.
///
/// Points lying exactly on a cell boundary belong to the cell with the larger
/// index. Coordinates outside of `i32::MIN..=MAX_CELL` saturate.
pub(crate) fn cell_coords(point: Vec3, cell_size: Vec3) -> IVec3 {
    (point / cell_size)
        .floor()
        .as_ivec3()
        .min(IVec3::splat(MAX_CELL))
}

/// Packs cell coordinates into a single 64-bit bucket key.
///
/// `x` occupies the high half, `y` the low half and `z` is XORed in shifted by
/// 16 bits (the shift is done in 32 bits, thus the top 16 bits of `z` are
/// lost). The packing is not injective, distinct coordinates may end up in the
/// same bucket and must be told apart by their full coordinates.
pub(crate) fn bucket_key(coords: IVec3) -> u64 {
    let x = u64::from(coords.x as u32);
    let y = u64::from(coords.y as u32);
    let z = (coords.z as u32) << 16;
    ((x << 32) | y) ^ u64::from(z)
}
