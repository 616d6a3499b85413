use fastrand::Rng;
use glam::Vec3;

/// An enum to allow for safe selection of the number of generated items.
#[derive(Copy, Clone, Debug)]
pub enum NumPoints {
    OneHundred,
    OneThousand,
    TenThousand,
    OneHundredThousand,
}

impl TryFrom<u32> for NumPoints {
    type Error = &'static str;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(Self::OneHundred),
            1000 => Ok(Self::OneThousand),
            10_000 => Ok(Self::TenThousand),
            100_000 => Ok(Self::OneHundredThousand),
            _ => Err("Invalid number of points"),
        }
    }
}

impl From<&NumPoints> for usize {
    fn from(value: &NumPoints) -> Self {
        match value {
            NumPoints::OneHundred => 100,
            NumPoints::OneThousand => 1000,
            NumPoints::TenThousand => 10_000,
            NumPoints::OneHundredThousand => 100_000,
        }
    }
}

impl From<NumPoints> for usize {
    fn from(value: NumPoints) -> Self {
        Self::from(&value)
    }
}

/// Load deterministic points for testing.
///
/// # Arguments
/// * `number` - the selected number of points from the [NumPoints] enum.
/// * `max_value` - the max and min value for the returned point, the numbers returned will be
/// between -max_value and +max_value.
///
/// # Returns
/// A list of Vec3 points with all coordinates between -max_value and +max_value. This is
/// guaranteed to be deterministic across calls with the same input.
pub fn load_points(number: &NumPoints, max_value: f32) -> Vec<Vec3> {
    let number: usize = number.into();
    let mut rng = Rng::with_seed(number as u64);
    (0..number)
        .map(|_| random_point(&mut rng, max_value))
        .collect()
}

/// Load deterministic axis aligned boxes for testing.
///
/// # Arguments
/// * `number` - the selected number of boxes from the [NumPoints] enum.
/// * `max_value` - box centers have all coordinates between -max_value and +max_value.
/// * `max_half_extent` - maximum half size of a box along any axis.
///
/// # Returns
/// A list of 8 box corners per box, see [box_corners]. This is guaranteed to be deterministic
/// across calls with the same input.
pub fn load_boxes(number: &NumPoints, max_value: f32, max_half_extent: f32) -> Vec<[Vec3; 8]> {
    let count: usize = number.into();
    let mut rng = Rng::with_seed(!(count as u64));
    load_points(number, max_value)
        .into_iter()
        .map(|center| {
            let half_extent =
                Vec3::new(rng.f32(), rng.f32(), rng.f32()) * max_half_extent;
            box_corners(center - half_extent, center + half_extent)
        })
        .collect()
}

/// Returns all 8 corners of an axis aligned box.
pub fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ]
}

fn random_point(rng: &mut Rng, max_value: f32) -> Vec3 {
    let unit = Vec3::new(rng.f32(), rng.f32(), rng.f32());
    max_value * 2. * (unit - 0.5)
}
