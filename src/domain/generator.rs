/// Procedural platform placement.
///
/// Each new platform sits `VERTICAL_SPACING` above the anchor it is given,
/// at a uniformly random integer x that keeps `HORIZONTAL_PADDING` clear
/// of both screen edges.
///
/// Boost and temporary variants are only produced when the matching chance
/// is configured above zero; by default every platform is a plain one.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::Platform;
use super::physics::{HORIZONTAL_PADDING, PLATFORM_W, VERTICAL_SPACING, VIEW_W};

const MIN_X: i32 = HORIZONTAL_PADDING;
const MAX_X: i32 = VIEW_W as i32 - PLATFORM_W as i32 - HORIZONTAL_PADDING;

/// Per-platform probabilities for the special variants, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnChances {
    pub boost: f64,
    pub temporary: f64,
}

pub struct PlatformGenerator {
    rng: Pcg32,
    chances: SpawnChances,
}

impl PlatformGenerator {
    pub fn new(seed: u64, chances: SpawnChances) -> Self {
        PlatformGenerator {
            rng: Pcg32::seed_from_u64(seed),
            chances,
        }
    }

    /// New platform one spacing above `last_y`.
    pub fn generate(&mut self, last_y: f32) -> Platform {
        let x = self.rng.random_range(MIN_X..=MAX_X);
        let mut platform = Platform::new(x as f32, last_y - VERTICAL_SPACING);

        // Skip the draw entirely at zero so seeded layouts don't depend on it
        if self.chances.boost > 0.0 {
            platform.boost = self.rng.random_bool(self.chances.boost);
        }
        if self.chances.temporary > 0.0 {
            platform.temporary = self.rng.random_bool(self.chances.temporary);
        }
        platform
    }
}
