/// Difficulty rules: platform speed as a pure function of score.
///
/// ## Thresholds
///
/// | score       | speed |
/// |-------------|-------|
/// | 0..=10      | 4     |
/// | 11..=20     | 5     |
/// | 21..        | 6     |
///
/// Re-evaluating with the same score always yields the same speed, so the
/// caller can run this every frame without tracking history.

pub const BASE_PLATFORM_SPEED: f32 = 4.0;

/// (score must exceed, resulting speed), highest threshold first.
const SPEED_STEPS: [(u32, f32); 2] = [(20, 6.0), (10, 5.0)];

pub fn platform_speed(score: u32) -> f32 {
    SPEED_STEPS
        .iter()
        .find(|&&(threshold, _)| score > threshold)
        .map(|&(_, speed)| speed)
        .unwrap_or(BASE_PLATFORM_SPEED)
}
