// The host expresses brightness as 0..=255 while the Lutron
// controller uses a percentage, 0.0..=100.0. These functions convert
// between the two. They don't clamp their arguments, so an
// out-of-range value produces an out-of-range result.
//
// The scales don't line up, so converting a Lutron level to the host
// and back doesn't always return the original level (50.0 becomes
// 127 which becomes 49.8...)

/// Converts a host brightness (0..=255) to a Lutron level
/// (0.0..=100.0).
pub fn to_lutron_level(level: f64) -> f64 {
    level * 100.0 / 255.0
}

/// Converts a Lutron level (0.0..=100.0) to a host brightness
/// (0..=255). Fractions are truncated toward zero.
pub fn to_hass_level(level: f64) -> i32 {
    (level * 255.0 / 100.0) as i32
}
