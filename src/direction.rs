//! Coarse bearing buckets derived from a vehicle's compass heading.

use serde::Serialize;

/// Two-way split used for route statistics: north and east travel share one
/// bucket, south and west share the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bearing {
    NorthEast,
    SouthWest,
}

/// Classifies an upstream heading string.
///
/// | Normalized heading | Bucket      |
/// |--------------------|-------------|
/// | 316..=359, 0..=135 | `NorthEast` |
/// | 136..=315          | `SouthWest` |
///
/// The heading is normalized into `0..360` first, so negative and
/// over-range values wrap. A heading that does not parse as an integer
/// falls into `SouthWest` rather than failing.
pub fn classify(heading: &str) -> Bearing {
    let Ok(degrees) = heading.parse::<i64>() else {
        return Bearing::SouthWest;
    };
    match degrees.rem_euclid(360) {
        0..=135 | 316..=359 => Bearing::NorthEast,
        _ => Bearing::SouthWest,
    }
}
