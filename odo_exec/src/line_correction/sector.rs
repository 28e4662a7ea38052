//! Classification of the heading into the four directions of travel

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::get_ang_dist_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Half width of each sector. The bounds themselves are not part of the sector.
///
/// Units: degrees
pub const SECTOR_HALF_WIDTH_DEG: f64 = 10.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of travel along one of the grid axes.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Sector {
    /// Heading near 0 degrees
    PosY,
    /// Heading near 90 degrees
    PosX,
    /// Heading near 180 degrees
    NegY,
    /// Heading near 270 degrees
    NegX,
}

/// A grid axis.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Axis {
    X,
    Y,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sector {
    pub const ALL: [Sector; 4] = [Sector::PosY, Sector::PosX, Sector::NegY, Sector::NegX];

    /// Find the sector containing the heading, or `None` if the heading is not close enough to
    /// a cardinal direction.
    ///
    /// The heading does not need to be wrapped into [0, 360).
    pub fn classify(heading_deg: f64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| get_ang_dist_deg(heading_deg, s.centre_deg()).abs() < SECTOR_HALF_WIDTH_DEG)
    }

    /// Heading at the centre of the sector.
    ///
    /// Units: degrees
    pub fn centre_deg(&self) -> f64 {
        match self {
            Sector::PosY => 0.0,
            Sector::PosX => 90.0,
            Sector::NegY => 180.0,
            Sector::NegX => 270.0,
        }
    }

    /// The axis travelled along in this sector.
    pub fn axis(&self) -> Axis {
        match self {
            Sector::PosY | Sector::NegY => Axis::Y,
            Sector::PosX | Sector::NegX => Axis::X,
        }
    }

    /// `true` if travelling towards positive coordinates.
    pub fn is_positive(&self) -> bool {
        matches!(self, Sector::PosY | Sector::PosX)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cardinal_headings() {
        assert_eq!(Sector::classify(0.0), Some(Sector::PosY));
        assert_eq!(Sector::classify(90.0), Some(Sector::PosX));
        assert_eq!(Sector::classify(180.0), Some(Sector::NegY));
        assert_eq!(Sector::classify(270.0), Some(Sector::NegX));

        // Exactly one sector matches each
        for &h in &[0.0, 90.0, 180.0, 270.0] {
            let n = Sector::ALL
                .iter()
                .filter(|s| get_ang_dist_deg(h, s.centre_deg()).abs() < SECTOR_HALF_WIDTH_DEG)
                .count();
            assert_eq!(n, 1);
        }
    }

    #[test]
    fn test_bounds_are_excluded() {
        for &h in &[10.0, 350.0, 190.0, 170.0, 100.0, 80.0, 280.0, 260.0] {
            assert_eq!(Sector::classify(h), None, "heading {}", h);
        }
    }

    #[test]
    fn test_inside_sectors() {
        assert_eq!(Sector::classify(5.0), Some(Sector::PosY));
        assert_eq!(Sector::classify(350.5), Some(Sector::PosY));
        assert_eq!(Sector::classify(9.999), Some(Sector::PosY));
        assert_eq!(Sector::classify(80.01), Some(Sector::PosX));
        assert_eq!(Sector::classify(189.0), Some(Sector::NegY));
        assert_eq!(Sector::classify(261.0), Some(Sector::NegX));
    }

    #[test]
    fn test_between_sectors() {
        for &h in &[45.0, 135.0, 225.0, 315.0, 20.0, 340.0] {
            assert_eq!(Sector::classify(h), None, "heading {}", h);
        }
        assert_eq!(Sector::classify(std::f64::NAN), None);
    }

    #[test]
    fn test_unwrapped_headings() {
        assert_eq!(Sector::classify(360.0), Some(Sector::PosY));
        assert_eq!(Sector::classify(-90.0), Some(Sector::NegX));
        assert_eq!(Sector::classify(455.0), Some(Sector::PosX));
    }

    #[test]
    fn test_axes() {
        assert_eq!(Sector::PosY.axis(), Axis::Y);
        assert_eq!(Sector::NegY.axis(), Axis::Y);
        assert_eq!(Sector::PosX.axis(), Axis::X);
        assert_eq!(Sector::NegX.axis(), Axis::X);
        assert!(Sector::PosX.is_positive());
        assert!(!Sector::NegY.is_positive());
    }
}
