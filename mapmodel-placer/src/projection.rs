use std::f64::consts::{FRAC_PI_4, PI};

use glam::DVec3;
use mapmodel_common::GeoAnchor;

pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

pub const EARTH_CIRCUMFERENCE_METERS: f64 = 2.0 * PI * EARTH_RADIUS_METERS;

/// Anchors beyond this latitude clamp onto the edge of the square world.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// `x` grows eastward and `y` southward, both spanning `0.0..=1.0` across
/// the world; `meter_scale` is the length of one meter at the anchor's
/// latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub meter_scale: f64,
}

impl MercatorCoordinate {
    pub fn from_anchor(anchor: &GeoAnchor) -> Self {
        let latitude = anchor
            .latitude()
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
        let phi = latitude.to_radians();
        let meter_scale = 1.0 / (EARTH_CIRCUMFERENCE_METERS * phi.cos());

        Self {
            x: (180.0 + anchor.longitude()) / 360.0,
            y: (180.0 - (180.0 / PI) * (FRAC_PI_4 + phi / 2.0).tan().ln()) / 360.0,
            z: anchor.altitude() * meter_scale,
            meter_scale,
        }
    }

    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn project(longitude: f64, latitude: f64) -> MercatorCoordinate {
        let anchor = GeoAnchor::new(longitude, latitude).unwrap();
        MercatorCoordinate::from_anchor(&anchor)
    }

    #[test]
    fn null_island_sits_at_world_center() {
        let coord = project(0.0, 0.0);
        assert_eq!(coord.x, 0.5);
        assert_eq!(coord.y, 0.5);
        assert_eq!(coord.z, 0.0);
    }

    #[test]
    fn longitude_spans_unit_interval() {
        assert_eq!(project(-180.0, 0.0).x, 0.0);
        assert_eq!(project(180.0, 0.0).x, 1.0);
    }

    #[rstest]
    #[case(37.9679)]
    #[case(0.1)]
    #[case(85.0)]
    fn northern_latitudes_map_above_center(#[case] latitude: f64) {
        assert!(project(0.0, latitude).y < 0.5);
        assert!(project(0.0, -latitude).y > 0.5);
        assert_eq!(
            project(0.0, latitude).meter_scale,
            project(0.0, -latitude).meter_scale
        );
    }

    #[test]
    fn projection_is_deterministic() {
        let anchor = GeoAnchor::with_altitude(-122.5127, 37.9679, 12.5).unwrap();
        let first = MercatorCoordinate::from_anchor(&anchor);
        let second = MercatorCoordinate::from_anchor(&anchor);
        assert_eq!(first, second);
        assert!(first.x.is_finite() && first.y.is_finite() && first.z.is_finite());
    }

    #[test]
    fn meter_scale_doubles_at_sixty_degrees() {
        let equator = project(0.0, 0.0);
        let sixty = project(0.0, 60.0);
        assert_relative_eq!(
            sixty.meter_scale / equator.meter_scale,
            2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn meter_scale_is_inverse_circumference_at_equator() {
        let coord = project(0.0, 0.0);
        assert_eq!(coord.meter_scale, 1.0 / EARTH_CIRCUMFERENCE_METERS);
    }

    #[test]
    fn polar_latitudes_clamp_to_mercator_edge() {
        let north_pole = project(0.0, 90.0);
        let clamped = project(0.0, MAX_MERCATOR_LATITUDE);
        assert_eq!(north_pole, clamped);

        let south_pole = project(0.0, -90.0);
        assert!(south_pole.y.is_finite());
        assert_relative_eq!(south_pole.y, 1.0 - north_pole.y, epsilon = 1e-12);
    }

    #[test]
    fn altitude_converts_through_meter_scale() {
        let anchor = GeoAnchor::with_altitude(0.0, 45.0, 100.0).unwrap();
        let coord = MercatorCoordinate::from_anchor(&anchor);
        assert_eq!(coord.z, 100.0 * coord.meter_scale);
        assert!(coord.z > 0.0);
    }
}
