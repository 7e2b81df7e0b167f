use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use strum::{Display, EnumString};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinate {
    #[error("longitude {0} degrees is outside -180..=180")]
    Longitude(f64),
    #[error("latitude {0} degrees is outside -90..=90")]
    Latitude(f64),
    #[error("altitude {0} is not a finite number of meters")]
    Altitude(f64),
}

/// Construction is the only validation point; a held anchor can always be
/// projected without further range checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoAnchor {
    longitude: f64,
    latitude: f64,
    altitude: f64,
}

impl GeoAnchor {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, InvalidCoordinate> {
        Self::with_altitude(longitude, latitude, 0.0)
    }

    pub fn with_altitude(
        longitude: f64,
        latitude: f64,
        altitude: f64,
    ) -> Result<Self, InvalidCoordinate> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate::Longitude(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate::Latitude(latitude));
        }
        if !altitude.is_finite() {
            return Err(InvalidCoordinate::Altitude(altitude));
        }
        Ok(Self {
            longitude,
            latitude,
            altitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

impl fmt::Display for GeoAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}m)",
            self.longitude, self.latitude, self.altitude
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render space is y-down, so z-up geometry needs a quarter-turn around x
/// to stand upright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
pub enum UpAxis {
    #[default]
    #[strum(serialize = "z-up")]
    ZUp,
    #[strum(serialize = "y-up")]
    YUp,
}

impl UpAxis {
    pub fn pitch_correction(&self) -> f64 {
        match self {
            UpAxis::ZUp => FRAC_PI_2,
            UpAxis::YUp => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDescriptor {
    pub id: AssetId,
    #[serde(deserialize_with = "anchor_from_coords")]
    pub coords: GeoAnchor,
    pub url: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_scale_meters")]
    pub scale_meters: f64,
    #[serde(default, deserialize_with = "up_axis_from_str")]
    pub up_axis: UpAxis,
    /// Extra rotation in degrees, applied in x, y, z order.
    #[serde(default)]
    pub rotation_deg: [f64; 3],
}

impl ModelDescriptor {
    pub fn new(id: impl Into<AssetId>, coords: GeoAnchor, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coords,
            url: url.into(),
            visible: default_visible(),
            scale_meters: default_scale_meters(),
            up_axis: UpAxis::default(),
            rotation_deg: [0.0; 3],
        }
    }

    /// Up-axis correction folded into the x component.
    pub fn rotation_radians(&self) -> [f64; 3] {
        let [x, y, z] = self.rotation_deg;
        [
            self.up_axis.pitch_correction() + x.to_radians(),
            y.to_radians(),
            z.to_radians(),
        ]
    }
}

fn default_visible() -> bool {
    true
}

fn default_scale_meters() -> f64 {
    1.0
}

fn anchor_from_coords<'de, D>(deserializer: D) -> Result<GeoAnchor, D::Error>
where
    D: Deserializer<'de>,
{
    let parts = Vec::<f64>::deserialize(deserializer)?;
    let anchor = match parts.as_slice() {
        &[longitude, latitude] => GeoAnchor::new(longitude, latitude),
        &[longitude, latitude, altitude] => {
            GeoAnchor::with_altitude(longitude, latitude, altitude)
        }
        _ => {
            return Err(D::Error::custom(
                "coords must be [longitude, latitude] or [longitude, latitude, altitude]",
            ));
        }
    };
    anchor.map_err(D::Error::custom)
}

fn up_axis_from_str<'de, D>(deserializer: D) -> Result<UpAxis, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    UpAxis::from_str(s.as_str()).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use rstest::rstest;

    use super::*;

    #[test]
    fn deserialize_catalog_entry() {
        let descriptor: ModelDescriptor = serde_json::from_str(
            r#"{
                "id": "pond-model",
                "coords": [-122.51465, 37.9669],
                "url": "assets/models/pond_pack.glb",
                "visible": true
            }"#,
        )
        .unwrap();

        assert_eq!(descriptor.id, AssetId::from("pond-model"));
        assert_eq!(descriptor.coords.longitude(), -122.51465);
        assert_eq!(descriptor.coords.latitude(), 37.9669);
        assert_eq!(descriptor.coords.altitude(), 0.0);
        assert!(descriptor.visible);
        assert_eq!(descriptor.scale_meters, 1.0);
        assert_eq!(descriptor.up_axis, UpAxis::ZUp);
        assert_eq!(descriptor.rotation_deg, [0.0; 3]);
    }

    #[test]
    fn deserialize_entry_with_all_fields() {
        let descriptor: ModelDescriptor = serde_json::from_str(
            r#"{
                "id": "bench-model",
                "coords": [-122.5151, 37.96765, 2.5],
                "url": "https://models.example/bench.glb",
                "visible": false,
                "scale_meters": 0.5,
                "up_axis": "y-up",
                "rotation_deg": [0.0, 90.0, 0.0]
            }"#,
        )
        .unwrap();

        assert_eq!(descriptor.coords.altitude(), 2.5);
        assert!(!descriptor.visible);
        assert_eq!(descriptor.scale_meters, 0.5);
        assert_eq!(descriptor.up_axis, UpAxis::YUp);
        assert_eq!(descriptor.rotation_deg, [0.0, 90.0, 0.0]);
    }

    #[test]
    fn deserialize_rejects_out_of_range_coords() {
        let result = serde_json::from_str::<ModelDescriptor>(
            r#"{"id": "x", "coords": [-122.5, 91.0], "url": "x.glb"}"#,
        );
        assert!(result.is_err());

        let result = serde_json::from_str::<ModelDescriptor>(
            r#"{"id": "x", "coords": [-122.5], "url": "x.glb"}"#,
        );
        assert!(result.is_err());
    }

    #[rstest]
    #[case(180.1, 0.0)]
    #[case(-181.0, 0.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, 90.5)]
    #[case(0.0, -90.5)]
    #[case(0.0, f64::NAN)]
    fn anchor_rejects_out_of_range(#[case] longitude: f64, #[case] latitude: f64) {
        assert!(GeoAnchor::new(longitude, latitude).is_err());
    }

    #[rstest]
    #[case(-180.0, -90.0)]
    #[case(180.0, 90.0)]
    #[case(0.0, 0.0)]
    #[case(-122.514522, 37.967155)]
    fn anchor_accepts_boundary_values(#[case] longitude: f64, #[case] latitude: f64) {
        assert!(GeoAnchor::new(longitude, latitude).is_ok());
    }

    #[test]
    fn anchor_rejects_non_finite_altitude() {
        assert_eq!(
            GeoAnchor::with_altitude(0.0, 0.0, f64::INFINITY),
            Err(InvalidCoordinate::Altitude(f64::INFINITY))
        );
    }

    #[test]
    fn rotation_includes_up_axis_correction() {
        let anchor = GeoAnchor::new(0.0, 0.0).unwrap();
        let mut descriptor = ModelDescriptor::new("m", anchor, "m.glb");
        descriptor.rotation_deg = [0.0, 180.0, 0.0];

        let [x, y, z] = descriptor.rotation_radians();
        assert_eq!(x, FRAC_PI_2);
        assert_eq!(y, std::f64::consts::PI);
        assert_eq!(z, 0.0);

        descriptor.up_axis = UpAxis::YUp;
        let [x, _, _] = descriptor.rotation_radians();
        assert_eq!(x, 0.0);
    }

    #[test]
    fn up_axis_parses_from_kebab_case() {
        assert_eq!(UpAxis::from_str("z-up").unwrap(), UpAxis::ZUp);
        assert_eq!(UpAxis::from_str("y-up").unwrap(), UpAxis::YUp);
        assert!(UpAxis::from_str("x-up").is_err());
        assert_eq!(UpAxis::YUp.to_string(), "y-up");
    }
}
