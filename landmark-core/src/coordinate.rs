//! WGS84 coordinates and the geodesic distance between them.
//!
//! Distances are measured along the WGS84 ellipsoid using Karney's geodesic
//! algorithm (via [`geo::Geodesic`]), never a spherical or planar
//! approximation.

use std::fmt;
use std::ops::RangeInclusive;

use geo::{Distance, Geodesic, Point};
use thiserror::Error;

const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Which half of a coordinate pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateField {
    /// The `lat` component.
    Latitude,
    /// The `lon` component.
    Longitude,
}

impl CoordinateField {
    /// Request field name carrying this component.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Latitude => "lat",
            Self::Longitude => "lon",
        }
    }

    const fn range(self) -> RangeInclusive<f64> {
        match self {
            Self::Latitude => LATITUDE_RANGE,
            Self::Longitude => LONGITUDE_RANGE,
        }
    }
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Errors returned when building a [`GeoCoordinate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The submitted text is not a decimal number.
    #[error("{field} must be numeric, got {value:?}")]
    NonNumeric {
        /// Offending component.
        field: CoordinateField,
        /// Text as submitted.
        value: String,
    },
    /// The value parsed but is NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite {
        /// Offending component.
        field: CoordinateField,
    },
    /// The value lies outside the valid WGS84 range.
    #[error("{field} {value} is outside the range [{min}, {max}]")]
    OutOfRange {
        /// Offending component.
        field: CoordinateField,
        /// Parsed value.
        value: f64,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },
}

impl CoordinateError {
    /// Component the error refers to.
    #[must_use]
    pub const fn field(&self) -> CoordinateField {
        match self {
            Self::NonNumeric { field, .. }
            | Self::NonFinite { field }
            | Self::OutOfRange { field, .. } => *field,
        }
    }

    /// Whether the input was not a number at all, as opposed to a number
    /// outside the coordinate domain.
    #[must_use]
    pub const fn is_non_numeric(&self) -> bool {
        matches!(self, Self::NonNumeric { .. })
    }
}

/// A validated latitude/longitude pair in decimal degrees.
///
/// # Examples
///
/// ```
/// use landmark_core::GeoCoordinate;
///
/// # fn main() -> Result<(), landmark_core::CoordinateError> {
/// let plaza = GeoCoordinate::parse("17.020610", "-96.721033")?;
/// assert_eq!(plaza.latitude(), 17.020610);
/// assert_eq!(plaza.distance_to(plaza), 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawCoordinate")
)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

impl GeoCoordinate {
    /// The intersection of the equator and the prime meridian.
    pub const ORIGIN: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Validate and construct a coordinate.
    ///
    /// # Errors
    /// Returns [`CoordinateError::NonFinite`] or
    /// [`CoordinateError::OutOfRange`] for values outside the WGS84 domain.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        Ok(Self {
            latitude: check_component(CoordinateField::Latitude, latitude)?,
            longitude: check_component(CoordinateField::Longitude, longitude)?,
        })
    }

    /// Parse a coordinate from the decimal strings a client submitted.
    ///
    /// Surrounding whitespace is ignored. The latitude is checked first, so
    /// when both components are wrong the error names `lat`.
    ///
    /// # Errors
    /// Returns [`CoordinateError::NonNumeric`] when a component is not a
    /// number, otherwise the errors of [`GeoCoordinate::new`].
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        let lat = parse_component(CoordinateField::Latitude, latitude)?;
        let lon = parse_component(CoordinateField::Longitude, longitude)?;
        Self::new(lat, lon)
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    /// Geodesic distance to `other` in metres.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        geodesic_distance(self, other)
    }

    /// The coordinate as a `geo` point (`x = longitude`, `y = latitude`).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Geodesic distance in metres between two coordinates on the WGS84
/// ellipsoid.
///
/// Both inputs are already validated, so the computation cannot fail. The
/// result is symmetric and exactly `0.0` for identical coordinates.
#[must_use]
pub fn geodesic_distance(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    Geodesic.distance(a.to_point(), b.to_point())
}

fn parse_component(field: CoordinateField, raw: &str) -> Result<f64, CoordinateError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CoordinateError::NonNumeric {
            field,
            value: raw.to_owned(),
        })
}

fn check_component(field: CoordinateField, value: f64) -> Result<f64, CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NonFinite { field });
    }
    let range = field.range();
    if !range.contains(&value) {
        return Err(CoordinateError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(value)
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCoordinate> for GeoCoordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn reference() -> GeoCoordinate {
        GeoCoordinate::new(17.020_610, -96.721_033).expect("valid reference")
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_values(#[case] lat: f64, #[case] lon: f64) {
        assert!(GeoCoordinate::new(lat, lon).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0, CoordinateField::Latitude)]
    #[case(-91.0, 0.0, CoordinateField::Latitude)]
    #[case(0.0, 180.01, CoordinateField::Longitude)]
    #[case(0.0, -200.0, CoordinateField::Longitude)]
    fn rejects_out_of_range(#[case] lat: f64, #[case] lon: f64, #[case] field: CoordinateField) {
        let err = GeoCoordinate::new(lat, lon).expect_err("out of range");
        assert!(matches!(err, CoordinateError::OutOfRange { .. }));
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("abc", "-96.72", CoordinateField::Latitude)]
    #[case("17.02", "", CoordinateField::Longitude)]
    #[case("17,02", "-96.72", CoordinateField::Latitude)]
    fn parse_rejects_non_numeric(
        #[case] lat: &str,
        #[case] lon: &str,
        #[case] field: CoordinateField,
    ) {
        let err = GeoCoordinate::parse(lat, lon).expect_err("non numeric");
        assert!(err.is_non_numeric());
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("NaN", "0")]
    #[case("0", "inf")]
    fn parse_rejects_non_finite(#[case] lat: &str, #[case] lon: &str) {
        let err = GeoCoordinate::parse(lat, lon).expect_err("non finite");
        assert!(matches!(err, CoordinateError::NonFinite { .. }));
    }

    #[rstest]
    fn parse_trims_whitespace(reference: GeoCoordinate) {
        let parsed = GeoCoordinate::parse(" 17.020610 ", "-96.721033\n").expect("parse");
        assert_eq!(parsed, reference);
    }

    #[rstest]
    fn identical_points_are_zero_metres_apart(reference: GeoCoordinate) {
        assert_eq!(geodesic_distance(reference, reference), 0.0);
    }

    #[rstest]
    fn fifty_metres_north_measures_fifty_metres(reference: GeoCoordinate) {
        let north = GeoCoordinate::new(reference.latitude() + 0.000_452, reference.longitude())
            .expect("valid offset");
        let distance = geodesic_distance(reference, north);
        assert!((distance - 50.0).abs() < 0.5, "got {distance}");
    }

    #[rstest]
    fn reference_points_are_roughly_two_hundred_metres_apart(reference: GeoCoordinate) {
        let second = GeoCoordinate::new(17.022_546, -96.720_905).expect("valid");
        let distance = reference.distance_to(second);
        assert!((200.0..230.0).contains(&distance), "got {distance}");
    }

    #[rstest]
    fn equator_degree_uses_ellipsoid() {
        // One degree of longitude on the WGS84 equator is 111 319.49 m; a
        // spherical model with the mean radius gives 111 194.93 m.
        let origin = GeoCoordinate::new(0.0, 0.0).expect("valid");
        let east = GeoCoordinate::new(0.0, 1.0).expect("valid");
        let distance = geodesic_distance(origin, east);
        assert!((distance - 111_319.49).abs() < 0.1, "got {distance}");
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialising_validates_range() {
        let err = serde_json::from_str::<GeoCoordinate>(r#"{"latitude": 95.0, "longitude": 0.0}"#)
            .expect_err("latitude out of range");
        assert!(err.to_string().contains("lat"));
    }
}
