//! JSON registry files.
//!
//! ```json
//! {
//!   "unknown": { "label": 0, "name": "Desconocido" },
//!   "landmarks": [
//!     {
//!       "label": 1,
//!       "name": "Lugar 1",
//!       "latitude": 17.020610,
//!       "longitude": -96.721033,
//!       "radius_meters": 25.0,
//!       "description": "...",
//!       "media_link": "https://..."
//!     }
//!   ]
//! }
//! ```
//!
//! `radius_meters` is optional per landmark; entries without it inherit the
//! deployment-wide radius supplied by the caller. A landmark that omits
//! `latitude`, `longitude` and `radius_meters` altogether is catalogue-only:
//! it is recognised and described but has no reference point.

use camino::Utf8Path;
use serde::Deserialize;

use super::{
    LandmarkEntry, LandmarkRegistry, ReferencePoint, RegistryError, UNKNOWN_DESCRIPTION,
    UNKNOWN_DISPLAY_NAME, UnknownClass,
};
use crate::{ClassLabel, GeoCoordinate};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    unknown: Option<UnknownRecord>,
    landmarks: Vec<LandmarkRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnknownRecord {
    #[serde(default)]
    label: Option<ClassLabel>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LandmarkRecord {
    label: ClassLabel,
    name: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    radius_meters: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    media_link: Option<String>,
}

impl LandmarkRecord {
    fn into_entry(self, default_radius_meters: f64) -> Result<LandmarkEntry, RegistryError> {
        let reference = match (self.latitude, self.longitude, self.radius_meters) {
            (Some(latitude), Some(longitude), radius_meters) => {
                let coordinate = GeoCoordinate::new(latitude, longitude).map_err(|source| {
                    RegistryError::InvalidCoordinate {
                        label: self.label,
                        source,
                    }
                })?;
                Some(ReferencePoint {
                    coordinate,
                    radius_meters: radius_meters.unwrap_or(default_radius_meters),
                })
            }
            (None, None, None) => None,
            _ => return Err(RegistryError::IncompleteReference { label: self.label }),
        };
        Ok(LandmarkEntry {
            label: self.label,
            display_name: self.name,
            reference,
            description: self.description,
            media_link: self.media_link,
        })
    }
}

impl From<UnknownRecord> for UnknownClass {
    fn from(record: UnknownRecord) -> Self {
        Self {
            label: record.label,
            display_name: record
                .name
                .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_owned()),
            description: record
                .description
                .unwrap_or_else(|| UNKNOWN_DESCRIPTION.to_owned()),
        }
    }
}

impl LandmarkRegistry {
    /// Load a registry from a JSON file.
    ///
    /// `default_radius_meters` is the deployment radius tolerance applied to
    /// landmarks that do not set their own.
    ///
    /// # Errors
    /// Fails fast with [`RegistryError`] when the file is missing or
    /// unreadable, is not valid JSON, or describes an invalid registry. No
    /// partially loaded registry is ever returned.
    pub fn load(path: &Utf8Path, default_radius_meters: f64) -> Result<Self, RegistryError> {
        let contents =
            landmark_fs::read_artefact_to_string(path).map_err(|source| RegistryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let registry = Self::from_json_str(&contents, default_radius_meters)?;
        log::info!(
            "loaded {} landmarks from registry {path}",
            registry.len()
        );
        Ok(registry)
    }

    /// Parse a registry from JSON text.
    ///
    /// # Errors
    /// See [`LandmarkRegistry::load`].
    pub fn from_json_str(json: &str, default_radius_meters: f64) -> Result<Self, RegistryError> {
        let file: RegistryFile =
            serde_json::from_str(json).map_err(|source| RegistryError::Parse { source })?;
        let mut builder = Self::builder();
        if let Some(unknown) = file.unknown {
            builder = builder.unknown(unknown.into());
        }
        for record in file.landmarks {
            builder = builder.landmark(record.into_entry(default_radius_meters)?);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"{
        "unknown": { "label": 0, "name": "Desconocido" },
        "landmarks": [
            { "label": 1, "name": "Lugar 1", "latitude": 17.020610, "longitude": -96.721033 },
            {
                "label": 2,
                "name": "Lugar 2",
                "latitude": 17.022546,
                "longitude": -96.720905,
                "radius_meters": 25.0,
                "media_link": "https://example.org/video"
            }
        ]
    }"#;

    #[rstest]
    fn entries_without_radius_inherit_default() {
        let registry = LandmarkRegistry::from_json_str(REGISTRY, 10.0).expect("valid registry");
        let first = registry.lookup(ClassLabel::new(1)).expect("label 1");
        let second = registry.lookup(ClassLabel::new(2)).expect("label 2");
        assert_eq!(first.radius_meters(), Some(10.0));
        assert_eq!(second.radius_meters(), Some(25.0));
        assert_eq!(second.media_link.as_deref(), Some("https://example.org/video"));
        assert_eq!(registry.unknown().label, Some(ClassLabel::new(0)));
        assert_eq!(registry.unknown().description, UNKNOWN_DESCRIPTION);
    }

    #[rstest]
    fn entries_without_coordinates_are_catalogue_only() {
        let json = r#"{ "landmarks": [
            {
                "label": 3,
                "name": "Ocotlán de Morelos",
                "description": "Templo y Ex Convento de Santo Domingo de Guzmán",
                "media_link": "https://example.org/ocotlan"
            }
        ] }"#;
        let registry = LandmarkRegistry::from_json_str(json, 10.0).expect("valid registry");
        let entry = registry.lookup(ClassLabel::new(3)).expect("label 3");
        assert_eq!(entry.reference, None);
        assert_eq!(entry.media_link.as_deref(), Some("https://example.org/ocotlan"));
    }

    #[rstest]
    #[case(r#"{ "label": 1, "name": "x", "latitude": 17.0 }"#)]
    #[case(r#"{ "label": 1, "name": "x", "longitude": -96.7 }"#)]
    #[case(r#"{ "label": 1, "name": "x", "radius_meters": 5.0 }"#)]
    fn rejects_partial_reference_points(#[case] record: &str) {
        let json = format!(r#"{{ "landmarks": [ {record} ] }}"#);
        let err = LandmarkRegistry::from_json_str(&json, 10.0).expect_err("partial reference");
        assert!(matches!(err, RegistryError::IncompleteReference { label } if label.get() == 1));
    }

    #[rstest]
    fn rejects_invalid_coordinates() {
        let json = r#"{ "landmarks": [
            { "label": 1, "name": "Polo", "latitude": 91.0, "longitude": 0.0 }
        ] }"#;
        let err = LandmarkRegistry::from_json_str(json, 10.0).expect_err("bad latitude");
        assert!(matches!(err, RegistryError::InvalidCoordinate { .. }));
    }

    #[rstest]
    #[case("{")]
    #[case(r#"{ "landmarks": [], "extra": true }"#)]
    #[case(r#"{ "landmarks": [ { "label": -1, "name": "x", "latitude": 0, "longitude": 0 } ] }"#)]
    fn rejects_malformed_json(#[case] json: &str) {
        let err = LandmarkRegistry::from_json_str(json, 10.0).expect_err("malformed");
        assert!(matches!(err, RegistryError::Parse { .. }));
    }

    #[rstest]
    fn missing_file_fails_fast() {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).expect("utf8");
        let err = LandmarkRegistry::load(&path, 10.0).expect_err("missing file");
        assert!(matches!(err, RegistryError::Read { .. }));
    }

    #[rstest]
    fn loads_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("landmarks.json")).expect("utf8");
        std::fs::write(&path, REGISTRY).expect("write registry");
        let registry = LandmarkRegistry::load(&path, 25.0).expect("load registry");
        assert_eq!(registry.len(), 2);
    }
}
