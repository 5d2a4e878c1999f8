//! Static reference data for every landmark a deployment recognises.
//!
//! The registry maps a [`ClassLabel`] to its [`LandmarkEntry`]: display name,
//! optional reference point (coordinate and radius tolerance) and optional
//! descriptive metadata.
//! It also records the [`UnknownClass`] used for labels that are not
//! landmarks. A registry is built once at startup and never mutated; share it
//! behind an `Arc`.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{ClassLabel, GeoCoordinate};

#[cfg(feature = "serde")]
mod file;

/// Display name reported for labels that are not registered landmarks.
pub const UNKNOWN_DISPLAY_NAME: &str = "Desconocido";

/// Description reported for labels that are not registered landmarks.
pub const UNKNOWN_DESCRIPTION: &str = "No se pudo identificar la clase.";

/// Where photos of a landmark are expected to be taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    /// Reference coordinate.
    pub coordinate: GeoCoordinate,
    /// Largest accepted geodesic distance from `coordinate`, in metres.
    pub radius_meters: f64,
}

/// Reference data for one landmark.
///
/// Most landmarks carry a [`ReferencePoint`]. Catalogue-only entries have
/// none: the classifier recognises them and `/classify-image` describes
/// them, but no submitted coordinate can pass their location check.
///
/// # Examples
///
/// ```
/// use landmark_core::{ClassLabel, GeoCoordinate, LandmarkEntry};
///
/// # fn main() -> Result<(), landmark_core::CoordinateError> {
/// let entry = LandmarkEntry::new(
///     ClassLabel::new(1),
///     "Lugar 1",
///     GeoCoordinate::new(17.020610, -96.721033)?,
///     25.0,
/// )
/// .with_description("Plaza frente al templo");
/// assert_eq!(entry.display_name, "Lugar 1");
/// assert_eq!(entry.radius_meters(), Some(25.0));
///
/// let catalogue = LandmarkEntry::catalogue_only(ClassLabel::new(3), "Ocotlán de Morelos");
/// assert_eq!(catalogue.reference_coordinate(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkEntry {
    /// Classifier label recognising this landmark.
    pub label: ClassLabel,
    /// Human-readable name.
    pub display_name: String,
    /// Where a photo of the landmark is expected to be taken, if anywhere.
    pub reference: Option<ReferencePoint>,
    /// Optional descriptive text.
    pub description: Option<String>,
    /// Optional link to related media, such as an embedded video.
    pub media_link: Option<String>,
}

impl LandmarkEntry {
    /// Construct a located entry without descriptive metadata.
    #[must_use]
    pub fn new(
        label: ClassLabel,
        display_name: impl Into<String>,
        reference_coordinate: GeoCoordinate,
        radius_meters: f64,
    ) -> Self {
        Self {
            reference: Some(ReferencePoint {
                coordinate: reference_coordinate,
                radius_meters,
            }),
            ..Self::catalogue_only(label, display_name)
        }
    }

    /// Construct an entry with no reference point.
    #[must_use]
    pub fn catalogue_only(label: ClassLabel, display_name: impl Into<String>) -> Self {
        Self {
            label,
            display_name: display_name.into(),
            reference: None,
            description: None,
            media_link: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a media link.
    #[must_use]
    pub fn with_media_link(mut self, media_link: impl Into<String>) -> Self {
        self.media_link = Some(media_link.into());
        self
    }

    /// Reference coordinate, when the entry has one.
    #[must_use]
    pub fn reference_coordinate(&self) -> Option<GeoCoordinate> {
        self.reference.map(|point| point.coordinate)
    }

    /// Radius tolerance, when the entry has a reference point.
    #[must_use]
    pub fn radius_meters(&self) -> Option<f64> {
        self.reference.map(|point| point.radius_meters)
    }
}

/// Metadata for the reserved "unknown" class.
///
/// The unknown class has no reference coordinate, so it can never pass a
/// location check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownClass {
    /// Label the classifier emits for unrecognised images, if it has one.
    pub label: Option<ClassLabel>,
    /// Name reported for unrecognised images.
    pub display_name: String,
    /// Description reported for unrecognised images.
    pub description: String,
}

impl Default for UnknownClass {
    fn default() -> Self {
        Self {
            label: None,
            display_name: UNKNOWN_DISPLAY_NAME.to_owned(),
            description: UNKNOWN_DESCRIPTION.to_owned(),
        }
    }
}

/// Errors raised while building or loading a [`LandmarkRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No landmarks were supplied.
    #[error("landmark registry must contain at least one landmark")]
    Empty,
    /// Two entries share a label.
    #[error("landmark label {label} is registered more than once")]
    DuplicateLabel {
        /// Repeated label.
        label: ClassLabel,
    },
    /// A radius tolerance was zero, negative or not finite.
    #[error("radius for landmark {label} must be a positive number of metres, got {radius}")]
    InvalidRadius {
        /// Landmark with the bad radius.
        label: ClassLabel,
        /// Rejected radius.
        radius: f64,
    },
    /// The unknown class reuses a landmark label.
    #[error("unknown class label {label} is also registered as a landmark")]
    UnknownLabelCollision {
        /// Conflicting label.
        label: ClassLabel,
    },
    /// The registry file could not be read.
    #[cfg(feature = "serde")]
    #[error("failed to read landmark registry at {path}: {source}")]
    Read {
        /// Registry file location.
        path: camino::Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The registry file is not valid JSON for the expected schema.
    #[cfg(feature = "serde")]
    #[error("failed to parse landmark registry: {source}")]
    Parse {
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A landmark sets only part of its reference point.
    #[cfg(feature = "serde")]
    #[error(
        "landmark {label} must set both latitude and longitude, or neither with no radius_meters"
    )]
    IncompleteReference {
        /// Landmark with the partial reference point.
        label: ClassLabel,
    },
    /// A landmark's reference coordinate is invalid.
    #[cfg(feature = "serde")]
    #[error("landmark {label} has an invalid reference coordinate: {source}")]
    InvalidCoordinate {
        /// Landmark with the bad coordinate.
        label: ClassLabel,
        /// Validation failure.
        #[source]
        source: crate::CoordinateError,
    },
}

/// Read-only lookup table from class label to landmark reference data.
///
/// # Examples
///
/// ```
/// use landmark_core::{ClassLabel, GeoCoordinate, LandmarkEntry, LandmarkRegistry};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = LandmarkRegistry::builder()
///     .landmark(LandmarkEntry::new(
///         ClassLabel::new(1),
///         "Lugar 1",
///         GeoCoordinate::new(17.020610, -96.721033)?,
///         10.0,
///     ))
///     .build()?;
/// assert!(registry.lookup(ClassLabel::new(1)).is_some());
/// assert!(registry.lookup(ClassLabel::new(0)).is_none());
/// assert_eq!(registry.display_name(ClassLabel::new(0)), "Desconocido");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkRegistry {
    entries: BTreeMap<ClassLabel, LandmarkEntry>,
    unknown: UnknownClass,
}

impl LandmarkRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Reference data for `label`, or `None` when it is not a landmark.
    #[must_use]
    pub fn lookup(&self, label: ClassLabel) -> Option<&LandmarkEntry> {
        self.entries.get(&label)
    }

    /// Metadata for the reserved unknown class.
    #[must_use]
    pub const fn unknown(&self) -> &UnknownClass {
        &self.unknown
    }

    /// Name to report for `label`, falling back to the unknown class.
    #[must_use]
    pub fn display_name(&self, label: ClassLabel) -> &str {
        self.lookup(label)
            .map_or(self.unknown.display_name.as_str(), |entry| {
                entry.display_name.as_str()
            })
    }

    /// Number of registered landmarks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no landmarks are registered. Built registries are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Landmarks in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = &LandmarkEntry> {
        self.entries.values()
    }
}

/// Builder validating entries before a [`LandmarkRegistry`] is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<LandmarkEntry>,
    unknown: UnknownClass,
}

impl RegistryBuilder {
    /// Add a landmark.
    #[must_use]
    pub fn landmark(mut self, entry: LandmarkEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Replace the unknown-class metadata.
    #[must_use]
    pub fn unknown(mut self, unknown: UnknownClass) -> Self {
        self.unknown = unknown;
        self
    }

    /// Validate the collected entries and freeze the registry.
    ///
    /// # Errors
    /// Returns [`RegistryError`] for an empty registry, duplicate labels,
    /// invalid radii or an unknown label that collides with a landmark.
    pub fn build(self) -> Result<LandmarkRegistry, RegistryError> {
        if self.entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut entries = BTreeMap::new();
        for entry in self.entries {
            if let Some(ReferencePoint { radius_meters, .. }) = entry.reference
                && !(radius_meters.is_finite() && radius_meters > 0.0)
            {
                return Err(RegistryError::InvalidRadius {
                    label: entry.label,
                    radius: radius_meters,
                });
            }
            let label = entry.label;
            if entries.insert(label, entry).is_some() {
                return Err(RegistryError::DuplicateLabel { label });
            }
        }
        if let Some(label) = self.unknown.label
            && entries.contains_key(&label)
        {
            return Err(RegistryError::UnknownLabelCollision { label });
        }
        log::debug!("landmark registry built with {} entries", entries.len());
        Ok(LandmarkRegistry {
            entries,
            unknown: self.unknown,
        })
    }
}
