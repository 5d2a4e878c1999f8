//! Deterministic collaborators for unit, behaviour and HTTP tests.

use crate::{
    ClassLabel, ClassifierError, GeoCoordinate, ImageTensor, LandmarkEntry, LandmarkRegistry,
    PlaceClassifier, RegistryError, UnknownClass,
};

/// Reference coordinate of the first demo landmark.
pub const FIRST_REFERENCE: (f64, f64) = (17.020_610, -96.721_033);

/// Reference coordinate of the second demo landmark.
pub const SECOND_REFERENCE: (f64, f64) = (17.022_546, -96.720_905);

/// `PlaceClassifier` returning the same distribution for every image.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedClassifier {
    distribution: Vec<f32>,
    input_size: (u32, u32),
}

impl FixedClassifier {
    /// Classifier expecting 224×224 input that always returns `distribution`.
    #[must_use]
    pub const fn new(distribution: Vec<f32>) -> Self {
        Self {
            distribution,
            input_size: (224, 224),
        }
    }

    /// Override the reported input size.
    #[must_use]
    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.input_size = (width, height);
        self
    }

    /// A one-hot style distribution over `labels` slots favouring `label`.
    #[must_use]
    pub fn favouring(label: ClassLabel, confidence: f32, labels: usize) -> Self {
        let slots = labels.max(label.index().saturating_add(1));
        #[expect(
            clippy::float_arithmetic,
            clippy::cast_precision_loss,
            reason = "spreads the remaining probability mass evenly"
        )]
        let rest = (1.0 - confidence) / (slots.saturating_sub(1).max(1)) as f32;
        let distribution = (0..slots)
            .map(|slot| if slot == label.index() { confidence } else { rest })
            .collect();
        Self::new(distribution)
    }
}

impl PlaceClassifier for FixedClassifier {
    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    fn classify(&self, _input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        Ok(self.distribution.clone())
    }
}

/// Build the two-landmark demo registry with the given radius.
///
/// Label `0` is the unknown class, labels `1` and `2` are landmarks at
/// [`FIRST_REFERENCE`] and [`SECOND_REFERENCE`].
///
/// # Errors
/// Returns [`RegistryError`] when `radius_meters` is not a positive number.
pub fn demo_registry(radius_meters: f64) -> Result<LandmarkRegistry, RegistryError> {
    LandmarkRegistry::builder()
        .unknown(UnknownClass {
            label: Some(ClassLabel::new(0)),
            ..UnknownClass::default()
        })
        .landmark(demo_entry(ClassLabel::new(1), "Lugar 1", FIRST_REFERENCE, radius_meters))
        .landmark(demo_entry(ClassLabel::new(2), "Lugar 2", SECOND_REFERENCE, radius_meters))
        .build()
}

/// Media link attached to the catalogue-only landmark.
pub const CATALOGUE_MEDIA_LINK: &str = "https://www.youtube.com/embed/v_Y0e69EeHQ";

/// The demo registry plus a catalogue-only landmark at label `3`.
///
/// # Errors
/// Returns [`RegistryError`] when `radius_meters` is not a positive number.
pub fn catalogue_registry(radius_meters: f64) -> Result<LandmarkRegistry, RegistryError> {
    LandmarkRegistry::builder()
        .unknown(UnknownClass {
            label: Some(ClassLabel::new(0)),
            ..UnknownClass::default()
        })
        .landmark(demo_entry(ClassLabel::new(1), "Lugar 1", FIRST_REFERENCE, radius_meters))
        .landmark(demo_entry(ClassLabel::new(2), "Lugar 2", SECOND_REFERENCE, radius_meters))
        .landmark(
            LandmarkEntry::catalogue_only(ClassLabel::new(3), "Ocotlán de Morelos")
                .with_description("Templo y Ex Convento de Santo Domingo de Guzmán")
                .with_media_link(CATALOGUE_MEDIA_LINK),
        )
        .build()
}

/// Build a registry holding only the first demo landmark.
///
/// # Errors
/// Returns [`RegistryError`] when `radius_meters` is not a positive number.
pub fn single_landmark_registry(radius_meters: f64) -> Result<LandmarkRegistry, RegistryError> {
    LandmarkRegistry::builder()
        .landmark(demo_entry(ClassLabel::new(1), "Lugar 1", FIRST_REFERENCE, radius_meters))
        .build()
}

/// Coordinate from a `(latitude, longitude)` pair known to be valid.
///
/// Pairs outside the WGS84 domain fall back to `(0, 0)`.
#[must_use]
pub fn coordinate((latitude, longitude): (f64, f64)) -> GeoCoordinate {
    GeoCoordinate::new(latitude, longitude).unwrap_or(GeoCoordinate::ORIGIN)
}

fn demo_entry(
    label: ClassLabel,
    name: &str,
    reference: (f64, f64),
    radius_meters: f64,
) -> LandmarkEntry {
    LandmarkEntry::new(label, name, coordinate(reference), radius_meters)
        .with_description(format!("Punto de referencia {name}"))
}
