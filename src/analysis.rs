//! Face and body analysis entry points.
//!
//! The analyzers own only immutable configuration, so one instance can be
//! shared across threads and reused for every frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::body_type::{
    classify_body_type, measure_body_with, BodyRatios, BodyTypeResult, Measurements, VisibilityGate,
};
use crate::color::Rgb;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::face_shape::{classify_face_shape_with, FaceShape, FaceShapeResult};
use crate::palette::{ColorCategory, ColorClassifier, ColorDomain};
use crate::raster::ImageAccess;
use crate::region::{sample_region, Polygon};
use crate::schema::{FaceMeshSchema, FaceRegion, PoseSchema, MEDIAPIPE_FACE_MESH, MEDIAPIPE_POSE};
use crate::types::{ImageSize, LandmarkSet};

/// A sampled color and the category it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorReading {
    pub rgb: Rgb,
    pub hex: String,
    pub category: ColorCategory,
}

impl ColorReading {
    fn new(rgb: Rgb, category: ColorCategory) -> Self {
        Self {
            rgb,
            hex: rgb.to_hex(),
            category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceShapeReading {
    pub shape: FaceShape,
    pub ratio: f32,
}

impl From<&FaceShapeResult> for FaceShapeReading {
    fn from(result: &FaceShapeResult) -> Self {
        Self {
            shape: result.shape,
            ratio: result.ratio,
        }
    }
}

/// Result of one face analysis. A color is `None` when its region could
/// not be sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceReport {
    pub skin_tone: Option<ColorReading>,
    pub eye_color: Option<ColorReading>,
    pub face_shape: FaceShapeReading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyReport {
    pub body_type: String,
    pub description: String,
    pub ratios: BodyRatios,
}

impl From<BodyTypeResult> for BodyReport {
    fn from(result: BodyTypeResult) -> Self {
        Self {
            body_type: result.label,
            description: result.description,
            ratios: result.ratios,
        }
    }
}

#[derive(Debug)]
pub struct FaceAnalyzer {
    classifier: ColorClassifier,
    schema: FaceMeshSchema,
}

impl FaceAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_classifier(ColorClassifier::new(config.color_strategy))
    }

    pub fn with_classifier(classifier: ColorClassifier) -> Self {
        Self {
            classifier,
            schema: MEDIAPIPE_FACE_MESH,
        }
    }

    pub fn with_schema(mut self, schema: FaceMeshSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Analyze a face mesh detected in `image`.
    ///
    /// Color regions that cannot be sampled are skipped. A missing
    /// face-shape landmark is an error.
    pub fn analyze<I: ImageAccess>(&self, image: &I, landmarks: &LandmarkSet) -> Result<FaceReport> {
        let size = image.size();

        let skin_tone = self
            .sample(image, landmarks, size, FaceRegion::Skin)
            .map(|rgb| ColorReading::new(rgb, self.classifier.classify(rgb, ColorDomain::Skin)));

        let right = self.sample(image, landmarks, size, FaceRegion::RightEye);
        let left = self.sample(image, landmarks, size, FaceRegion::LeftEye);
        let eye_rgb = match (right, left) {
            (Some(r), Some(l)) => Some(Rgb::average(r, l)),
            (r, l) => r.or(l),
        };
        let eye_color =
            eye_rgb.map(|rgb| ColorReading::new(rgb, self.classifier.classify(rgb, ColorDomain::Eye)));

        let shape = classify_face_shape_with(landmarks, size, &self.schema)?;

        debug!(
            strategy = self.classifier.strategy_name(),
            skin = skin_tone.as_ref().map(|c| c.category.as_str()),
            eye = eye_color.as_ref().map(|c| c.category.as_str()),
            shape = shape.shape.as_str(),
            "analyzed face"
        );

        Ok(FaceReport {
            skin_tone,
            eye_color,
            face_shape: FaceShapeReading::from(&shape),
        })
    }

    fn sample<I: ImageAccess>(
        &self,
        image: &I,
        landmarks: &LandmarkSet,
        size: ImageSize,
        region: FaceRegion,
    ) -> Option<Rgb> {
        let sampled = Polygon::from_landmarks(region.as_str(), landmarks, self.schema.region(region), size)
            .and_then(|polygon| sample_region(image, &polygon));
        match sampled {
            Ok(sample) => Some(sample.rgb),
            Err(e) => {
                warn!(region = region.as_str(), error = %e, "skipping color region");
                None
            }
        }
    }
}

impl Default for FaceAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct BodyAnalyzer {
    gate: VisibilityGate,
    waist_fraction: f32,
    schema: PoseSchema,
}

impl BodyAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            gate: config.body,
            waist_fraction: config.waist_fraction,
            schema: MEDIAPIPE_POSE,
        }
    }

    pub fn with_schema(mut self, schema: PoseSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn measure(&self, landmarks: &LandmarkSet, size: ImageSize) -> Result<Measurements> {
        measure_body_with(landmarks, size, &self.gate, self.waist_fraction, &self.schema)
    }

    /// Measure and score a pose, keeping the per-axis scores.
    pub fn classify(&self, landmarks: &LandmarkSet, size: ImageSize) -> Result<BodyTypeResult> {
        classify_body_type(&self.measure(landmarks, size)?)
    }

    pub fn analyze(&self, landmarks: &LandmarkSet, size: ImageSize) -> Result<BodyReport> {
        self.classify(landmarks, size).map(BodyReport::from)
    }
}

impl Default for BodyAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
