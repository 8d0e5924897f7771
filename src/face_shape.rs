//! Face shape from face-mesh geometry.
//!
//! Five spans are measured in whole pixels: face width (ear to ear), face
//! height (forehead top to chin), and the jaw, forehead and cheekbone
//! widths. The width/height ratio picks a band and the three inner widths
//! decide the shape within it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::schema::{FaceMeshSchema, IndexPair, MEDIAPIPE_FACE_MESH};
use crate::types::{ImageSize, LandmarkSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaceShape {
    Oval,
    Round,
    Square,
    Heart,
    Rectangle,
    Diamond,
    /// Face height measured as zero.
    Indeterminate,
}

impl FaceShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceShape::Oval => "oval",
            FaceShape::Round => "round",
            FaceShape::Square => "square",
            FaceShape::Heart => "heart",
            FaceShape::Rectangle => "rectangle",
            FaceShape::Diamond => "diamond",
            FaceShape::Indeterminate => "indeterminate",
        }
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measured face spans, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceGeometry {
    pub face_width: f32,
    pub face_height: f32,
    pub jaw_width: f32,
    pub forehead_width: f32,
    pub cheekbone_width: f32,
}

impl FaceGeometry {
    pub fn from_widths(
        face_width: f32,
        face_height: f32,
        jaw_width: f32,
        forehead_width: f32,
        cheekbone_width: f32,
    ) -> Self {
        Self {
            face_width,
            face_height,
            jaw_width,
            forehead_width,
            cheekbone_width,
        }
    }

    /// Measure the spans named by `schema` on normalized landmarks.
    pub fn measure(landmarks: &LandmarkSet, size: ImageSize, schema: &FaceMeshSchema) -> Result<Self> {
        let horizontal = |pair: IndexPair| -> Result<f32> {
            let a = landmarks.require(pair.first)?;
            let b = landmarks.require(pair.second)?;
            Ok(((b.x - a.x).abs() * size.width as f32).trunc())
        };
        let vertical = |pair: IndexPair| -> Result<f32> {
            let a = landmarks.require(pair.first)?;
            let b = landmarks.require(pair.second)?;
            Ok(((b.y - a.y).abs() * size.height as f32).trunc())
        };

        Ok(Self {
            face_width: horizontal(schema.face_width)?,
            face_height: vertical(schema.face_height)?,
            jaw_width: horizontal(schema.jaw_width)?,
            forehead_width: horizontal(schema.forehead_width)?,
            cheekbone_width: horizontal(schema.cheekbone_width)?,
        })
    }

    /// Width over height; zero when the height is zero.
    pub fn ratio(&self) -> f32 {
        if self.face_height > 0.0 {
            self.face_width / self.face_height
        } else {
            0.0
        }
    }

    pub fn classify(&self) -> FaceShape {
        if self.face_height <= 0.0 {
            return FaceShape::Indeterminate;
        }

        let ratio = self.ratio();
        let jaw = self.jaw_width;
        let forehead = self.forehead_width;
        let cheek = self.cheekbone_width;
        let tapered = jaw < cheek && forehead > jaw;

        let shape = if ratio > 0.8 && ratio < 0.9 {
            tapered.then_some(FaceShape::Oval)
        } else if (0.9..1.0).contains(&ratio) {
            if tapered {
                Some(FaceShape::Round)
            } else if jaw >= cheek * 0.9 {
                Some(FaceShape::Square)
            } else {
                None
            }
        } else if ratio < 0.8 {
            if forehead > jaw {
                if cheek > forehead && cheek > jaw {
                    Some(FaceShape::Diamond)
                } else {
                    Some(FaceShape::Rectangle)
                }
            } else if forehead > jaw * 1.2 {
                // Only reachable with a negative jaw width.
                Some(FaceShape::Heart)
            } else {
                None
            }
        } else {
            // ratio >= 1.0 and the exact 0.8 / 0.9 edges have no rule.
            None
        };

        shape.unwrap_or(FaceShape::Oval)
    }
}

/// Face shape with the spans that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceShapeResult {
    pub shape: FaceShape,
    /// Width/height rounded to two decimals.
    pub ratio: f32,
    #[serde(flatten)]
    pub geometry: FaceGeometry,
}

impl From<FaceGeometry> for FaceShapeResult {
    fn from(geometry: FaceGeometry) -> Self {
        Self {
            shape: geometry.classify(),
            ratio: round2(geometry.ratio()),
            geometry,
        }
    }
}

pub(crate) fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Classify a MediaPipe face mesh.
pub fn classify_face_shape(landmarks: &LandmarkSet, size: ImageSize) -> Result<FaceShapeResult> {
    classify_face_shape_with(landmarks, size, &MEDIAPIPE_FACE_MESH)
}

pub fn classify_face_shape_with(
    landmarks: &LandmarkSet,
    size: ImageSize,
    schema: &FaceMeshSchema,
) -> Result<FaceShapeResult> {
    let geometry = FaceGeometry::measure(landmarks, size, schema)?;
    let result = FaceShapeResult::from(geometry);
    debug!(
        shape = result.shape.as_str(),
        ratio = geometry.ratio(),
        jaw = geometry.jaw_width,
        forehead = geometry.forehead_width,
        cheekbone = geometry.cheekbone_width,
        "classified face shape"
    );
    Ok(result)
}
