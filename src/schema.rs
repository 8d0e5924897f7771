//! Landmark index schemas.
//!
//! Detector topologies number their landmarks differently, so every index
//! the classifiers read comes from one of these tables rather than from an
//! inline constant. The defaults describe the 468-point MediaPipe face mesh
//! and the 33-point MediaPipe pose skeleton.

use serde::{Deserialize, Serialize};

/// A pair of landmarks whose separation defines one measured width or height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPair {
    pub first: usize,
    pub second: usize,
}

impl IndexPair {
    pub const fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }
}

/// Named indices for a face mesh topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMeshSchema {
    /// Ear to ear, measured horizontally.
    pub face_width: IndexPair,
    /// Forehead top to chin bottom, measured vertically.
    pub face_height: IndexPair,
    pub jaw_width: IndexPair,
    pub forehead_width: IndexPair,
    pub cheekbone_width: IndexPair,
    /// Cheeks and forehead, sampled together for skin tone.
    pub skin_region: &'static [usize],
    pub right_eye_region: &'static [usize],
    pub left_eye_region: &'static [usize],
}

impl FaceMeshSchema {
    pub fn region(&self, region: FaceRegion) -> &'static [usize] {
        match region {
            FaceRegion::Skin => self.skin_region,
            FaceRegion::RightEye => self.right_eye_region,
            FaceRegion::LeftEye => self.left_eye_region,
        }
    }
}

pub const MEDIAPIPE_FACE_MESH: FaceMeshSchema = FaceMeshSchema {
    face_width: IndexPair::new(234, 454),
    face_height: IndexPair::new(10, 152),
    jaw_width: IndexPair::new(93, 323),
    forehead_width: IndexPair::new(103, 332),
    cheekbone_width: IndexPair::new(123, 352),
    skin_region: &[
        // cheeks
        123, 50, 101, 36, 206, 94, 139, 137, 262, 359, 356, 389,
        // forehead
        66, 69, 109, 10, 338, 297, 299, 296,
    ],
    right_eye_region: &[33, 133, 159, 145, 153, 154, 155, 133],
    left_eye_region: &[362, 263, 386, 374, 380, 381, 382, 362],
};

/// Semantic face regions sampled for color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaceRegion {
    Skin,
    RightEye,
    LeftEye,
}

impl FaceRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceRegion::Skin => "skin",
            FaceRegion::RightEye => "right-eye",
            FaceRegion::LeftEye => "left-eye",
        }
    }
}

/// Named indices for a pose skeleton topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseSchema {
    pub nose: usize,
    pub left_shoulder: usize,
    pub right_shoulder: usize,
    pub left_hip: usize,
    pub right_hip: usize,
    pub left_ankle: usize,
    pub right_ankle: usize,
}

pub const MEDIAPIPE_POSE: PoseSchema = PoseSchema {
    nose: 0,
    left_shoulder: 11,
    right_shoulder: 12,
    left_hip: 23,
    right_hip: 24,
    left_ankle: 27,
    right_ankle: 28,
};
