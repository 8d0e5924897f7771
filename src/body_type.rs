//! Somatotype estimation from pose landmarks.
//!
//! [`measure_body`] turns a pose into a bag of pixel measurements, gated on
//! how many landmarks the detector was confident about. [`classify_body_type`]
//! scores the three somatotype axes from the bag's ratios and names the
//! dominant one, plus a runner-up when it scored at all.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::face_shape::round2;
use crate::schema::{PoseSchema, MEDIAPIPE_POSE};
use crate::types::{ImageSize, LandmarkPoint, LandmarkSet, Point};

/// Minimum number of measurements needed to score a body.
pub const MIN_MEASUREMENTS: usize = 4;

/// Waist sits this far down the shoulder-to-hip line.
pub const DEFAULT_WAIST_FRACTION: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Height,
    ShoulderWidth,
    HipWidth,
    WaistWidth,
    LegLength,
}

impl Measurement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measurement::Height => "height",
            Measurement::ShoulderWidth => "shoulder_width",
            Measurement::HipWidth => "hip_width",
            Measurement::WaistWidth => "waist_width",
            Measurement::LegLength => "leg_length",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel measurements taken from one pose. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurements(BTreeMap<Measurement, f32>);

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: Measurement, value: f32) {
        self.0.insert(kind, value);
    }

    pub fn with(mut self, kind: Measurement, value: f32) -> Self {
        self.insert(kind, value);
        self
    }

    pub fn get(&self, kind: Measurement) -> Option<f32> {
        self.0.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// `numerator / denominator`, or zero when either is missing or the
    /// denominator is zero.
    pub fn ratio(&self, numerator: Measurement, denominator: Measurement) -> f32 {
        match (self.get(numerator), self.get(denominator)) {
            (Some(n), Some(d)) if d != 0.0 => n / d,
            _ => 0.0,
        }
    }
}

/// How many confident landmarks a pose needs before it is measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityGate {
    /// A landmark counts when its visibility is strictly above this.
    pub min_visibility: f32,
    pub min_visible_landmarks: usize,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self {
            min_visibility: 0.7,
            min_visible_landmarks: 20,
        }
    }
}

impl VisibilityGate {
    pub fn check(&self, landmarks: &LandmarkSet) -> Result<()> {
        let available = landmarks.count_visible(self.min_visibility);
        if available < self.min_visible_landmarks {
            return Err(Error::InsufficientLandmarks {
                required: self.min_visible_landmarks,
                available,
            });
        }
        Ok(())
    }
}

/// Measure a MediaPipe pose with the default waist placement.
pub fn measure_body(landmarks: &LandmarkSet, size: ImageSize, gate: &VisibilityGate) -> Result<Measurements> {
    measure_body_with(landmarks, size, gate, DEFAULT_WAIST_FRACTION, &MEDIAPIPE_POSE)
}

pub fn measure_body_with(
    landmarks: &LandmarkSet,
    size: ImageSize,
    gate: &VisibilityGate,
    waist_fraction: f32,
    schema: &PoseSchema,
) -> Result<Measurements> {
    gate.check(landmarks)?;

    let px = |index: usize| landmarks.get(index).map(|lm| size.to_pixels(lm).truncated());
    let mut bag = Measurements::new();

    let foot = more_visible_ankle(landmarks, schema).map(|lm| size.to_pixels(lm).truncated());
    if let (Some(nose), Some(foot)) = (px(schema.nose), foot) {
        bag.insert(Measurement::Height, (foot.y - nose.y).abs());
    }

    let shoulders = px(schema.left_shoulder).zip(px(schema.right_shoulder));
    let hips = px(schema.left_hip).zip(px(schema.right_hip));

    if let Some((left, right)) = shoulders {
        bag.insert(Measurement::ShoulderWidth, (right.x - left.x).abs());
    }
    if let Some((left, right)) = hips {
        bag.insert(Measurement::HipWidth, (right.x - left.x).abs());
    }
    if let (Some((ls, rs)), Some((lh, rh))) = (shoulders, hips) {
        let left: Point = ls.lerp(lh, waist_fraction);
        let right: Point = rs.lerp(rh, waist_fraction);
        bag.insert(Measurement::WaistWidth, (right.x - left.x).abs());
    }
    if let (Some(hip), Some(ankle)) = (px(schema.left_hip), px(schema.left_ankle)) {
        bag.insert(Measurement::LegLength, (ankle.y - hip.y).abs());
    }

    debug!(measurements = bag.len(), "measured body");
    Ok(bag)
}

/// The more visible ankle; the left one only when it beats the right.
fn more_visible_ankle<'a>(landmarks: &'a LandmarkSet, schema: &PoseSchema) -> Option<&'a LandmarkPoint> {
    match (landmarks.get(schema.left_ankle), landmarks.get(schema.right_ankle)) {
        (Some(left), Some(right)) => {
            if left.visibility_or_full() > right.visibility_or_full() {
                Some(left)
            } else {
                Some(right)
            }
        }
        (left, right) => left.or(right),
    }
}

/// The three somatotype axes, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyType {
    Ectomorph,
    Mesomorph,
    Endomorph,
}

impl BodyType {
    pub const ALL: [BodyType; 3] = [BodyType::Ectomorph, BodyType::Mesomorph, BodyType::Endomorph];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Ectomorph => "ectomorph",
            BodyType::Mesomorph => "mesomorph",
            BodyType::Endomorph => "endomorph",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BodyType::Ectomorph => "Slim, long-limbed build",
            BodyType::Mesomorph => "Athletic, muscular build",
            BodyType::Endomorph => "Rounded, soft-contoured build",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRatios {
    pub shoulder_hip: f32,
    pub waist_hip: f32,
    /// Height over shoulder width.
    pub height_width: f32,
}

impl BodyRatios {
    pub fn from_measurements(m: &Measurements) -> Self {
        Self {
            shoulder_hip: m.ratio(Measurement::ShoulderWidth, Measurement::HipWidth),
            waist_hip: m.ratio(Measurement::WaistWidth, Measurement::HipWidth),
            height_width: m.ratio(Measurement::Height, Measurement::ShoulderWidth),
        }
    }

    pub fn rounded(&self) -> Self {
        Self {
            shoulder_hip: round2(self.shoulder_hip),
            waist_hip: round2(self.waist_hip),
            height_width: round2(self.height_width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BodyScores {
    pub ectomorph: u32,
    pub mesomorph: u32,
    pub endomorph: u32,
}

impl BodyScores {
    pub fn from_ratios(r: &BodyRatios) -> Self {
        let mut scores = Self::default();

        scores.ectomorph += if r.height_width > 3.0 {
            3
        } else if r.height_width > 2.5 {
            2
        } else if r.height_width > 2.0 {
            1
        } else {
            0
        };

        scores.mesomorph += if r.shoulder_hip > 1.4 {
            3
        } else if r.shoulder_hip > 1.2 {
            2
        } else if r.shoulder_hip > 1.0 {
            1
        } else {
            0
        };
        if r.waist_hip < 0.85 {
            scores.mesomorph += 2;
        }

        scores.endomorph += if r.waist_hip > 0.95 {
            3
        } else if r.waist_hip > 0.9 {
            2
        } else if r.waist_hip > 0.85 {
            1
        } else {
            0
        };
        if r.shoulder_hip < 1.1 {
            scores.endomorph += 2;
        }

        scores
    }

    pub fn get(&self, kind: BodyType) -> u32 {
        match kind {
            BodyType::Ectomorph => self.ectomorph,
            BodyType::Mesomorph => self.mesomorph,
            BodyType::Endomorph => self.endomorph,
        }
    }

    /// Highest scorer among `candidates`; the earliest wins a tie.
    fn best(&self, candidates: impl Iterator<Item = BodyType>) -> Option<BodyType> {
        let mut best: Option<BodyType> = None;
        for kind in candidates {
            if best.map_or(true, |b| self.get(kind) > self.get(b)) {
                best = Some(kind);
            }
        }
        best
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyTypeResult {
    /// `primary`, or `primary-secondary` when the runner-up scored.
    pub label: String,
    pub primary: BodyType,
    pub secondary: Option<BodyType>,
    pub description: String,
    /// Rounded to two decimals.
    pub ratios: BodyRatios,
    pub scores: BodyScores,
}

/// Score a measurement bag.
///
/// Fails with [`Error::MissingMeasurement`] naming the first absent
/// measurement when fewer than [`MIN_MEASUREMENTS`] are present.
pub fn classify_body_type(measurements: &Measurements) -> Result<BodyTypeResult> {
    if measurements.len() < MIN_MEASUREMENTS {
        let missing = [
            Measurement::Height,
            Measurement::ShoulderWidth,
            Measurement::HipWidth,
            Measurement::WaistWidth,
            Measurement::LegLength,
        ]
        .into_iter()
        .find(|m| measurements.get(*m).is_none())
        .unwrap_or(Measurement::Height);
        return Err(Error::MissingMeasurement(missing));
    }

    let ratios = BodyRatios::from_measurements(measurements);
    let scores = BodyScores::from_ratios(&ratios);

    let primary = scores
        .best(BodyType::ALL.into_iter())
        .unwrap_or(BodyType::Ectomorph);
    let secondary = scores
        .best(BodyType::ALL.into_iter().filter(|t| *t != primary))
        .filter(|t| scores.get(*t) >= 1);

    let label = match secondary {
        Some(s) => format!("{primary}-{s}"),
        None => primary.to_string(),
    };

    debug!(
        label = %label,
        ectomorph = scores.ectomorph,
        mesomorph = scores.mesomorph,
        endomorph = scores.endomorph,
        shoulder_hip = ratios.shoulder_hip,
        waist_hip = ratios.waist_hip,
        height_width = ratios.height_width,
        "classified body type"
    );

    Ok(BodyTypeResult {
        label,
        primary,
        secondary,
        description: primary.description().to_string(),
        ratios: ratios.rounded(),
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(height: f32, shoulder: f32, hip: f32, waist: f32) -> Measurements {
        Measurements::new()
            .with(Measurement::Height, height)
            .with(Measurement::ShoulderWidth, shoulder)
            .with(Measurement::HipWidth, hip)
            .with(Measurement::WaistWidth, waist)
    }

    #[test]
    fn athletic_build_is_pure_mesomorph() {
        // s/h 1.5, w/h 0.80, h/w 2.0
        let result = classify_body_type(&bag(300.0, 150.0, 100.0, 80.0)).unwrap();
        assert_eq!(
            result.scores,
            BodyScores {
                ectomorph: 0,
                mesomorph: 5,
                endomorph: 0
            }
        );
        assert_eq!(result.primary, BodyType::Mesomorph);
        assert_eq!(result.secondary, None);
        assert_eq!(result.label, "mesomorph");
        assert_eq!(result.description, "Athletic, muscular build");
        assert_eq!(result.ratios.shoulder_hip, 1.5);
        assert_eq!(result.ratios.waist_hip, 0.8);
        assert_eq!(result.ratios.height_width, 2.0);
    }

    #[test]
    fn runner_up_is_appended() {
        // h/w 3.14 -> ecto 3; s/h 1.05 -> meso 1, endo 2; w/h 0.92 -> endo 2
        let result = classify_body_type(&bag(330.0, 105.0, 100.0, 92.0)).unwrap();
        assert_eq!(result.scores.endomorph, 4);
        assert_eq!(result.scores.ectomorph, 3);
        assert_eq!(result.primary, BodyType::Endomorph);
        assert_eq!(result.secondary, Some(BodyType::Ectomorph));
        assert_eq!(result.label, "endomorph-ectomorph");
    }

    #[test]
    fn ties_prefer_ectomorph_then_mesomorph() {
        // h/w 3.1 -> ecto 3; s/h 1.11 -> meso 1; w/h 0.67 -> meso 2
        let result = classify_body_type(&bag(310.0, 100.0, 90.0, 60.0)).unwrap();
        assert_eq!(result.scores.ectomorph, 3);
        assert_eq!(result.scores.mesomorph, 3);
        assert_eq!(result.scores.endomorph, 0);
        assert_eq!(result.label, "ectomorph-mesomorph");
    }

    #[test]
    fn zero_hip_width_yields_zero_ratios() {
        let m = bag(300.0, 100.0, 0.0, 80.0);
        assert_eq!(m.ratio(Measurement::ShoulderWidth, Measurement::HipWidth), 0.0);
        let result = classify_body_type(&m).unwrap();
        assert_eq!(result.ratios.shoulder_hip, 0.0);
        assert_eq!(result.ratios.waist_hip, 0.0);
    }

    #[test]
    fn too_few_measurements() {
        let m = Measurements::new()
            .with(Measurement::Height, 300.0)
            .with(Measurement::ShoulderWidth, 100.0)
            .with(Measurement::LegLength, 150.0);
        let err = classify_body_type(&m).unwrap_err();
        assert!(matches!(err, Error::MissingMeasurement(Measurement::HipWidth)));
        assert_eq!(err.to_string(), "Missing measurement: hip_width");
    }

    fn pose(visibility: f32) -> LandmarkSet {
        let mut points = vec![LandmarkPoint::with_visibility(0.5, 0.5, visibility); 33];
        let s = MEDIAPIPE_POSE;
        points[s.nose] = LandmarkPoint::with_visibility(0.5, 0.125, visibility);
        points[s.left_shoulder] = LandmarkPoint::with_visibility(0.375, 0.25, visibility);
        points[s.right_shoulder] = LandmarkPoint::with_visibility(0.625, 0.25, visibility);
        points[s.left_hip] = LandmarkPoint::with_visibility(0.4375, 0.5, visibility);
        points[s.right_hip] = LandmarkPoint::with_visibility(0.5625, 0.5, visibility);
        points[s.left_ankle] = LandmarkPoint::with_visibility(0.4375, 0.875, 0.95);
        points[s.right_ankle] = LandmarkPoint::with_visibility(0.5625, 0.9375, 0.9);
        LandmarkSet::from_dense(points)
    }

    #[test]
    fn measures_pose_in_pixels() {
        let m = measure_body(&pose(0.9), ImageSize::new(400, 400), &VisibilityGate::default()).unwrap();
        // Left ankle is more visible, so height runs nose (50) to y=350.
        assert_eq!(m.get(Measurement::Height), Some(300.0));
        assert_eq!(m.get(Measurement::ShoulderWidth), Some(100.0));
        assert_eq!(m.get(Measurement::HipWidth), Some(50.0));
        // Waist at 60%: left 150 -> 175 = 165, right 250 -> 225 = 235.
        let waist = m.get(Measurement::WaistWidth).unwrap();
        assert!((waist - 70.0).abs() < 1e-3);
        assert_eq!(m.get(Measurement::LegLength), Some(150.0));
    }

    #[test]
    fn right_ankle_wins_visibility_ties() {
        let mut set = pose(0.9);
        let s = MEDIAPIPE_POSE;
        set.insert(s.left_ankle, LandmarkPoint::with_visibility(0.4375, 0.875, 0.9));
        let m = measure_body(&set, ImageSize::new(400, 400), &VisibilityGate::default()).unwrap();
        assert_eq!(m.get(Measurement::Height), Some(325.0));
    }

    #[test]
    fn low_visibility_pose_is_rejected() {
        let err = measure_body(&pose(0.5), ImageSize::new(400, 400), &VisibilityGate::default()).unwrap_err();
        // Only the two ankles clear the threshold.
        assert!(matches!(
            err,
            Error::InsufficientLandmarks {
                required: 20,
                available: 2
            }
        ));
    }

    #[test]
    fn missing_visibility_counts_as_visible() {
        let set = LandmarkSet::from_dense(vec![LandmarkPoint::new(0.5, 0.5); 33]);
        assert!(VisibilityGate::default().check(&set).is_ok());
    }

    #[test]
    fn partial_pose_measures_what_it_can() {
        let s = MEDIAPIPE_POSE;
        let full = pose(0.9);
        let sparse = LandmarkSet::from_pairs(full.iter().filter(|(i, _)| *i != s.right_hip).map(|(i, p)| (i, *p)));
        let m = measure_body(&sparse, ImageSize::new(400, 400), &VisibilityGate::default()).unwrap();
        assert!(m.get(Measurement::HipWidth).is_none());
        assert!(m.get(Measurement::WaistWidth).is_none());
        assert_eq!(m.len(), 3);
    }
}
