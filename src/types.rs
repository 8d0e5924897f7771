use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The point `t` of the way from `self` to `other` (0.0 = self, 1.0 = other).
    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }

    /// Truncate both coordinates toward zero, snapping to the pixel grid.
    pub fn truncated(self) -> Point {
        Point::new(self.x.trunc(), self.y.trunc())
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// An axis-aligned box defined by top-left corner, width, and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box enclosing all points. `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Pixel dimensions of the frame the landmarks were detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale a normalized [0,1] landmark into pixel coordinates.
    pub fn to_pixels(&self, landmark: &LandmarkPoint) -> Point {
        Point::new(
            landmark.x * self.width as f32,
            landmark.y * self.height as f32,
        )
    }
}

/// A single landmark as produced by an external face-mesh or pose detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    /// Detector confidence in [0,1]. Face meshes usually leave this unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    pub const fn with_visibility(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Visibility, treating an unreported confidence as fully visible.
    pub fn visibility_or_full(&self) -> f32 {
        self.visibility.unwrap_or(1.0)
    }
}

/// Landmarks keyed by detector index.
///
/// Index meaning is fixed by a schema (see [`crate::schema`]); indices that
/// were not reported are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: BTreeMap<usize, LandmarkPoint>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a dense detector output where position equals index.
    pub fn from_dense(points: Vec<LandmarkPoint>) -> Self {
        Self {
            points: points.into_iter().enumerate().collect(),
        }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, LandmarkPoint)>,
    {
        Self {
            points: pairs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, index: usize, point: LandmarkPoint) {
        self.points.insert(index, point);
    }

    pub fn get(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points.get(&index)
    }

    /// Like [`get`](Self::get), but a missing index is an error.
    pub fn require(&self, index: usize) -> Result<&LandmarkPoint> {
        self.get(index).ok_or(Error::MissingLandmark { index })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &LandmarkPoint)> {
        self.points.iter().map(|(i, p)| (*i, p))
    }

    /// Number of landmarks whose visibility is strictly above `threshold`.
    pub fn count_visible(&self, threshold: f32) -> usize {
        self.points
            .values()
            .filter(|p| p.visibility_or_full() > threshold)
            .count()
    }
}

impl<'de> Deserialize<'de> for LandmarkSet {
    /// Accepts either a JSON array (dense) or an object keyed by index (sparse).
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LandmarkSetVisitor;

        impl<'de> Visitor<'de> for LandmarkSetVisitor {
            type Value = LandmarkSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of landmarks or a map from index to landmark")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut points = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(p) = seq.next_element::<LandmarkPoint>()? {
                    points.push(p);
                }
                Ok(LandmarkSet::from_dense(points))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut set = LandmarkSet::new();
                while let Some((key, point)) = map.next_entry::<String, LandmarkPoint>()? {
                    let index = key
                        .parse::<usize>()
                        .map_err(|_| de::Error::custom(format!("invalid landmark index {key:?}")))?;
                    set.insert(index, point);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_any(LandmarkSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);
    }

    #[test]
    fn point_lerp_sixty_percent() {
        let shoulder = Point::new(100.0, 100.0);
        let hip = Point::new(110.0, 200.0);
        let waist = shoulder.lerp(hip, 0.6);
        assert!((waist.x - 106.0).abs() < 1e-4);
        assert!((waist.y - 160.0).abs() < 1e-4);
    }

    #[test]
    fn bounding_box_from_points() {
        let bbox = BoundingBox::from_points(&[
            Point::new(2.0, 5.0),
            Point::new(8.0, 1.0),
            Point::new(4.0, 9.0),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(2.0, 1.0, 6.0, 8.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn image_size_scales_normalized_landmarks() {
        let size = ImageSize::new(640, 480);
        let p = size.to_pixels(&LandmarkPoint::new(0.5, 0.25));
        assert_eq!(p, Point::new(320.0, 120.0));
    }

    #[test]
    fn count_visible_is_strict_and_defaults_to_full() {
        let set = LandmarkSet::from_dense(vec![
            LandmarkPoint::with_visibility(0.0, 0.0, 0.7),
            LandmarkPoint::with_visibility(0.0, 0.0, 0.71),
            LandmarkPoint::new(0.0, 0.0),
        ]);
        assert_eq!(set.count_visible(0.7), 2);
    }

    #[test]
    fn missing_index_is_reported() {
        let set = LandmarkSet::from_pairs([(10, LandmarkPoint::new(0.5, 0.1))]);
        assert!(set.get(10).is_some());
        assert!(matches!(
            set.require(152),
            Err(Error::MissingLandmark { index: 152 })
        ));
    }

    #[test]
    fn deserializes_dense_and_sparse_json() {
        let dense: LandmarkSet =
            serde_json::from_str(r#"[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4,"visibility":0.9}]"#).unwrap();
        assert_eq!(dense.len(), 2);
        assert_eq!(dense.get(1).unwrap().visibility, Some(0.9));

        let sparse: LandmarkSet =
            serde_json::from_str(r#"{"10":{"x":0.5,"y":0.1},"152":{"x":0.5,"y":0.9}}"#).unwrap();
        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse.get(152).unwrap().y, 0.9);

        let bad = serde_json::from_str::<LandmarkSet>(r#"{"chin":{"x":0.5,"y":0.9}}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_as_index_map() {
        let set = LandmarkSet::from_pairs([(3, LandmarkPoint::new(0.25, 0.5))]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"3":{"x":0.25,"y":0.5}}"#);
        let back: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
