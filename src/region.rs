//! Polygon masks and average-color sampling.
//!
//! A region is an ordered ring of landmark pixels. The mask covers every
//! pixel whose center falls inside the ring (even-odd rule) plus every
//! pixel on the ring's outline, the same coverage a raster polygon fill
//! produces.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::raster::ImageAccess;
use crate::types::{BoundingBox, ImageSize, LandmarkSet, Point};

/// An ordered ring of pixel-space points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    label: String,
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(label: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    /// Collect landmarks by index, scale them to the image and snap them to
    /// whole pixels.
    pub fn from_landmarks(
        label: impl Into<String>,
        landmarks: &LandmarkSet,
        indices: &[usize],
        size: ImageSize,
    ) -> Result<Self> {
        let points = indices
            .iter()
            .map(|&i| landmarks.require(i).map(|lm| size.to_pixels(lm).truncated()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(label, points))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of distinct vertices.
    pub fn distinct_points(&self) -> usize {
        let mut seen: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if !seen.contains(p) {
                seen.push(*p);
            }
        }
        seen.len()
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.points)
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }
}

/// Calculate the area of a polygon using the shoelace formula.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = points.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    (area / 2.0).abs()
}

/// Binary coverage raster, sized to the image it was built for.
#[derive(Debug, Clone)]
pub struct RegionMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    covered: usize,
}

impl RegionMask {
    /// Rasterize `polygon` onto a `width` × `height` canvas.
    pub fn fill(polygon: &Polygon, width: u32, height: u32) -> Self {
        let mut mask = Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
            covered: 0,
        };
        if polygon.points.is_empty() || width == 0 || height == 0 {
            return mask;
        }
        mask.fill_interior(&polygon.points);
        mask.stroke_outline(&polygon.points);
        mask
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels inside the mask.
    pub fn covered(&self) -> usize {
        self.covered
    }

    pub fn is_empty(&self) -> bool {
        self.covered == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Pixel extent of the covered area, for callers that draw the region.
    pub fn bounds(&self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        for (x, y) in self.pixels() {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(BoundingBox::new(
            min_x as f32,
            min_y as f32,
            (max_x - min_x + 1) as f32,
            (max_y - min_y + 1) as f32,
        ))
    }

    /// Iterate over covered pixel coordinates in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    fn set(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        if !self.bits[i] {
            self.bits[i] = true;
            self.covered += 1;
        }
    }

    /// Even-odd scanline fill sampled at pixel centers.
    fn fill_interior(&mut self, points: &[Point]) {
        let n = points.len();
        if n < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let first_row = (min_y.floor() as i64).max(0);
        let last_row = (max_y.ceil() as i64).min(self.height as i64 - 1);

        let mut crossings: Vec<f32> = Vec::with_capacity(n);
        for row in first_row..=last_row {
            let yc = row as f32 + 0.5;
            crossings.clear();
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil() as i64;
                let end = (span[1] - 0.5).floor() as i64;
                for x in start.max(0)..=end.min(self.width as i64 - 1) {
                    self.set(x, row);
                }
            }
        }
    }

    /// Mark the pixels along each edge of the closed ring.
    fn stroke_outline(&mut self, points: &[Point]) {
        let n = points.len();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            self.line(a.x as i64, a.y as i64, b.x as i64, b.y as i64);
        }
    }

    fn line(&mut self, mut x0: i64, mut y0: i64, x1: i64, y1: i64) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Average color of a masked region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSample {
    pub rgb: Rgb,
    pub hex: String,
}

impl From<Rgb> for ColorSample {
    fn from(rgb: Rgb) -> Self {
        Self {
            hex: rgb.to_hex(),
            rgb,
        }
    }
}

/// Mean RGB color of the pixels covered by `mask`.
pub fn average_color<I: ImageAccess>(image: &I, mask: &RegionMask) -> Option<Rgb> {
    if mask.is_empty() {
        return None;
    }
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for (x, y) in mask.pixels() {
        let px = image.get_rgb(x, y);
        r += px.r as u64;
        g += px.g as u64;
        b += px.b as u64;
    }
    // Integer division truncates the mean toward zero.
    let n = mask.covered() as u64;
    Some(Rgb::new((r / n) as u8, (g / n) as u8, (b / n) as u8))
}

/// Sample the average color inside `polygon`.
///
/// Fails with [`Error::InsufficientRegion`] when the polygon has fewer than
/// three distinct vertices or covers no pixel of the image.
pub fn sample_region<I: ImageAccess>(image: &I, polygon: &Polygon) -> Result<ColorSample> {
    let distinct = polygon.distinct_points();
    if distinct < 3 {
        return Err(Error::region(
            polygon.label(),
            format!("polygon has {distinct} distinct points, need at least 3"),
        ));
    }

    let mask = RegionMask::fill(polygon, image.width(), image.height());
    let rgb = average_color(image, &mask)
        .ok_or_else(|| Error::region(polygon.label(), "mask covers no pixels"))?;

    debug!(
        region = polygon.label(),
        pixels = mask.covered(),
        area = polygon.area(),
        rgb = %rgb,
        "sampled region"
    );
    Ok(ColorSample::from(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{ChannelOrder, ColorImage};
    use crate::types::LandmarkPoint;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Polygon {
        Polygon::new(
            "square",
            vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        )
    }

    #[test]
    fn test_polygon_area_triangle() {
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ];
        // Area = 0.5 * base * height = 0.5 * 4 * 3 = 6
        assert!((polygon_area(&triangle) - 6.0).abs() < 0.01);
    }

    #[test]
    fn test_polygon_area_square() {
        assert!((square(0.0, 0.0, 10.0, 10.0).area() - 100.0).abs() < 0.01);
    }

    #[test]
    fn square_mask_includes_its_outline() {
        // Vertices at 2..=5 cover columns and rows 2 through 5 inclusive.
        let mask = RegionMask::fill(&square(2.0, 2.0, 5.0, 5.0), 10, 10);
        assert_eq!(mask.covered(), 16);
        assert!(mask.contains(2, 2));
        assert!(mask.contains(5, 5));
        assert!(!mask.contains(6, 5));
        assert!(!mask.contains(1, 3));
        assert_eq!(mask.bounds(), Some(BoundingBox::new(2.0, 2.0, 4.0, 4.0)));
    }

    #[test]
    fn mask_is_clipped_to_canvas() {
        let mask = RegionMask::fill(&square(-5.0, -5.0, 3.0, 3.0), 4, 4);
        assert_eq!(mask.covered(), 16);

        let outside = RegionMask::fill(&square(20.0, 20.0, 30.0, 30.0), 4, 4);
        assert!(outside.is_empty());
    }

    #[test]
    fn duplicate_closing_vertex_is_not_distinct() {
        let eye = Polygon::new(
            "eye",
            vec![
                Point::new(1.0, 1.0),
                Point::new(4.0, 1.0),
                Point::new(1.0, 1.0),
            ],
        );
        assert_eq!(eye.distinct_points(), 2);
    }

    #[test]
    fn sample_converts_bgr_to_rgb() {
        let image = ColorImage::solid(8, 8, ChannelOrder::Bgr, Rgb::new(210, 180, 140));
        let sample = sample_region(&image, &square(1.0, 1.0, 6.0, 6.0)).unwrap();
        assert_eq!(sample.rgb, Rgb::new(210, 180, 140));
        assert_eq!(sample.hex, "#d2b48c");
    }

    #[test]
    fn sample_averages_only_masked_pixels() {
        // Left half red, right half blue; sample a region on the left only.
        let image = ColorImage::from_fn(10, 10, ChannelOrder::Rgb, |x, _| {
            if x < 5 {
                [200, 0, 0]
            } else {
                [0, 0, 200]
            }
        });
        let sample = sample_region(&image, &square(0.0, 0.0, 4.0, 9.0)).unwrap();
        assert_eq!(sample.rgb, Rgb::new(200, 0, 0));
    }

    #[test]
    fn mean_is_truncated() {
        // Two pixels, values 10 and 11 in each channel: mean 10.5 -> 10.
        let image = ColorImage::from_fn(2, 1, ChannelOrder::Rgb, |x, _| {
            let v = 10 + x as u8;
            [v, v, v]
        });
        let mut mask = RegionMask::fill(&square(0.0, 0.0, 0.0, 0.0), 2, 1);
        mask.set(1, 0);
        assert_eq!(average_color(&image, &mask), Some(Rgb::new(10, 10, 10)));
    }

    #[test]
    fn large_region_mean_stays_below_integer() {
        // 350k pixels of 128 and one of 127: mean just under 128.
        let mut image = ColorImage::solid(700, 500, ChannelOrder::Bgr, Rgb::new(128, 128, 128));
        image.put_rgb(0, 0, Rgb::new(127, 127, 127));
        let sample = sample_region(&image, &square(-1.0, -1.0, 700.0, 500.0)).unwrap();
        assert_eq!(sample.rgb, Rgb::new(127, 127, 127));
    }

    #[test]
    fn empty_mask_has_no_bounds() {
        let mask = RegionMask::fill(&square(20.0, 20.0, 30.0, 30.0), 4, 4);
        assert_eq!(mask.bounds(), None);
    }

    #[test]
    fn degenerate_polygon_is_insufficient() {
        let image = ColorImage::solid(4, 4, ChannelOrder::Bgr, Rgb::new(1, 2, 3));
        let line = Polygon::new("line", vec![Point::new(0.0, 0.0), Point::new(3.0, 3.0)]);
        let err = sample_region(&image, &line).unwrap_err();
        assert!(matches!(err, Error::InsufficientRegion { ref region, .. } if region == "line"));
    }

    #[test]
    fn off_image_polygon_is_insufficient() {
        let image = ColorImage::solid(4, 4, ChannelOrder::Bgr, Rgb::new(1, 2, 3));
        let err = sample_region(&image, &square(10.0, 10.0, 12.0, 12.0)).unwrap_err();
        assert!(matches!(err, Error::InsufficientRegion { .. }));
    }

    #[test]
    fn polygon_from_normalized_landmarks() {
        let landmarks = LandmarkSet::from_pairs([
            (1, LandmarkPoint::new(0.125, 0.25)),
            (2, LandmarkPoint::new(0.75, 0.25)),
            (3, LandmarkPoint::new(0.75, 0.5)),
        ]);
        let poly = Polygon::from_landmarks("tri", &landmarks, &[1, 2, 3], ImageSize::new(100, 100)).unwrap();
        // 12.5 snaps down to 12
        assert_eq!(
            poly.points(),
            &[Point::new(12.0, 25.0), Point::new(75.0, 25.0), Point::new(75.0, 50.0)]
        );

        let missing = Polygon::from_landmarks("tri", &landmarks, &[1, 2, 9], ImageSize::new(100, 100));
        assert!(matches!(missing, Err(Error::MissingLandmark { index: 9 })));
    }
}
