//! Property tests for the color, face-shape and body-type rules.

use anthro_traits::{
    classify_body_type, hsv_to_rgb, rgb_to_hsv, sample_region, ChannelOrder, ColorImage, EyeColor,
    FaceGeometry, FaceShape, Hsv, Measurement, Measurements, Point, Polygon, Rgb, SkinTone,
};
use proptest::prelude::*;

fn rgb() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn hsv() -> impl Strategy<Value = Hsv> {
    (0.0f64..360.0, 0.0f64..=100.0, 0.0f64..=100.0).prop_map(|(h, s, v)| Hsv::new(h, s, v))
}

fn skin_rank(tone: SkinTone) -> usize {
    SkinTone::ALL.iter().position(|t| *t == tone).unwrap()
}

#[test]
fn hsv_round_trip_within_one() {
    proptest!(|(c in rgb())| {
        let back = hsv_to_rgb(rgb_to_hsv(c));
        prop_assert!((back.r as i16 - c.r as i16).abs() <= 1);
        prop_assert!((back.g as i16 - c.g as i16).abs() <= 1);
        prop_assert!((back.b as i16 - c.b as i16).abs() <= 1);
    });
}

#[test]
fn hsv_components_stay_in_range() {
    proptest!(|(c in rgb())| {
        let hsv = rgb_to_hsv(c);
        prop_assert!(hsv.hue >= 0.0 && hsv.hue < 360.0);
        prop_assert!(hsv.saturation >= 0.0 && hsv.saturation <= 100.0);
        prop_assert!(hsv.value >= 0.0 && hsv.value <= 100.0);
    });
}

#[test]
fn skin_tone_is_monotonic_in_value() {
    proptest!(|(a in hsv(), b in hsv())| {
        let (dim, bright) = if a.value <= b.value { (a, b) } else { (b, a) };
        prop_assert!(skin_rank(SkinTone::from_hsv(dim)) >= skin_rank(SkinTone::from_hsv(bright)));
    });
}

#[test]
fn low_saturation_eyes_are_black_or_gray() {
    proptest!(|(h in 0.0f64..360.0, s in 0.0f64..15.0, v in 0.0f64..=100.0)| {
        let eye = EyeColor::from_hsv(Hsv::new(h, s, v));
        prop_assert!(eye == EyeColor::Black || eye == EyeColor::Gray);
    });
}

#[test]
fn eye_rules_cover_every_color() {
    proptest!(|(hsv in hsv())| {
        let eye = EyeColor::from_hsv(hsv);
        prop_assert!(EyeColor::ALL.contains(&eye));
        prop_assert_eq!(eye, EyeColor::from_hsv(hsv));
    });
}

#[test]
fn wide_faces_default_to_oval() {
    proptest!(|(h in 1.0f32..500.0, extra in 0.0f32..2.0, jaw in 0.0f32..500.0, forehead in 0.0f32..500.0, cheek in 0.0f32..500.0)| {
        let g = FaceGeometry::from_widths(h * (1.0 + extra), h, jaw, forehead, cheek);
        prop_assert_eq!(g.classify(), FaceShape::Oval);
    });
}

#[test]
fn body_primary_has_the_top_score() {
    proptest!(|(height in 1.0f32..1000.0, shoulder in 1.0f32..500.0, hip in 1.0f32..500.0, waist in 1.0f32..500.0)| {
        let bag = Measurements::new()
            .with(Measurement::Height, height)
            .with(Measurement::ShoulderWidth, shoulder)
            .with(Measurement::HipWidth, hip)
            .with(Measurement::WaistWidth, waist);
        let result = classify_body_type(&bag).unwrap();
        let top = result.scores.get(result.primary);
        prop_assert!(anthro_traits::BodyType::ALL.iter().all(|t| result.scores.get(*t) <= top));
        prop_assert!(result.label.starts_with(result.primary.as_str()));
        prop_assert_eq!(result.secondary.is_some(), result.label.contains('-'));

        let again = classify_body_type(&bag).unwrap();
        prop_assert_eq!(serde_json::to_string(&result).unwrap(), serde_json::to_string(&again).unwrap());
    });
}

#[test]
fn solid_image_samples_its_own_color() {
    proptest!(|(c in rgb(), x0 in 0u32..40, y0 in 0u32..40, w in 2u32..20, h in 2u32..20)| {
        let image = ColorImage::solid(64, 64, ChannelOrder::Bgr, c);
        let (x1, y1) = ((x0 + w) as f32, (y0 + h) as f32);
        let (x0, y0) = (x0 as f32, y0 as f32);
        let polygon = Polygon::new(
            "box",
            vec![Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1), Point::new(x0, y1)],
        );
        let sample = sample_region(&image, &polygon).unwrap();
        prop_assert_eq!(sample.rgb, c);
        prop_assert_eq!(sample.hex, c.to_hex());
    });
}
