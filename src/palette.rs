//! Skin tone and eye color categories.
//!
//! Two strategies classify a sampled color: [`HsvRules`], the threshold
//! ladders over hue, saturation and value, and [`NearestReference`], which
//! picks the closest entry of a fixed reference table in RGB space. Callers
//! hold a [`ColorClassifier`] and never see which one is active.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{Hsv, Rgb};

/// Which trait a color sample describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorDomain {
    Skin,
    Eye,
}

/// Skin tone buckets, ordered from brightest to darkest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkinTone {
    Light,
    Medium,
    Dark,
}

impl SkinTone {
    pub const ALL: [SkinTone; 3] = [SkinTone::Light, SkinTone::Medium, SkinTone::Dark];

    /// Value-only ladder: `> 75` light, `> 50` medium, otherwise dark.
    pub fn from_hsv(hsv: Hsv) -> Self {
        if hsv.value > 75.0 {
            SkinTone::Light
        } else if hsv.value > 50.0 {
            SkinTone::Medium
        } else {
            SkinTone::Dark
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinTone::Light => "light",
            SkinTone::Medium => "medium",
            SkinTone::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EyeColor {
    Black,
    Gray,
    BlueGray,
    LightBlue,
    Blue,
    LightGreen,
    Green,
    Amber,
    LightBrown,
    DarkBrown,
    Brown,
}

impl EyeColor {
    pub const ALL: [EyeColor; 11] = [
        EyeColor::Black,
        EyeColor::Gray,
        EyeColor::BlueGray,
        EyeColor::LightBlue,
        EyeColor::Blue,
        EyeColor::LightGreen,
        EyeColor::Green,
        EyeColor::Amber,
        EyeColor::LightBrown,
        EyeColor::DarkBrown,
        EyeColor::Brown,
    ];

    /// Rules are tried in order and the first match wins; low saturation
    /// takes precedence over every hue band.
    pub fn from_hsv(hsv: Hsv) -> Self {
        let Hsv {
            hue: h,
            saturation: s,
            value: v,
        } = hsv;

        if s < 15.0 {
            if v < 30.0 {
                EyeColor::Black
            } else {
                EyeColor::Gray
            }
        } else if (160.0..=240.0).contains(&h) {
            if s < 30.0 && v < 60.0 {
                EyeColor::BlueGray
            } else if v > 70.0 {
                EyeColor::LightBlue
            } else {
                EyeColor::Blue
            }
        } else if (80.0..160.0).contains(&h) {
            if v > 70.0 {
                EyeColor::LightGreen
            } else {
                EyeColor::Green
            }
        } else if (0.0..=60.0).contains(&h) {
            if s > 60.0 && v > 60.0 {
                EyeColor::Amber
            } else if v > 60.0 {
                EyeColor::LightBrown
            } else if v < 30.0 {
                EyeColor::DarkBrown
            } else {
                EyeColor::Brown
            }
        } else {
            // 60-80 and 240-360 have no dedicated band.
            EyeColor::Brown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EyeColor::Black => "black",
            EyeColor::Gray => "gray",
            EyeColor::BlueGray => "blue-gray",
            EyeColor::LightBlue => "light-blue",
            EyeColor::Blue => "blue",
            EyeColor::LightGreen => "light-green",
            EyeColor::Green => "green",
            EyeColor::Amber => "amber",
            EyeColor::LightBrown => "light-brown",
            EyeColor::DarkBrown => "dark-brown",
            EyeColor::Brown => "brown",
        }
    }
}

/// A category from either domain. Serializes as its bare name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorCategory {
    Skin(SkinTone),
    Eye(EyeColor),
}

impl ColorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorCategory::Skin(t) => t.as_str(),
            ColorCategory::Eye(e) => e.as_str(),
        }
    }

    pub fn domain(&self) -> ColorDomain {
        match self {
            ColorCategory::Skin(_) => ColorDomain::Skin,
            ColorCategory::Eye(_) => ColorDomain::Eye,
        }
    }
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const SKIN_REFERENCES: [(SkinTone, Rgb); 3] = [
    (SkinTone::Light, Rgb::new(255, 223, 196)),
    (SkinTone::Medium, Rgb::new(210, 180, 140)),
    (SkinTone::Dark, Rgb::new(150, 111, 77)),
];

pub const EYE_REFERENCES: [(EyeColor, Rgb); 11] = [
    (EyeColor::Blue, Rgb::new(79, 119, 189)),
    (EyeColor::BlueGray, Rgb::new(96, 112, 122)),
    (EyeColor::LightBlue, Rgb::new(128, 185, 216)),
    (EyeColor::Green, Rgb::new(79, 156, 102)),
    (EyeColor::LightGreen, Rgb::new(145, 195, 150)),
    (EyeColor::Brown, Rgb::new(101, 67, 33)),
    (EyeColor::LightBrown, Rgb::new(150, 100, 60)),
    (EyeColor::DarkBrown, Rgb::new(60, 40, 20)),
    (EyeColor::Amber, Rgb::new(196, 142, 14)),
    (EyeColor::Gray, Rgb::new(128, 128, 128)),
    (EyeColor::Black, Rgb::new(45, 40, 40)),
];

/// Closest table entry by Euclidean RGB distance; ties keep the earlier entry.
fn nearest<T: Copy>(rgb: Rgb, table: &[(T, Rgb)]) -> T {
    let mut best = table[0].0;
    let mut best_distance = f32::INFINITY;
    for &(name, reference) in table {
        let d = rgb.distance(&reference);
        if d < best_distance {
            best_distance = d;
            best = name;
        }
    }
    best
}

/// Nearest entry of the reference table for `domain`.
pub fn nearest_reference_color(rgb: Rgb, domain: ColorDomain) -> ColorCategory {
    match domain {
        ColorDomain::Skin => ColorCategory::Skin(nearest(rgb, &SKIN_REFERENCES)),
        ColorDomain::Eye => ColorCategory::Eye(nearest(rgb, &EYE_REFERENCES)),
    }
}

/// A way of naming a sampled color.
pub trait ColorStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn skin_tone(&self, rgb: Rgb) -> SkinTone;
    fn eye_color(&self, rgb: Rgb) -> EyeColor;

    fn classify(&self, rgb: Rgb, domain: ColorDomain) -> ColorCategory {
        match domain {
            ColorDomain::Skin => ColorCategory::Skin(self.skin_tone(rgb)),
            ColorDomain::Eye => ColorCategory::Eye(self.eye_color(rgb)),
        }
    }
}

/// HSV threshold rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct HsvRules;

impl ColorStrategy for HsvRules {
    fn name(&self) -> &'static str {
        "hsv-rules"
    }

    fn skin_tone(&self, rgb: Rgb) -> SkinTone {
        SkinTone::from_hsv(rgb.to_hsv())
    }

    fn eye_color(&self, rgb: Rgb) -> EyeColor {
        EyeColor::from_hsv(rgb.to_hsv())
    }
}

/// Nearest reference color.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestReference;

impl ColorStrategy for NearestReference {
    fn name(&self) -> &'static str {
        "nearest-reference"
    }

    fn skin_tone(&self, rgb: Rgb) -> SkinTone {
        nearest(rgb, &SKIN_REFERENCES)
    }

    fn eye_color(&self, rgb: Rgb) -> EyeColor {
        nearest(rgb, &EYE_REFERENCES)
    }
}

/// Strategy selector used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorStrategyKind {
    #[default]
    HsvRules,
    NearestReference,
}

pub struct ColorClassifier {
    strategy: Box<dyn ColorStrategy>,
}

impl ColorClassifier {
    pub fn new(kind: ColorStrategyKind) -> Self {
        match kind {
            ColorStrategyKind::HsvRules => Self::with_strategy(HsvRules),
            ColorStrategyKind::NearestReference => Self::with_strategy(NearestReference),
        }
    }

    pub fn with_strategy<S: ColorStrategy + 'static>(strategy: S) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn classify(&self, rgb: Rgb, domain: ColorDomain) -> ColorCategory {
        self.strategy.classify(rgb, domain)
    }

    pub fn skin_tone(&self, rgb: Rgb) -> SkinTone {
        self.strategy.skin_tone(rgb)
    }

    pub fn eye_color(&self, rgb: Rgb) -> EyeColor {
        self.strategy.eye_color(rgb)
    }
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new(ColorStrategyKind::default())
    }
}

impl fmt::Debug for ColorClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorClassifier")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
