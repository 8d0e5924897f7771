//! # anthro-traits
//!
//! Derives human-readable physical traits from landmarks produced by an
//! external face-mesh or pose detector.
//!
//! This crate provides:
//! - **Color traits**: skin tone and eye color from the average color of
//!   landmark-bounded regions of the source image
//! - **Face shape**: oval, round, square, heart, rectangle or diamond from
//!   five face-mesh widths
//! - **Body type**: ectomorph, mesomorph and endomorph scores from pose
//!   measurements, with a primary and optional secondary type
//!
//! Landmark detection, capture and rendering are left to the caller.
//!
//! ## Pipeline
//!
//! 1. Look up the schema's landmarks for each region or measurement
//! 2. Scale normalized coordinates to pixels
//! 3. Face: rasterize region polygons, average their pixels, classify the
//!    colors in HSV; measure widths and walk the face-shape rules
//! 4. Body: gate on landmark visibility, measure, score the three axes
//!
//! ## Quick Start
//!
//! ```rust
//! use anthro_traits::{classify_body_type, Measurement, Measurements};
//!
//! let bag = Measurements::new()
//!     .with(Measurement::Height, 300.0)
//!     .with(Measurement::ShoulderWidth, 150.0)
//!     .with(Measurement::HipWidth, 100.0)
//!     .with(Measurement::WaistWidth, 80.0);
//!
//! let result = classify_body_type(&bag).unwrap();
//! assert_eq!(result.label, "mesomorph");
//! ```
//!
//! ## Custom Image Types
//!
//! Implement the [`ImageAccess`] trait for your own frame buffers:
//!
//! ```rust
//! use anthro_traits::{ChannelOrder, ImageAccess};
//!
//! struct CameraFrame { /* ... */ }
//!
//! impl ImageAccess for CameraFrame {
//!     fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
//!         // Raw channels at (x, y), [0, 0, 0] when out of bounds
//!         [0, 0, 0]
//!     }
//!     fn width(&self) -> u32 { 640 }
//!     fn height(&self) -> u32 { 480 }
//!     fn channel_order(&self) -> ChannelOrder { ChannelOrder::Bgr }
//! }
//! ```

pub mod analysis;
pub mod body_type;
pub mod color;
pub mod config;
mod error;
pub mod face_shape;
pub mod frames;
pub mod palette;
pub mod raster;
pub mod region;
pub mod schema;
mod types;

pub use analysis::{BodyAnalyzer, BodyReport, ColorReading, FaceAnalyzer, FaceReport, FaceShapeReading};
pub use body_type::{
    classify_body_type, measure_body, BodyRatios, BodyScores, BodyType, BodyTypeResult, Measurement,
    Measurements, VisibilityGate,
};
pub use color::{hsv_to_rgb, rgb_to_hsv, Hsv, Rgb};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use face_shape::{classify_face_shape, FaceGeometry, FaceShape, FaceShapeResult};
pub use frames::{AnalysisThrottle, AnalysisWorker, FrameSlot, Offer};
pub use palette::{
    nearest_reference_color, ColorCategory, ColorClassifier, ColorDomain, ColorStrategy,
    ColorStrategyKind, EyeColor, HsvRules, NearestReference, SkinTone,
};
pub use raster::{ChannelOrder, ColorImage, ImageAccess};
pub use region::{average_color, polygon_area, sample_region, ColorSample, Polygon, RegionMask};
pub use schema::{FaceMeshSchema, FaceRegion, IndexPair, PoseSchema, MEDIAPIPE_FACE_MESH, MEDIAPIPE_POSE};
pub use types::{BoundingBox, ImageSize, LandmarkPoint, LandmarkSet, Point};
