use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::types::ImageSize;

/// Byte order of the three channels in a pixel.
///
/// Camera capture and most video decoders hand out BGR buffers; the
/// `image` crate and face/pose detectors work in RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    #[default]
    Bgr,
}

impl ChannelOrder {
    /// Reorder a raw pixel into RGB.
    pub fn to_rgb(self, raw: [u8; 3]) -> Rgb {
        match self {
            ChannelOrder::Rgb => Rgb::new(raw[0], raw[1], raw[2]),
            ChannelOrder::Bgr => Rgb::new(raw[2], raw[1], raw[0]),
        }
    }
}

/// Trait for reading pixels from an 8-bit, three-channel image.
pub trait ImageAccess {
    /// Raw channels at (x, y) in the image's own channel order.
    /// Returns `[0, 0, 0]` for out-of-bounds pixels.
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 3];

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn channel_order(&self) -> ChannelOrder;

    fn size(&self) -> ImageSize {
        ImageSize::new(self.width(), self.height())
    }

    /// Pixel at (x, y) converted to RGB.
    fn get_rgb(&self, x: u32, y: u32) -> Rgb {
        self.channel_order().to_rgb(self.get_pixel(x, y))
    }
}

/// An owned interleaved pixel buffer (height × width × 3).
#[derive(Debug, Clone)]
pub struct ColorImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    order: ChannelOrder,
}

impl ColorImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(Error::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            order,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, order: ChannelOrder, f: F) -> Self
    where
        F: Fn(u32, u32) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
            order,
        }
    }

    /// Fill every pixel with one RGB color, stored in the given order.
    pub fn solid(width: u32, height: u32, order: ChannelOrder, color: Rgb) -> Self {
        let raw = match order {
            ChannelOrder::Rgb => [color.r, color.g, color.b],
            ChannelOrder::Bgr => [color.b, color.g, color.r],
        };
        Self::from_fn(width, height, order, |_, _| raw)
    }

    /// Overwrite one pixel with an RGB color. Out-of-bounds writes are ignored.
    pub fn put_rgb(&mut self, x: u32, y: u32, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        let raw = match self.order {
            ChannelOrder::Rgb => [color.r, color.g, color.b],
            ChannelOrder::Bgr => [color.b, color.g, color.r],
        };
        self.data[i..i + 3].copy_from_slice(&raw);
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }
}

impl From<image::RgbImage> for ColorImage {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
            order: ChannelOrder::Rgb,
        }
    }
}

impl ImageAccess for ColorImage {
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channel_order(&self) -> ChannelOrder {
        self.order
    }
}

impl ImageAccess for image::RgbImage {
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        match self.get_pixel_checked(x, y) {
            Some(p) => p.0,
            None => [0, 0, 0],
        }
    }

    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }
}
