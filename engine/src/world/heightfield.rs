//! Heightfield
//!
//! Converts a grid of luminance samples into normalized heights in `[0, 1]`.
//! Lookups wrap toroidally, so a body leaving one edge samples the terrain
//! continuing from the opposite edge.

use std::path::Path;

use crate::error::TerrainError;
use crate::physics::neg_mod_i32;

/// Raw pixel samples a heightfield is built from.
///
/// `pixels` is `None` when the source image was decoded straight to the GPU
/// and never kept a CPU copy. Building a heightfield from such a source fails.
#[derive(Clone, Debug)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel (at least 3; only the first three are read)
    pub channels: u8,
    /// Row-major pixel bytes
    pub pixels: Option<Vec<u8>>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            pixels: Some(pixels),
        }
    }

    /// A source that has dimensions but no readable pixel data.
    pub fn without_pixels(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
            pixels: None,
        }
    }

    /// Copies an image into an RGBA8 pixel grid.
    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, 4, rgba.into_raw())
    }

    /// Loads a heightmap image from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let img = image::open(path)?;
        Ok(Self::from_image(&img))
    }
}

/// Normalized height grid with toroidal lookup. Immutable after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl HeightField {
    /// Builds heights as the mean of each pixel's first three channels over 255.
    pub fn from_pixels(grid: &PixelGrid) -> Result<Self, TerrainError> {
        let data = grid.pixels.as_deref().ok_or(TerrainError::MissingPixelData)?;
        if grid.width == 0 || grid.height == 0 {
            return Err(TerrainError::EmptyGrid {
                width: grid.width,
                height: grid.height,
            });
        }
        if grid.channels < 3 {
            return Err(TerrainError::TooFewChannels(grid.channels));
        }

        let stride = grid.channels as usize;
        let count = grid.width as usize * grid.height as usize;
        if data.len() != count * stride {
            return Err(TerrainError::PixelCountMismatch {
                expected: count * stride,
                actual: data.len(),
            });
        }

        let values = data
            .chunks_exact(stride)
            .map(|px| {
                let sum = px[0] as f32 + px[1] as f32 + px[2] as f32;
                (sum / 3.0) / 255.0
            })
            .collect();

        Ok(Self {
            width: grid.width,
            height: grid.height,
            values,
        })
    }

    /// Builds a heightfield from already-normalized values (clamped to `[0, 1]`).
    pub fn from_heights(width: u32, height: u32, values: Vec<f32>) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyGrid { width, height });
        }
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(TerrainError::PixelCountMismatch {
                expected,
                actual: values.len(),
            });
        }
        let values = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 })
            .collect();
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// A constant-height field.
    pub fn flat(width: u32, height: u32, value: f32) -> Result<Self, TerrainError> {
        Self::from_heights(width, height, vec![value; width as usize * height as usize])
    }

    pub fn from_image(img: &image::DynamicImage) -> Result<Self, TerrainError> {
        Self::from_pixels(&PixelGrid::from_image(img))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height at grid cell `(x, z)`, wrapping out-of-range indices.
    #[inline]
    pub fn get(&self, x: i32, z: i32) -> f32 {
        let x = neg_mod_i32(x, self.width as i32) as usize;
        let z = neg_mod_i32(z, self.height as i32) as usize;
        self.values[z * self.width as usize + x]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Lowest and highest normalized height.
    pub fn range(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}
