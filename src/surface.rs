// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Indexed-color raster surfaces.
//!
//! A surface is one byte per pixel, laid out row-major in a single owned buffer
//! whose stride equals the surface width. Palette index 0 is reserved as the
//! transparency sentinel for masked operations; interpreting the remaining
//! indices is left to the caller.

use std::fmt;

use tracing::debug;

/// The palette index treated as transparent by masked blits.
pub const TRANSPARENT: u8 = 0;

/// Errors produced when creating a surface.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Surface dimensions must be non-zero (requested {0}x{1})")]
    ZeroDimension(usize, usize),

    #[error("Unable to allocate a {0}x{1} surface")]
    Allocation(usize, usize),
}

/// An indexed-color bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Surface {
    /// Creates a new surface cleared to palette index 0.
    pub fn new(width: usize, height: usize) -> Result<Surface, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroDimension(width, height));
        }

        let len = width
            .checked_mul(height)
            .ok_or(SurfaceError::Allocation(width, height))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| SurfaceError::Allocation(width, height))?;
        pixels.resize(len, TRANSPARENT);

        debug!(width, height, "Created surface");
        Ok(Surface {
            width,
            height,
            pixels,
        })
    }

    /// Creates a surface from existing pixel data. The data must hold exactly
    /// `width * height` bytes.
    pub fn from_pixels(
        width: usize,
        height: usize,
        pixels: Vec<u8>,
    ) -> Result<Surface, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::ZeroDimension(width, height));
        }
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(SurfaceError::Allocation(width, height));
        }

        Ok(Surface {
            width,
            height,
            pixels,
        })
    }

    /// The width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of bytes between the starts of two consecutive rows.
    pub fn stride(&self) -> usize {
        self.width
    }

    /// Fills the entire surface with the given palette index.
    pub fn clear(&mut self, color: u8) {
        self.pixels.fill(color);
    }

    /// Reads a pixel. Coordinates wrap modulo the surface dimensions.
    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        self.pixels[self.offset(x, y)]
    }

    /// Writes a pixel. Coordinates wrap modulo the surface dimensions.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u8) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    /// Returns one row of pixels. The row index wraps modulo the height.
    pub fn row(&self, y: i32) -> &[u8] {
        let start = wrap(y as i64, self.height) * self.stride();
        &self.pixels[start..start + self.width]
    }

    /// Returns one mutable row of pixels. The row index wraps modulo the height.
    pub fn row_mut(&mut self, y: i32) -> &mut [u8] {
        let start = wrap(y as i64, self.height) * self.stride();
        let width = self.width;
        &mut self.pixels[start..start + width]
    }

    /// The whole pixel buffer, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The whole pixel buffer, row-major.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[inline]
    pub(crate) fn offset(&self, x: i32, y: i32) -> usize {
        wrap(y as i64, self.height) * self.stride() + wrap(x as i64, self.width)
    }
}

/// Reduces a signed coordinate into `0..len`.
#[inline]
pub(crate) fn wrap(coord: i64, len: usize) -> usize {
    coord.rem_euclid(len as i64) as usize
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
