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

//! Masked copies between surfaces.
//!
//! Neither routine clips. Source addresses wrap modulo the source surface's own
//! dimensions and destination addresses wrap modulo the destination's, so the
//! same call covers tiled backgrounds and plain sprite copies. Source pixels
//! equal to [`TRANSPARENT`] leave the destination untouched.

use crate::surface::{wrap, Surface, TRANSPARENT};

/// Rejected blit requests.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BlitError {
    #[error("Stretch target must be non-zero (requested {0}x{1})")]
    ZeroTarget(usize, usize),
}

/// Copies a `w` x `h` block from `src` to `dst`, skipping transparent pixels.
///
/// Each destination pixel `(dst_x + x, dst_y + y)` receives the source pixel at
/// `(src_x + x, src_y + y)`, with both addresses wrapped to their own surface.
#[allow(clippy::too_many_arguments)]
pub fn masked_blit(
    src: &Surface,
    dst: &mut Surface,
    src_x: i32,
    src_y: i32,
    dst_x: i32,
    dst_y: i32,
    w: usize,
    h: usize,
) {
    for y in 0..h {
        let sy = wrap(src_y as i64 + y as i64, src.height());
        let dy = wrap(dst_y as i64 + y as i64, dst.height());
        let src_row = sy * src.stride();
        let dst_row = dy * dst.stride();

        for x in 0..w {
            let sx = wrap(src_x as i64 + x as i64, src.width());
            let color = src.pixels()[src_row + sx];
            if color != TRANSPARENT {
                let dx = wrap(dst_x as i64 + x as i64, dst.width());
                dst.pixels_mut()[dst_row + dx] = color;
            }
        }
    }
}

/// Copies with nearest-neighbor resampling, skipping transparent pixels.
///
/// The ratios `src_w / dst_w` and `src_h / dst_h` are computed once. Destination
/// pixel `(x, y)` of the `dst_w` x `dst_h` target samples the source at
/// `floor((x + src_x) * src_w / dst_w)`, `floor((y + src_y) * src_h / dst_h)`,
/// wrapped to the source surface. Note that the source offset is applied before
/// scaling.
///
/// # Errors
///
/// `dst_w` and `dst_h` are the ratio denominators and must be non-zero; a zero
/// target returns [`BlitError::ZeroTarget`] without touching `dst`.
#[allow(clippy::too_many_arguments)]
pub fn masked_stretch_blit(
    src: &Surface,
    dst: &mut Surface,
    src_x: i32,
    src_y: i32,
    src_w: usize,
    src_h: usize,
    dst_x: i32,
    dst_y: i32,
    dst_w: usize,
    dst_h: usize,
) -> Result<(), BlitError> {
    if dst_w == 0 || dst_h == 0 {
        return Err(BlitError::ZeroTarget(dst_w, dst_h));
    }

    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for y in 0..dst_h {
        let sy = scaled(y, src_y, y_ratio, src.height());
        let dy = wrap(dst_y as i64 + y as i64, dst.height());
        let src_row = sy * src.stride();
        let dst_row = dy * dst.stride();

        for x in 0..dst_w {
            let sx = scaled(x, src_x, x_ratio, src.width());
            let color = src.pixels()[src_row + sx];
            if color != TRANSPARENT {
                let dx = wrap(dst_x as i64 + x as i64, dst.width());
                dst.pixels_mut()[dst_row + dx] = color;
            }
        }
    }

    Ok(())
}

#[inline]
fn scaled(index: usize, offset: i32, ratio: f32, len: usize) -> usize {
    let pos = ((index as i64 + offset as i64) as f32 * ratio).floor() as i64;
    wrap(pos, len)
}
