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
use std::{error::Error, fs::File, path::Path, sync::Arc};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::config::Voices;
use crate::hardware::mock;
use crate::samples::{Channels, Sample};
use crate::surface::Surface;
use crate::voices::VoicePool;

/// A surface filled with a single color.
pub fn surface_filled(width: usize, height: usize, color: u8) -> Surface {
    let mut surface = Surface::new(width, height).unwrap();
    surface.clear(color);
    surface
}

/// A surface where every pixel is opaque and, up to 255 pixels, distinct.
pub fn numbered_surface(width: usize, height: usize) -> Surface {
    let pixels = (0..width * height).map(|i| (i % 255) as u8 + 1).collect();
    Surface::from_pixels(width, height, pixels).unwrap()
}

/// A 16-bit mono sample of `len` frames at 8000 Hz.
pub fn mono_sample(len: usize) -> Arc<Sample> {
    let points: Vec<i16> = (0..len).map(|i| i as i16).collect();
    Arc::new(Sample::from_i16(Channels::Mono, 8000, &points).unwrap())
}

/// A 16-bit stereo sample of `len` frames at 8000 Hz.
pub fn stereo_sample(len: usize) -> Arc<Sample> {
    let points: Vec<i16> = (0..len * 2).map(|i| i as i16).collect();
    Arc::new(Sample::from_i16(Channels::Stereo, 8000, &points).unwrap())
}

/// A pool on a mock backend, along with a handle to the backend's command log.
pub fn mock_pool(config: Voices) -> (VoicePool, mock::Backend) {
    let backend = mock::Backend::get("mock");
    let pool = VoicePool::new(&config, Box::new(backend.clone())).unwrap();
    backend.clear();
    (pool, backend)
}

/// Writes integer PCM points (interleaved if stereo) to a WAV file at 22050 Hz.
pub fn write_wav(
    path: &Path,
    channels: u16,
    bits: u16,
    points: &[i32],
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::new(
        File::create(path)?,
        WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        },
    )?;
    for point in points {
        match bits {
            8 => writer.write_sample(*point as i8)?,
            16 => writer.write_sample(*point as i16)?,
            _ => writer.write_sample(*point)?,
        }
    }
    writer.finalize()?;
    Ok(())
}
