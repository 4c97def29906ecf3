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

//! WAV loading and caching.
//!
//! Samples are decoded entirely into memory so voices can start them without
//! touching the disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hound::{SampleFormat, WavReader};
use tracing::{debug, info};

use super::sample::{BitDepth, Channels, Sample, SampleError};

/// Loads PCM WAV files into samples, caching them by path.
#[derive(Default)]
pub struct SampleLoader {
    cache: HashMap<PathBuf, Arc<Sample>>,
}

impl SampleLoader {
    /// Creates a new sample loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a sample from a WAV file. Returns the cached copy if the file has
    /// been loaded before.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Sample>, SampleError> {
        if let Some(sample) = self.cache.get(path) {
            debug!(path = ?path, "Using cached sample");
            return Ok(sample.clone());
        }

        info!(path = ?path, "Loading sample into memory");
        let sample = Arc::new(decode_wav(path)?);

        info!(
            path = ?path,
            bits = sample.depth().bits(),
            channels = sample.channels().count(),
            frequency = sample.frequency(),
            frames = sample.len(),
            memory_kb = sample.memory_size() / 1024,
            "Sample loaded"
        );

        self.cache.insert(path.to_path_buf(), sample.clone());
        Ok(sample)
    }

    /// Returns the number of cached samples.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Returns the memory used by all cached samples in bytes.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.values().map(|s| s.memory_size()).sum()
    }

    /// Drops every cached sample. Voices still holding a sample keep it alive.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Decodes an 8-bit or 16-bit integer PCM WAV file.
fn decode_wav(path: &Path) -> Result<Sample, SampleError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int {
        return Err(SampleError::UnsupportedDepth(spec.bits_per_sample));
    }
    let depth = BitDepth::from_bits(spec.bits_per_sample)?;
    let channels = Channels::from_count(spec.channels)?;

    let data = match depth {
        BitDepth::Eight => reader
            .samples::<i8>()
            .map(|s| s.map(|s| s as u8))
            .collect::<Result<Vec<u8>, hound::Error>>()?,
        BitDepth::Sixteen => {
            let mut data = Vec::with_capacity(reader.len() as usize * 2);
            for point in reader.samples::<i16>() {
                data.extend_from_slice(&point?.to_le_bytes());
            }
            data
        }
    };

    Sample::from_pcm(depth, channels, spec.sample_rate, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_wav;

    #[test]
    fn test_load_16_bit_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 16, &[1, -1, 256, -256]).unwrap();

        let mut loader = SampleLoader::new();
        let sample = loader.load(&path).unwrap();

        assert_eq!(sample.depth(), BitDepth::Sixteen);
        assert_eq!(sample.channels(), Channels::Stereo);
        assert_eq!(sample.frequency(), 22050);
        assert_eq!(sample.len(), 2);
        assert_eq!(
            sample.data(),
            &[0x01, 0x00, 0xFF, 0xFF, 0x00, 0x01, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_load_8_bit_is_signed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 8, &[0, 127, -128]).unwrap();

        let mut loader = SampleLoader::new();
        let sample = loader.load(&path).unwrap();

        assert_eq!(sample.depth(), BitDepth::Eight);
        assert_eq!(sample.data(), &[0x00, 0x7F, 0x80]);
    }

    #[test]
    fn test_rejects_unsupported_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.wav");
        write_wav(&path, 1, 32, &[1, 2, 3]).unwrap();

        let mut loader = SampleLoader::new();
        assert!(matches!(
            loader.load(&path),
            Err(SampleError::UnsupportedDepth(32))
        ));
        assert_eq!(loader.cached_count(), 0);
    }

    #[test]
    fn test_cache_reuses_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached.wav");
        write_wav(&path, 1, 16, &[5; 100]).unwrap();

        let mut loader = SampleLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached_count(), 1);
        assert_eq!(loader.total_memory_usage(), 200);

        loader.clear();
        assert_eq!(loader.cached_count(), 0);
        assert_eq!(first.len(), 100);
    }

    #[test]
    fn test_missing_file() {
        let mut loader = SampleLoader::new();
        assert!(matches!(
            loader.load(Path::new("/nonexistent/pixvox.wav")),
            Err(SampleError::Wav(_))
        ));
    }
}
