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
use std::fmt;

/// Priority given to newly created samples.
pub const DEFAULT_PRIORITY: u8 = 128;

/// Errors produced when creating or loading a sample.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Unsupported bit depth {0} (expected 8 or 16)")]
    UnsupportedDepth(u16),

    #[error("Unsupported channel count {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    #[error("Unable to allocate {0} bytes of sample data")]
    Allocation(usize),

    #[error("Data length {0} is not a whole number of {1}-byte frames")]
    PartialFrame(usize, usize),

    #[error("Loop {0}..{1} is outside of a {2}-frame sample")]
    InvalidLoop(usize, usize, usize),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Bits per sample point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Signed 8-bit PCM.
    Eight,
    /// Signed 16-bit little-endian PCM.
    Sixteen,
}

impl BitDepth {
    /// Parses a depth from a bit count.
    pub fn from_bits(bits: u16) -> Result<BitDepth, SampleError> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            _ => Err(SampleError::UnsupportedDepth(bits)),
        }
    }

    /// The number of bits per sample point.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    /// The number of bytes per sample point.
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Channel layout. Stereo data is interleaved left/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Parses a layout from a channel count.
    pub fn from_count(count: u16) -> Result<Channels, SampleError> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            _ => Err(SampleError::UnsupportedChannels(count)),
        }
    }

    /// The number of interleaved channels.
    pub fn count(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }
}

/// A decoded audio buffer with fixed format metadata.
///
/// Samples are shared with voices behind an `Arc`; once handed to a voice the
/// sample is read-only. Playback rate and looping belong to the voice.
#[derive(Clone)]
pub struct Sample {
    depth: BitDepth,
    channels: Channels,
    frequency: u32,
    len: usize,
    loop_start: usize,
    loop_end: usize,
    priority: u8,
    data: Vec<u8>,
}

impl Sample {
    /// Creates a silent sample of `len` frames in the given format.
    pub fn new(
        depth: BitDepth,
        channels: Channels,
        frequency: u32,
        len: usize,
    ) -> Result<Sample, SampleError> {
        let size = len
            .checked_mul(depth.bytes() * channels.count())
            .ok_or(SampleError::Allocation(usize::MAX))?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| SampleError::Allocation(size))?;
        data.resize(size, 0);

        Ok(Sample {
            depth,
            channels,
            frequency,
            len,
            loop_start: 0,
            loop_end: len,
            priority: DEFAULT_PRIORITY,
            data,
        })
    }

    /// Wraps already-encoded PCM bytes. The data must hold whole frames.
    pub fn from_pcm(
        depth: BitDepth,
        channels: Channels,
        frequency: u32,
        data: Vec<u8>,
    ) -> Result<Sample, SampleError> {
        let frame_bytes = depth.bytes() * channels.count();
        if data.len() % frame_bytes != 0 {
            return Err(SampleError::PartialFrame(data.len(), frame_bytes));
        }

        let len = data.len() / frame_bytes;
        Ok(Sample {
            depth,
            channels,
            frequency,
            len,
            loop_start: 0,
            loop_end: len,
            priority: DEFAULT_PRIORITY,
            data,
        })
    }

    /// Builds a 16-bit sample from signed points (interleaved if stereo).
    pub fn from_i16(
        channels: Channels,
        frequency: u32,
        points: &[i16],
    ) -> Result<Sample, SampleError> {
        let data = points.iter().flat_map(|p| p.to_le_bytes()).collect();
        Sample::from_pcm(BitDepth::Sixteen, channels, frequency, data)
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// The native sample rate in Hz.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// The length in frames.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The size of one frame in bytes.
    pub fn frame_bytes(&self) -> usize {
        self.depth.bytes() * self.channels.count()
    }

    pub fn loop_start(&self) -> usize {
        self.loop_start
    }

    pub fn loop_end(&self) -> usize {
        self.loop_end
    }

    /// Sets the loop region in frames.
    pub fn set_loop(&mut self, start: usize, end: usize) -> Result<(), SampleError> {
        if start > end || end > self.len {
            return Err(SampleError::InvalidLoop(start, end, self.len));
        }
        self.loop_start = start;
        self.loop_end = end;
        Ok(())
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority;
    }

    /// Returns true if there is audio data to hand to the hardware.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// The raw PCM bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The raw PCM bytes, for filling in a freshly created sample.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The memory used by the sample data in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sample")
            .field("bits", &self.depth.bits())
            .field("channels", &self.channels.count())
            .field("frequency", &self.frequency)
            .field("len", &self.len)
            .field("loop", &(self.loop_start..self.loop_end))
            .field("priority", &self.priority)
            .finish()
    }
}
