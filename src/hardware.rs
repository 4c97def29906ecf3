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

//! The hardware channel boundary.
//!
//! The voice pool drives a [`Backend`] with channel-level commands. Commands are
//! fire-and-forget: nothing is acknowledged and nothing blocks.

use std::{fmt, sync::Arc};

use crate::config;
use crate::samples::{BitDepth, Sample};

pub mod cpal;
pub mod mixer;
pub mod mock;

/// One bit per hardware channel; a set bit means the channel is available.
pub type ChannelMask = u64;

/// Errors reported by a backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Audio hardware failed to initialize: {0}")]
    Init(String),

    #[error("No audio device found with name {0}")]
    NoDevice(String),

    #[error("Audio device error: {0}")]
    Device(String),
}

/// PCM encoding of the buffer handed to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    Pcm8,
    Pcm16,
}

impl SoundFormat {
    /// Bytes per sample point.
    pub fn bytes(self) -> usize {
        match self {
            SoundFormat::Pcm8 => 1,
            SoundFormat::Pcm16 => 2,
        }
    }
}

impl From<BitDepth> for SoundFormat {
    fn from(depth: BitDepth) -> Self {
        match depth {
            BitDepth::Eight => SoundFormat::Pcm8,
            BitDepth::Sixteen => SoundFormat::Pcm16,
        }
    }
}

/// Everything a channel needs to start playing a buffer.
#[derive(Clone)]
pub struct PlayCommand {
    /// Whether the channel repeats the buffer when it reaches the end.
    pub repeat: bool,
    pub format: SoundFormat,
    /// Playback rate in Hz.
    pub rate: u32,
    /// Volume in `0.0..=1.0`.
    pub volume: f32,
    /// Pan in `-1.0..=1.0`, negative is left.
    pub pan: f32,
    /// The sample whose data is played.
    pub sample: Arc<Sample>,
    /// How many bytes of the sample data the channel plays.
    pub byte_len: usize,
}

impl PlayCommand {
    /// The bytes the channel will play.
    pub fn data(&self) -> &[u8] {
        let data = self.sample.data();
        &data[..self.byte_len.min(data.len())]
    }
}

impl fmt::Debug for PlayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayCommand")
            .field("repeat", &self.repeat)
            .field("format", &self.format)
            .field("rate", &self.rate)
            .field("volume", &self.volume)
            .field("pan", &self.pan)
            .field("byte_len", &self.byte_len)
            .finish()
    }
}

/// A set of hardware audio channels.
pub trait Backend: fmt::Display + Send {
    /// Starts the audio subsystem and reports which channels are available.
    fn init(&mut self) -> Result<ChannelMask, BackendError>;

    /// Plays a buffer on the channel, replacing whatever it was playing.
    fn play(&mut self, channel: usize, command: PlayCommand);

    /// Updates volume and pan without restarting the channel.
    fn set_volume_pan(&mut self, channel: usize, volume: f32, pan: f32);

    /// Enables or disables looping on the channel.
    fn set_looping(&mut self, channel: usize, looping: bool);

    /// Updates the playback rate without restarting the channel.
    fn set_rate(&mut self, channel: usize, rate: u32);

    /// Silences the channel.
    fn silence(&mut self, channel: usize);

    /// Stops the audio subsystem. No further commands are issued afterwards.
    fn shutdown(&mut self) {}
}

/// Gets the backend named by the configuration. Device names starting with
/// "mock" get a recording mock backend.
pub fn get_backend(config: &config::Audio) -> Result<Box<dyn Backend>, BackendError> {
    let device = config.device();
    if device.starts_with("mock") {
        return Ok(Box::new(mock::Backend::get(device)));
    }

    Ok(Box::new(cpal::Backend::get(config)?))
}

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, BackendError> {
    cpal::Backend::list()
}
