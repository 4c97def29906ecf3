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

//! Software model of a bank of hardware channels.
//!
//! Each channel plays one PCM buffer at its own rate with nearest-neighbor
//! resampling, and the mixer sums every active channel into interleaved stereo.

use std::sync::Arc;

use crate::samples::{Channels, Sample};

use super::{PlayCommand, SoundFormat};

/// A command for the mixer, sent from the control thread to the audio thread.
#[derive(Debug, Clone)]
pub enum MixerCommand {
    Play(usize, PlayCommand),
    VolumePan(usize, f32, f32),
    Looping(usize, bool),
    Rate(usize, u32),
    Silence(usize),
}

/// The state of one channel.
#[derive(Default)]
struct Channel {
    sample: Option<Arc<Sample>>,
    format: Option<SoundFormat>,
    /// Number of playable frames in the buffer.
    frames: usize,
    rate: u32,
    volume: f32,
    pan: f32,
    looping: bool,
    /// Fractional read position in frames.
    cursor: f64,
    active: bool,
}

impl Channel {
    fn point(&self, data: &[u8], format: SoundFormat, index: usize) -> f32 {
        match format {
            SoundFormat::Pcm8 => data[index] as i8 as f32 / 128.0,
            SoundFormat::Pcm16 => {
                let offset = index * 2;
                i16::from_le_bytes([data[offset], data[offset + 1]]) as f32 / 32768.0
            }
        }
    }

    /// Returns the current left/right contribution and advances the cursor.
    fn next(&mut self, output_rate: u32) -> (f32, f32) {
        let (Some(sample), Some(format)) = (&self.sample, self.format) else {
            return (0.0, 0.0);
        };
        if !self.active || self.frames == 0 {
            return (0.0, 0.0);
        }

        let data = sample.data();
        let frame = self.cursor as usize;
        let (left, right) = match sample.channels() {
            Channels::Mono => {
                let point = self.point(data, format, frame);
                (point, point)
            }
            Channels::Stereo => (
                self.point(data, format, frame * 2),
                self.point(data, format, frame * 2 + 1),
            ),
        };

        let left_gain = self.volume * (1.0 - self.pan).min(1.0);
        let right_gain = self.volume * (1.0 + self.pan).min(1.0);

        self.cursor += self.rate as f64 / output_rate as f64;
        if self.cursor >= self.frames as f64 {
            if self.looping {
                self.cursor %= self.frames as f64;
            } else {
                self.active = false;
            }
        }

        (left * left_gain, right * right_gain)
    }
}

/// Mixes a fixed number of channels into interleaved stereo.
pub struct ChannelMixer {
    channels: Vec<Channel>,
    output_rate: u32,
}

impl ChannelMixer {
    /// Creates a mixer with `channel_count` silent channels.
    pub fn new(channel_count: usize, output_rate: u32) -> Self {
        Self {
            channels: (0..channel_count).map(|_| Channel::default()).collect(),
            output_rate,
        }
    }

    /// The output sample rate in Hz.
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// The number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns true if the channel is currently producing sound.
    pub fn is_active(&self, channel: usize) -> bool {
        self.channels.get(channel).is_some_and(|c| c.active)
    }

    /// Applies a command. Commands for channels outside the bank are dropped.
    pub fn apply(&mut self, command: MixerCommand) {
        match command {
            MixerCommand::Play(index, play) => {
                if let Some(channel) = self.channels.get_mut(index) {
                    let frame_bytes = play.format.bytes() * play.sample.channels().count();
                    channel.frames = play.data().len() / frame_bytes;
                    channel.format = Some(play.format);
                    channel.rate = play.rate;
                    channel.volume = play.volume;
                    channel.pan = play.pan;
                    channel.looping = play.repeat;
                    channel.cursor = 0.0;
                    channel.active = channel.frames > 0;
                    channel.sample = Some(play.sample);
                }
            }
            MixerCommand::VolumePan(index, volume, pan) => {
                if let Some(channel) = self.channels.get_mut(index) {
                    channel.volume = volume;
                    channel.pan = pan;
                }
            }
            MixerCommand::Looping(index, looping) => {
                if let Some(channel) = self.channels.get_mut(index) {
                    channel.looping = looping;
                }
            }
            MixerCommand::Rate(index, rate) => {
                if let Some(channel) = self.channels.get_mut(index) {
                    channel.rate = rate;
                }
            }
            MixerCommand::Silence(index) => {
                if let Some(channel) = self.channels.get_mut(index) {
                    channel.active = false;
                    channel.sample = None;
                }
            }
        }
    }

    /// Mixes `output.len() / 2` stereo frames into `output`, overwriting it.
    pub fn mix_into(&mut self, output: &mut [f32]) {
        for frame in output.chunks_exact_mut(2) {
            let mut left = 0.0;
            let mut right = 0.0;
            for channel in self.channels.iter_mut().filter(|c| c.active) {
                let (l, r) = channel.next(self.output_rate);
                left += l;
                right += r;
            }
            frame[0] = left.clamp(-1.0, 1.0);
            frame[1] = right.clamp(-1.0, 1.0);
        }
    }
}
