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
use std::{fmt, sync::Arc};

use crate::config::PlayMode;
use crate::samples::Sample;

use super::transition::Ramp;

/// Identifies one slot of a voice pool. The index doubles as the hardware
/// channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(usize);

impl VoiceId {
    pub fn new(index: usize) -> VoiceId {
        VoiceId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice {}", self.0)
    }
}

/// Where a voice is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStatus {
    /// The slot is free.
    Idle,
    /// Allocated, not playing.
    Stopped,
    /// Allocated and playing. Looping voices stay here until stopped.
    Playing,
}

/// Converts a 0..=255 volume to the normalized form.
pub(crate) fn volume_from_byte(volume: u8) -> f32 {
    volume as f32 / 255.0
}

pub(crate) fn volume_to_byte(volume: f32) -> u8 {
    (volume * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Converts a 0..=255 pan (128 is center) to `-1.0..=1.0`.
pub(crate) fn pan_from_byte(pan: u8) -> f32 {
    (pan as f32 / 128.0 - 1.0).clamp(-1.0, 1.0)
}

pub(crate) fn pan_to_byte(pan: f32) -> u8 {
    ((pan + 1.0) * 128.0).round().clamp(0.0, 255.0) as u8
}

/// Mutable state of one voice slot.
#[derive(Debug, Clone)]
pub(crate) struct Voice {
    pub(crate) playing: bool,
    /// Playback position in frames. Bookkeeping only.
    pub(crate) position: usize,
    /// Playback rate in Hz.
    pub(crate) rate: u32,
    /// `0.0..=1.0`
    pub(crate) volume: f32,
    /// `-1.0..=1.0`, negative is left.
    pub(crate) pan: f32,
    pub(crate) mode: PlayMode,
    pub(crate) sample: Option<Arc<Sample>>,
    /// Pending frequency sweep.
    pub(crate) sweep: Option<Ramp>,
    /// Pending volume ramp.
    pub(crate) ramp: Option<Ramp>,
}

impl Voice {
    pub(crate) fn new(mode: PlayMode) -> Voice {
        Voice {
            playing: false,
            position: 0,
            rate: 0,
            volume: 1.0,
            pan: 0.0,
            mode,
            sample: None,
            sweep: None,
            ramp: None,
        }
    }

    /// Binds a sample and resets the playback fields. Volume and pan carry over
    /// from the previous owner of the slot.
    pub(crate) fn assign(&mut self, sample: Arc<Sample>, mode: PlayMode) {
        self.playing = false;
        self.position = 0;
        self.rate = sample.frequency();
        self.mode = mode;
        self.sweep = None;
        self.ramp = None;
        self.sample = Some(sample);
    }

    /// The sample, if it has data the hardware can play.
    pub(crate) fn playable_sample(&self) -> Option<&Arc<Sample>> {
        self.sample.as_ref().filter(|sample| sample.has_data())
    }

    pub(crate) fn is_looping(&self) -> bool {
        self.mode == PlayMode::Loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::Channels;

    #[test]
    fn test_volume_conversion() {
        assert_eq!(volume_from_byte(0), 0.0);
        assert_eq!(volume_from_byte(255), 1.0);
        for volume in 0..=255u8 {
            assert_eq!(volume_to_byte(volume_from_byte(volume)), volume);
        }
    }

    #[test]
    fn test_pan_conversion() {
        assert_eq!(pan_from_byte(0), -1.0);
        assert_eq!(pan_from_byte(128), 0.0);
        assert_eq!(pan_from_byte(255), 127.0 / 128.0);
        for pan in 0..=255u8 {
            assert_eq!(pan_to_byte(pan_from_byte(pan)), pan);
        }
    }

    #[test]
    fn test_assign_resets_playback_fields() {
        let mut voice = Voice::new(PlayMode::Loop);
        voice.playing = true;
        voice.position = 40;
        voice.volume = 0.5;
        voice.pan = -0.5;

        let sample = Arc::new(Sample::from_i16(Channels::Mono, 11025, &[1, 2]).unwrap());
        voice.assign(sample, PlayMode::Play);

        assert!(!voice.playing);
        assert_eq!(voice.position, 0);
        assert_eq!(voice.rate, 11025);
        assert_eq!(voice.mode, PlayMode::Play);
        assert_eq!(voice.volume, 0.5);
        assert_eq!(voice.pan, -0.5);
        assert!(voice.playable_sample().is_some());
    }

    #[test]
    fn test_empty_sample_is_not_playable() {
        let mut voice = Voice::new(PlayMode::Loop);
        assert!(voice.playable_sample().is_none());

        let sample = Arc::new(Sample::from_i16(Channels::Mono, 8000, &[]).unwrap());
        voice.assign(sample, PlayMode::Loop);
        assert!(voice.playable_sample().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(VoiceId::new(7).to_string(), "voice 7");
    }
}
