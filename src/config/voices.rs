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
use serde::Deserialize;

/// Default number of voices in the pool.
pub const DEFAULT_CAPACITY: usize = 32;

/// Largest pool the allocation mask can describe.
pub const MAX_CAPACITY: usize = 64;

/// A YAML representation of the voice pool configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Voices {
    /// Number of voices in the pool (default: 32).
    capacity: Option<usize>,

    /// How frequency sweeps and volume ramps behave.
    #[serde(default)]
    transitions: TransitionMode,

    /// How the byte length handed to the hardware is computed.
    #[serde(default)]
    stereo_length: StereoLength,

    /// The play mode a voice gets when it is allocated.
    #[serde(default)]
    default_play_mode: PlayMode,
}

impl Voices {
    /// Creates a voice configuration with the given capacity and defaults for
    /// everything else.
    pub fn new(capacity: usize) -> Voices {
        Voices {
            capacity: Some(capacity),
            ..Default::default()
        }
    }

    /// Sets the transition mode.
    pub fn with_transitions(mut self, transitions: TransitionMode) -> Voices {
        self.transitions = transitions;
        self
    }

    /// Sets the stereo length policy.
    pub fn with_stereo_length(mut self, stereo_length: StereoLength) -> Voices {
        self.stereo_length = stereo_length;
        self
    }

    /// Sets the play mode given to newly allocated voices.
    pub fn with_default_play_mode(mut self, mode: PlayMode) -> Voices {
        self.default_play_mode = mode;
        self
    }

    /// Returns the pool capacity (default: 32).
    pub fn capacity(&self) -> usize {
        self.capacity.unwrap_or(DEFAULT_CAPACITY)
    }

    pub fn transitions(&self) -> TransitionMode {
        self.transitions
    }

    pub fn stereo_length(&self) -> StereoLength {
        self.stereo_length
    }

    pub fn default_play_mode(&self) -> PlayMode {
        self.default_play_mode
    }
}

/// How `sweep_frequency` and `ramp_volume` reach their target.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Jump straight to the target value.
    #[default]
    Instant,
    /// Move linearly to the target over the requested time.
    Interpolated,
}

/// How the byte length of a play command is computed.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StereoLength {
    /// Whole frames: `len * bytes_per_point * channels`.
    #[default]
    Frames,
    /// `len * bits / 8`, ignoring the channel count. Stereo samples play only
    /// their first half.
    Legacy,
}

/// Whether a voice repeats its sample.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Play the sample once.
    Play,
    /// Repeat the sample until stopped.
    #[default]
    Loop,
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    #[test]
    fn test_voices_deserialize() {
        let yaml = r#"
            capacity: 8
            transitions: interpolated
            stereo_length: legacy
            default_play_mode: play
        "#;

        let voices: Voices = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(voices.capacity(), 8);
        assert_eq!(voices.transitions(), TransitionMode::Interpolated);
        assert_eq!(voices.stereo_length(), StereoLength::Legacy);
        assert_eq!(voices.default_play_mode(), PlayMode::Play);
    }

    #[test]
    fn test_voices_defaults() {
        let voices = Voices::default();
        assert_eq!(voices.capacity(), DEFAULT_CAPACITY);
        assert_eq!(voices.transitions(), TransitionMode::Instant);
        assert_eq!(voices.stereo_length(), StereoLength::Frames);
        assert_eq!(voices.default_play_mode(), PlayMode::Loop);
    }

    #[test]
    fn test_builders() {
        let voices = Voices::new(2)
            .with_transitions(TransitionMode::Interpolated)
            .with_stereo_length(StereoLength::Legacy)
            .with_default_play_mode(PlayMode::Play);
        assert_eq!(voices.capacity(), 2);
        assert_eq!(voices.transitions(), TransitionMode::Interpolated);
        assert_eq!(voices.stereo_length(), StereoLength::Legacy);
        assert_eq!(voices.default_play_mode(), PlayMode::Play);
    }
}
