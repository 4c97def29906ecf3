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
use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use duration_string::DurationString;
use serde::Deserialize;
use tracing::info;

mod audio;
mod error;
mod voices;

pub use self::audio::Audio;
pub use self::error::ConfigError;
pub use self::voices::{
    PlayMode, StereoLength, TransitionMode, Voices, DEFAULT_CAPACITY, MAX_CAPACITY,
};

/// The runtime configuration: which output to use and how the voice pool behaves.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RuntimeConfig {
    #[serde(default)]
    audio: Audio,

    #[serde(default)]
    voices: Voices,
}

impl RuntimeConfig {
    /// Creates a configuration from its parts.
    pub fn new(audio: Audio, voices: Voices) -> RuntimeConfig {
        RuntimeConfig { audio, voices }
    }

    /// Deserializes and validates a YAML configuration file.
    pub fn deserialize(path: &Path) -> Result<RuntimeConfig, ConfigError> {
        let config: RuntimeConfig = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        config.validate()?;

        info!(
            path = %path.display(),
            device = config.audio.device(),
            capacity = config.voices.capacity(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let capacity = self.voices.capacity();
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(ConfigError::Capacity {
                got: capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }

    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn voices(&self) -> &Voices {
        &self.voices
    }
}

/// Parses a human readable duration such as `2s` or `150ms`.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let duration = DurationString::from_string(value.to_string())
        .map_err(|e| ConfigError::Duration(value.to_string(), e.to_string()))?;
    Ok(duration.into())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_deserialize_full() {
        let file = write_config(
            r#"
audio:
  device: mock-device
  sample_rate: 22050
voices:
  capacity: 16
  transitions: interpolated
  stereo_length: legacy
  default_play_mode: play
"#,
        );

        let config = RuntimeConfig::deserialize(file.path()).unwrap();
        assert_eq!(config.audio().device(), "mock-device");
        assert_eq!(config.audio().sample_rate(), Some(22050));
        assert_eq!(config.voices().capacity(), 16);
        assert_eq!(config.voices().transitions(), TransitionMode::Interpolated);
        assert_eq!(config.voices().stereo_length(), StereoLength::Legacy);
        assert_eq!(config.voices().default_play_mode(), PlayMode::Play);
    }

    #[test]
    fn test_deserialize_defaults() {
        let file = write_config("audio:\n  device: mock\n");

        let config = RuntimeConfig::deserialize(file.path()).unwrap();
        assert_eq!(config.audio().device(), "mock");
        assert_eq!(config.voices().capacity(), DEFAULT_CAPACITY);
        assert_eq!(config.voices().transitions(), TransitionMode::Instant);
    }

    #[test]
    fn test_capacity_out_of_range() {
        for capacity in [0, 65] {
            let file = write_config(&format!("voices:\n  capacity: {}\n", capacity));
            match RuntimeConfig::deserialize(file.path()) {
                Err(ConfigError::Capacity { got, max }) => {
                    assert_eq!(got, capacity);
                    assert_eq!(max, 64);
                }
                other => panic!("expected capacity error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_missing_file() {
        let result = RuntimeConfig::deserialize(Path::new("/nonexistent/pixvox.yaml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert!(matches!(
            parse_duration("soon"),
            Err(ConfigError::Duration(value, _)) if value == "soon"
        ));
    }

    #[test]
    fn test_invalid_transition_mode() {
        let file = write_config("voices:\n  transitions: bouncy\n");
        assert!(matches!(
            RuntimeConfig::deserialize(file.path()),
            Err(ConfigError::Load(_))
        ));
    }
}
