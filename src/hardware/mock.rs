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

use parking_lot::Mutex;
use tracing::info;

use super::{BackendError, ChannelMask, PlayCommand, SoundFormat};

/// A command observed by the mock backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init,
    Play {
        channel: usize,
        repeat: bool,
        format: SoundFormat,
        rate: u32,
        volume: f32,
        pan: f32,
        byte_len: usize,
    },
    VolumePan {
        channel: usize,
        volume: f32,
        pan: f32,
    },
    Looping {
        channel: usize,
        looping: bool,
    },
    Rate {
        channel: usize,
        rate: u32,
    },
    Silence {
        channel: usize,
    },
    Shutdown,
}

/// A mock backend. Doesn't play anything; records every command it receives.
///
/// Clones share the same command log, so a test can keep one clone while the
/// voice pool owns another.
#[derive(Clone)]
pub struct Backend {
    name: String,
    mask: ChannelMask,
    fail_init: bool,
    commands: Arc<Mutex<Vec<Command>>>,
}

impl Backend {
    /// Gets a mock backend reporting every channel as available.
    pub fn get(name: &str) -> Backend {
        Backend {
            name: name.to_string(),
            mask: ChannelMask::MAX,
            fail_init: false,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reports the given channel mask from `init`.
    pub fn with_mask(mut self, mask: ChannelMask) -> Backend {
        self.mask = mask;
        self
    }

    /// Makes `init` fail.
    pub fn failing(mut self) -> Backend {
        self.fail_init = true;
        self
    }

    /// Returns a copy of every command received so far.
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    /// Returns the play commands received so far.
    pub fn plays(&self) -> Vec<Command> {
        self.commands
            .lock()
            .iter()
            .filter(|c| matches!(c, Command::Play { .. }))
            .cloned()
            .collect()
    }

    /// Forgets every command received so far.
    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    fn record(&self, command: Command) {
        self.commands.lock().push(command);
    }
}

impl super::Backend for Backend {
    fn init(&mut self) -> Result<ChannelMask, BackendError> {
        if self.fail_init {
            return Err(BackendError::Init(format!(
                "mock device {} configured to fail",
                self.name
            )));
        }
        info!(device = self.name, mask = self.mask, "Initialized mock audio");
        self.record(Command::Init);
        Ok(self.mask)
    }

    fn play(&mut self, channel: usize, command: PlayCommand) {
        self.record(Command::Play {
            channel,
            repeat: command.repeat,
            format: command.format,
            rate: command.rate,
            volume: command.volume,
            pan: command.pan,
            byte_len: command.byte_len,
        });
    }

    fn set_volume_pan(&mut self, channel: usize, volume: f32, pan: f32) {
        self.record(Command::VolumePan {
            channel,
            volume,
            pan,
        });
    }

    fn set_looping(&mut self, channel: usize, looping: bool) {
        self.record(Command::Looping { channel, looping });
    }

    fn set_rate(&mut self, channel: usize, rate: u32) {
        self.record(Command::Rate { channel, rate });
    }

    fn silence(&mut self, channel: usize) {
        self.record(Command::Silence { channel });
    }

    fn shutdown(&mut self) {
        self.record(Command::Shutdown);
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::Backend as _;

    #[test]
    fn test_clones_share_log() {
        let observer = Backend::get("mock");
        let mut backend = observer.clone();

        assert_eq!(backend.init().unwrap(), ChannelMask::MAX);
        backend.silence(3);

        assert_eq!(
            observer.commands(),
            vec![Command::Init, Command::Silence { channel: 3 }]
        );
        observer.clear();
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_failing_init() {
        let mut backend = Backend::get("mock").failing();
        assert!(matches!(backend.init(), Err(BackendError::Init(_))));
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_custom_mask() {
        let mut backend = Backend::get("mock").with_mask(0xFFFF_FF00);
        assert_eq!(backend.init().unwrap(), 0xFFFF_FF00);
    }
}
