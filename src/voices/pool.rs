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
use std::{fmt, sync::Arc, time::Duration};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, span, warn, Level};

use crate::config::{self, PlayMode, StereoLength, TransitionMode, MAX_CAPACITY};
use crate::hardware::{Backend, BackendError, ChannelMask, PlayCommand};
use crate::samples::Sample;

use super::transition::Ramp;
use super::voice::{
    pan_from_byte, pan_to_byte, volume_from_byte, volume_to_byte, Voice, VoiceId, VoiceStatus,
};

/// Errors produced by the voice pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Audio hardware failed to initialize: {0}")]
    Init(#[from] BackendError),

    #[error("Voice pool capacity must be between 1 and 64 (got {0})")]
    Capacity(usize),

    #[error("No voice {0} in this pool")]
    InvalidVoice(usize),
}

/// The mask with one bit set for each of the first `capacity` slots.
fn capacity_mask(capacity: usize) -> ChannelMask {
    if capacity >= MAX_CAPACITY {
        ChannelMask::MAX
    } else {
        ((1 as ChannelMask) << capacity) - 1
    }
}

/// A fixed set of voices bound to hardware channels.
///
/// Voice `i` drives hardware channel `i`. A set bit in the free mask marks a
/// slot that can be allocated; slots the hardware didn't report at init are
/// never handed out.
pub struct VoicePool {
    backend: Box<dyn Backend>,
    voices: Vec<Voice>,
    /// Channels the hardware reported at init, restricted to the capacity.
    available: ChannelMask,
    /// Set bits are free slots.
    free: ChannelMask,
    transitions: TransitionMode,
    stereo_length: StereoLength,
    default_play_mode: PlayMode,
    shut_down: bool,
}

impl fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoicePool")
            .field("backend", &self.backend.to_string())
            .field("capacity", &self.voices.len())
            .field("free", &format_args!("{:#x}", self.free))
            .finish()
    }
}

impl VoicePool {
    /// Initializes the backend and creates the pool. If the hardware fails to
    /// come up no pool exists.
    pub fn new(
        config: &config::Voices,
        mut backend: Box<dyn Backend>,
    ) -> Result<VoicePool, PoolError> {
        let span = span!(Level::INFO, "voice pool init");
        let _enter = span.enter();

        let capacity = config.capacity();
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(PoolError::Capacity(capacity));
        }

        let mask = backend.init()?;
        let available = mask & capacity_mask(capacity);
        info!(
            backend = backend.to_string(),
            capacity,
            available = format!("{:#x}", available),
            "Voice pool initialized"
        );

        Ok(VoicePool {
            backend,
            voices: (0..capacity)
                .map(|_| Voice::new(config.default_play_mode()))
                .collect(),
            available,
            free: available,
            transitions: config.transitions(),
            stereo_length: config.stereo_length(),
            default_play_mode: config.default_play_mode(),
            shut_down: false,
        })
    }

    /// The number of slots in the pool.
    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    /// The free mask. A set bit is a free slot.
    pub fn free_mask(&self) -> ChannelMask {
        self.free
    }

    /// The number of allocated voices.
    pub fn allocated_count(&self) -> usize {
        (self.available & !self.free).count_ones() as usize
    }

    fn bit(voice: VoiceId) -> ChannelMask {
        (1 as ChannelMask) << voice.index()
    }

    fn is_allocated(&self, voice: VoiceId) -> bool {
        let bit = Self::bit(voice);
        self.available & bit != 0 && self.free & bit == 0
    }

    /// Rejects ids past the capacity and channels the hardware didn't report,
    /// so no command ever reaches a channel the pool doesn't own.
    fn check(&self, voice: VoiceId) -> Result<usize, PoolError> {
        if voice.index() < self.voices.len() && self.available & Self::bit(voice) != 0 {
            Ok(voice.index())
        } else {
            Err(PoolError::InvalidVoice(voice.index()))
        }
    }

    /// Allocates the lowest free slot for the sample. Returns `None` when every
    /// slot is in use.
    pub fn allocate(&mut self, sample: Arc<Sample>) -> Option<VoiceId> {
        if self.free == 0 {
            debug!(capacity = self.capacity(), "No free voices");
            return None;
        }

        let index = self.free.trailing_zeros() as usize;
        self.free &= !Self::bit(VoiceId::new(index));
        self.voices[index].assign(sample, self.default_play_mode);
        debug!(voice = index, "Voice allocated");
        Some(VoiceId::new(index))
    }

    /// Silences the voice and returns its slot to the pool. Deallocating a free
    /// slot only silences the channel again.
    pub fn deallocate(&mut self, voice: VoiceId) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        self.stop(voice)?;
        let slot = &mut self.voices[index];
        slot.sweep = None;
        slot.ramp = None;
        self.free |= Self::bit(voice) & self.available;
        debug!(voice = index, "Voice deallocated");
        Ok(())
    }

    /// Sets whether the voice repeats its sample. Doesn't start playback.
    pub fn set_play_mode(&mut self, voice: VoiceId, mode: PlayMode) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        self.voices[index].mode = mode;
        self.backend.set_looping(index, mode == PlayMode::Loop);
        Ok(())
    }

    pub fn play_mode(&self, voice: VoiceId) -> Result<PlayMode, PoolError> {
        Ok(self.voices[self.check(voice)?].mode)
    }

    /// Starts the voice from the beginning of its sample. Free slots and voices
    /// without sample data are ignored.
    pub fn start(&mut self, voice: VoiceId) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        if !self.is_allocated(voice) {
            warn!(voice = index, "Ignoring start of a free voice");
            return Ok(());
        }

        let slot = &mut self.voices[index];
        let Some(sample) = slot.playable_sample().cloned() else {
            warn!(voice = index, "Ignoring start of a voice without sample data");
            return Ok(());
        };

        let byte_len = match self.stereo_length {
            StereoLength::Frames => sample.len() * sample.frame_bytes(),
            StereoLength::Legacy => sample.len() * sample.depth().bits() as usize / 8,
        };

        slot.playing = true;
        let command = PlayCommand {
            repeat: slot.is_looping(),
            format: sample.depth().into(),
            rate: slot.rate,
            volume: slot.volume,
            pan: slot.pan,
            sample,
            byte_len,
        };
        debug!(voice = index, command = ?command, "Voice started");
        self.backend.play(index, command);
        Ok(())
    }

    /// Silences the voice. It stays allocated.
    pub fn stop(&mut self, voice: VoiceId) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        self.backend.silence(index);
        self.voices[index].playing = false;
        Ok(())
    }

    /// Records the playback position. Rewinding a playing voice to frame 0
    /// restarts it; any other position is bookkeeping only.
    pub fn set_position(&mut self, voice: VoiceId, position: usize) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        let slot = &mut self.voices[index];
        slot.position = position;
        if slot.playing && position == 0 {
            self.start(voice)?;
        }
        Ok(())
    }

    pub fn position(&self, voice: VoiceId) -> Result<usize, PoolError> {
        Ok(self.voices[self.check(voice)?].position)
    }

    /// Sets the playback rate in Hz. A playing voice restarts at the new rate.
    pub fn set_frequency(&mut self, voice: VoiceId, rate: u32) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        let slot = &mut self.voices[index];
        slot.rate = rate;
        slot.sweep = None;
        if slot.playing {
            self.start(voice)?;
        }
        Ok(())
    }

    pub fn frequency(&self, voice: VoiceId) -> Result<u32, PoolError> {
        Ok(self.voices[self.check(voice)?].rate)
    }

    /// Sets the volume from 0 (silent) to 255 (full).
    pub fn set_volume(&mut self, voice: VoiceId, volume: u8) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        let slot = &mut self.voices[index];
        slot.volume = volume_from_byte(volume);
        slot.ramp = None;
        self.push_volume_pan(index);
        Ok(())
    }

    pub fn volume(&self, voice: VoiceId) -> Result<u8, PoolError> {
        Ok(volume_to_byte(self.voices[self.check(voice)?].volume))
    }

    /// Sets the pan from 0 (left) through 128 (center) to 255 (right).
    pub fn set_pan(&mut self, voice: VoiceId, pan: u8) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        self.voices[index].pan = pan_from_byte(pan);
        self.push_volume_pan(index);
        Ok(())
    }

    pub fn pan(&self, voice: VoiceId) -> Result<u8, PoolError> {
        Ok(pan_to_byte(self.voices[self.check(voice)?].pan))
    }

    fn push_volume_pan(&mut self, index: usize) {
        let slot = &self.voices[index];
        if slot.playing {
            self.backend.set_volume_pan(index, slot.volume, slot.pan);
        }
    }

    fn push_rate(&mut self, index: usize) {
        let slot = &self.voices[index];
        if slot.playing {
            self.backend.set_rate(index, slot.rate);
        }
    }

    /// Moves the playback rate to `end_rate` over `time`. Playback is never
    /// restarted.
    pub fn sweep_frequency(
        &mut self,
        voice: VoiceId,
        time: Duration,
        end_rate: u32,
    ) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        let slot = &mut self.voices[index];
        if self.transitions == TransitionMode::Instant || time.is_zero() {
            slot.sweep = None;
            slot.rate = end_rate;
            self.push_rate(index);
            return Ok(());
        }

        debug!(voice = index, from = slot.rate, to = end_rate, ?time, "Sweeping frequency");
        slot.sweep = Some(Ramp::new(slot.rate as f32, end_rate as f32, time));
        Ok(())
    }

    /// Moves the volume to `end_volume` (0..=255) over `time`.
    pub fn ramp_volume(
        &mut self,
        voice: VoiceId,
        time: Duration,
        end_volume: u8,
    ) -> Result<(), PoolError> {
        let index = self.check(voice)?;
        if self.transitions == TransitionMode::Instant || time.is_zero() {
            return self.set_volume(voice, end_volume);
        }

        let slot = &mut self.voices[index];
        debug!(voice = index, from = slot.volume, to = end_volume, ?time, "Ramping volume");
        slot.ramp = Some(Ramp::new(slot.volume, volume_from_byte(end_volume), time));
        Ok(())
    }

    /// Advances pending sweeps and ramps by `elapsed`, pushing the new values to
    /// playing channels. Does nothing unless transitions are interpolated.
    pub fn advance(&mut self, elapsed: Duration) {
        for index in 0..self.voices.len() {
            let slot = &mut self.voices[index];

            if let Some(sweep) = slot.sweep.as_mut() {
                let rate = sweep.advance(elapsed).round() as u32;
                if sweep.is_done() {
                    slot.sweep = None;
                }
                if rate != slot.rate {
                    slot.rate = rate;
                    self.push_rate(index);
                }
            }

            let slot = &mut self.voices[index];
            if let Some(ramp) = slot.ramp.as_mut() {
                let volume = ramp.advance(elapsed).clamp(0.0, 1.0);
                if ramp.is_done() {
                    slot.ramp = None;
                }
                if volume != slot.volume {
                    slot.volume = volume;
                    self.push_volume_pan(index);
                }
            }
        }
    }

    /// Returns true if the voice has a sweep or ramp in progress.
    pub fn is_transitioning(&self, voice: VoiceId) -> Result<bool, PoolError> {
        let slot = &self.voices[self.check(voice)?];
        Ok(slot.sweep.is_some() || slot.ramp.is_some())
    }

    pub fn voice_state(&self, voice: VoiceId) -> Result<VoiceStatus, PoolError> {
        let index = self.check(voice)?;
        if !self.is_allocated(voice) {
            Ok(VoiceStatus::Idle)
        } else if self.voices[index].playing {
            Ok(VoiceStatus::Playing)
        } else {
            Ok(VoiceStatus::Stopped)
        }
    }

    /// The sample assigned to the voice, if any.
    pub fn sample(&self, voice: VoiceId) -> Result<Option<Arc<Sample>>, PoolError> {
        Ok(self.voices[self.check(voice)?].sample.clone())
    }

    /// Silences every allocated voice and shuts the backend down.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.shut_down {
            return;
        }
        for index in 0..self.voices.len() {
            if self.is_allocated(VoiceId::new(index)) {
                self.backend.silence(index);
                self.voices[index].playing = false;
            }
        }
        self.backend.shutdown();
        self.shut_down = true;
        info!(backend = self.backend.to_string(), "Voice pool shut down");
    }
}

impl Drop for VoicePool {
    fn drop(&mut self) {
        self.close();
    }
}

/// A voice pool shared between threads. Every operation goes through one lock,
/// so an allocation scan and the bit it clears can't interleave with another
/// thread's.
#[derive(Clone, Debug)]
pub struct SharedVoicePool {
    pool: Arc<Mutex<VoicePool>>,
}

impl SharedVoicePool {
    pub fn new(pool: VoicePool) -> SharedVoicePool {
        SharedVoicePool {
            pool: Arc::new(Mutex::new(pool)),
        }
    }

    /// Locks the pool for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, VoicePool> {
        self.pool.lock()
    }

    pub fn allocate(&self, sample: Arc<Sample>) -> Option<VoiceId> {
        self.pool.lock().allocate(sample)
    }

    pub fn deallocate(&self, voice: VoiceId) -> Result<(), PoolError> {
        self.pool.lock().deallocate(voice)
    }

    pub fn start(&self, voice: VoiceId) -> Result<(), PoolError> {
        self.pool.lock().start(voice)
    }

    pub fn stop(&self, voice: VoiceId) -> Result<(), PoolError> {
        self.pool.lock().stop(voice)
    }
}
