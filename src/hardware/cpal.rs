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
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, span, Level};

use super::mixer::{ChannelMixer, MixerCommand};
use super::{BackendError, ChannelMask, PlayCommand};
use crate::config;

/// Number of software channels the mixer provides.
const CHANNEL_COUNT: usize = 64;

/// A backend that mixes its channels in software and renders them through a
/// cpal output stream.
pub struct Backend {
    /// The name of the device.
    name: String,
    /// The underlying cpal device.
    device: cpal::Device,
    /// The requested output rate, or the device default when unset.
    sample_rate: Option<u32>,
    /// Commands for the mixer living on the audio thread.
    command_tx: Sender<MixerCommand>,
    command_rx: Receiver<MixerCommand>,
    /// Set to stop the output thread.
    stop: Arc<AtomicBool>,
    /// Handle to the output thread (keeps the stream alive).
    output_thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cpal)", self.name)
    }
}

fn device_name(device: &cpal::Device) -> Result<String, BackendError> {
    Ok(device
        .description()
        .map_err(|e| BackendError::Device(e.to_string()))?
        .name()
        .to_string())
}

impl Backend {
    /// Lists output devices on every available host.
    pub fn list() -> Result<Vec<String>, BackendError> {
        let mut devices = Vec::new();
        for host_id in cpal::available_hosts() {
            let host =
                cpal::host_from_id(host_id).map_err(|e| BackendError::Device(e.to_string()))?;
            let host_devices = match host.output_devices() {
                Ok(host_devices) => host_devices,
                Err(e) => {
                    error!(
                        err = e.to_string(),
                        host = host_id.name(),
                        "Unable to list devices for host"
                    );
                    continue;
                }
            };

            for device in host_devices {
                devices.push(format!("{} ({})", device_name(&device)?, host_id.name()));
            }
        }

        devices.sort();
        Ok(devices)
    }

    /// Gets the device named in the configuration. "default" selects the
    /// default output device of the default host.
    pub fn get(config: &config::Audio) -> Result<Backend, BackendError> {
        let name = config.device();
        let host = cpal::default_host();

        let device = if name == "default" {
            host.default_output_device()
                .ok_or_else(|| BackendError::NoDevice(name.to_string()))?
        } else {
            let mut found = None;
            for device in host
                .output_devices()
                .map_err(|e| BackendError::Device(e.to_string()))?
            {
                if device_name(&device)?.trim() == name {
                    found = Some(device);
                    break;
                }
            }
            found.ok_or_else(|| BackendError::NoDevice(name.to_string()))?
        };

        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        Ok(Backend {
            name: name.to_string(),
            device,
            sample_rate: config.sample_rate(),
            command_tx,
            command_rx,
            stop: Arc::new(AtomicBool::new(false)),
            output_thread: None,
        })
    }

    fn send(&self, command: MixerCommand) {
        // The receiver lives as long as the backend, so this only fails once
        // the output thread is gone; the command is dropped in that case.
        let _ = self.command_tx.send(command);
    }
}

/// Builds the output callback: drain pending commands, mix, then map stereo onto
/// the device's channel layout.
fn create_callback<T>(
    mut mixer: ChannelMixer,
    commands: Receiver<MixerCommand>,
    device_channels: usize,
) -> impl FnMut(&mut [T], &cpal::OutputCallbackInfo) + Send + 'static
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
        while let Ok(command) = commands.try_recv() {
            mixer.apply(command);
        }

        let frames = data.len() / device_channels;
        scratch.resize(frames * 2, 0.0);
        mixer.mix_into(&mut scratch);

        for (frame, stereo) in data
            .chunks_exact_mut(device_channels)
            .zip(scratch.chunks_exact(2))
        {
            if device_channels == 1 {
                frame[0] = T::from_sample((stereo[0] + stereo[1]) * 0.5);
                continue;
            }
            for (i, out) in frame.iter_mut().enumerate() {
                let value = if i < 2 { stereo[i] } else { 0.0 };
                *out = T::from_sample(value);
            }
        }
    }
}

fn build_stream(
    device: &cpal::Device,
    requested_rate: Option<u32>,
    commands: Receiver<MixerCommand>,
) -> Result<cpal::Stream, BackendError> {
    let default_config = device
        .default_output_config()
        .map_err(|e| BackendError::Init(e.to_string()))?;
    let sample_format = default_config.sample_format();
    let mut stream_config: cpal::StreamConfig = default_config.into();
    if let Some(rate) = requested_rate {
        stream_config.sample_rate = rate;
    }

    let device_channels = (stream_config.channels as usize).max(1);
    let mixer = ChannelMixer::new(CHANNEL_COUNT, stream_config.sample_rate);
    let on_error = |err: cpal::StreamError| error!("CPAL output stream error: {}", err);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &stream_config,
            create_callback::<f32>(mixer, commands, device_channels),
            on_error,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_output_stream(
            &stream_config,
            create_callback::<i16>(mixer, commands, device_channels),
            on_error,
            None,
        ),
        cpal::SampleFormat::I32 => device.build_output_stream(
            &stream_config,
            create_callback::<i32>(mixer, commands, device_channels),
            on_error,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_output_stream(
            &stream_config,
            create_callback::<u16>(mixer, commands, device_channels),
            on_error,
            None,
        ),
        other => {
            return Err(BackendError::Init(format!(
                "unsupported output sample format {}",
                other
            )))
        }
    }
    .map_err(|e| BackendError::Init(e.to_string()))?;

    stream
        .play()
        .map_err(|e| BackendError::Init(e.to_string()))?;

    info!(
        sample_rate = stream_config.sample_rate,
        channels = device_channels,
        "CPAL output stream started successfully"
    );
    Ok(stream)
}

impl super::Backend for Backend {
    fn init(&mut self) -> Result<ChannelMask, BackendError> {
        let span = span!(Level::INFO, "init audio (cpal)");
        let _enter = span.enter();

        if self.output_thread.is_some() {
            return Ok(ChannelMask::MAX);
        }

        // Streams are not Send on every platform, so the stream is created and
        // kept alive on its own thread.
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let device = self.device.clone();
        let requested_rate = self.sample_rate;
        let commands = self.command_rx.clone();
        let stop = self.stop.clone();
        let output_thread = thread::spawn(move || {
            let stream = match build_stream(&device, requested_rate, commands) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            while !stop.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(100));
            }
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.output_thread = Some(output_thread);
                info!(device = self.name, "Initialized audio");
                Ok(ChannelMask::MAX)
            }
            Ok(Err(e)) => {
                let _ = output_thread.join();
                Err(e)
            }
            Err(_) => Err(BackendError::Init(
                "output thread exited before starting".to_string(),
            )),
        }
    }

    fn play(&mut self, channel: usize, command: PlayCommand) {
        self.send(MixerCommand::Play(channel, command));
    }

    fn set_volume_pan(&mut self, channel: usize, volume: f32, pan: f32) {
        self.send(MixerCommand::VolumePan(channel, volume, pan));
    }

    fn set_looping(&mut self, channel: usize, looping: bool) {
        self.send(MixerCommand::Looping(channel, looping));
    }

    fn set_rate(&mut self, channel: usize, rate: u32) {
        self.send(MixerCommand::Rate(channel, rate));
    }

    fn silence(&mut self, channel: usize) {
        self.send(MixerCommand::Silence(channel));
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.output_thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        super::Backend::shutdown(self);
    }
}
