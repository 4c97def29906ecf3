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
use std::error::Error;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pixvox::blit::{masked_blit, masked_stretch_blit};
use pixvox::config::{self, PlayMode, RuntimeConfig};
use pixvox::hardware;
use pixvox::samples::{Channels, Sample, SampleLoader};
use pixvox::surface::Surface;
use pixvox::voices::{VoicePool, VoiceStatus};

/// Rate of synthesized tones.
const TONE_RATE: u32 = 22050;

/// How often playback loops wake up to advance transitions.
const TICK: Duration = Duration::from_millis(10);

/// Glyphs for palette indices when printing a surface. Index 0 is blank.
const GLYPHS: &[u8] = b" .:-=+*#%@";

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Indexed-color blitting and pooled voice playback."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available audio output devices.
    Devices {},
    /// Plays a sine tone on one voice.
    Tone {
        /// The path to the runtime config. Defaults are used if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The tone frequency in Hz.
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,
        /// How long to play, e.g. 2s or 500ms.
        #[arg(short, long, default_value = "2s")]
        duration: String,
        /// The volume, 0 to 255.
        #[arg(long, default_value_t = 255)]
        volume: u8,
        /// The pan, 0 (left) to 255 (right), 128 is center.
        #[arg(long, default_value_t = 128)]
        pan: u8,
        /// Sweep the playback rate by this factor over the whole duration.
        #[arg(long)]
        sweep: Option<f32>,
        /// Fade the volume out over the whole duration.
        #[arg(long)]
        fade: bool,
    },
    /// Plays a WAV file on one voice.
    Play {
        /// The path to the runtime config. Defaults are used if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The WAV file to play.
        path: PathBuf,
        /// How long to play. Defaults to the length of the sample.
        #[arg(short, long)]
        duration: Option<String>,
        /// Repeat the sample until the duration is up.
        #[arg(short, long = "loop")]
        looping: bool,
    },
    /// Renders a tiled pattern with masked and stretched blits and prints it.
    Tiles {
        /// The surface width.
        #[arg(long, default_value_t = 48)]
        width: usize,
        /// The surface height.
        #[arg(long, default_value_t = 16)]
        height: usize,
        /// Horizontal scroll of the background.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        scroll: i32,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = hardware::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Tone {
            config,
            frequency,
            duration,
            volume,
            pan,
            sweep,
            fade,
        } => {
            let config = load_config(config.as_deref())?;
            let duration = config::parse_duration(&duration)?;
            let mut pool = open_pool(&config)?;

            let voice = pool
                .allocate(sine(frequency)?)
                .ok_or("no free voice for the tone")?;
            pool.set_volume(voice, volume)?;
            pool.set_pan(voice, pan)?;
            pool.start(voice)?;
            if let Some(factor) = sweep {
                let end_rate = (TONE_RATE as f32 * factor).round() as u32;
                pool.sweep_frequency(voice, duration, end_rate)?;
            }
            if fade {
                pool.ramp_volume(voice, duration, 0)?;
            }

            run_for(&mut pool, duration);
            pool.deallocate(voice)?;
            pool.shutdown();
        }
        Commands::Play {
            config,
            path,
            duration,
            looping,
        } => {
            let config = load_config(config.as_deref())?;
            let mut loader = SampleLoader::new();
            let sample = loader.load(&path)?;
            let duration = match duration {
                Some(duration) => config::parse_duration(&duration)?,
                None => Duration::from_secs_f64(
                    sample.len() as f64 / sample.frequency().max(1) as f64,
                ),
            };

            let mut pool = open_pool(&config)?;
            let voice = pool
                .allocate(sample)
                .ok_or("no free voice for the sample")?;
            let mode = if looping {
                PlayMode::Loop
            } else {
                PlayMode::Play
            };
            pool.set_play_mode(voice, mode)?;
            pool.start(voice)?;

            info!(path = %path.display(), ?duration, looping, "Playing sample");
            run_for(&mut pool, duration);
            if pool.voice_state(voice)? == VoiceStatus::Playing {
                pool.stop(voice)?;
            }
            pool.deallocate(voice)?;
            pool.shutdown();
        }
        Commands::Tiles {
            width,
            height,
            scroll,
        } => {
            let screen = tiles(width, height, scroll)?;
            print!("{}", render(&screen));
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, Box<dyn Error>> {
    Ok(match path {
        Some(path) => RuntimeConfig::deserialize(path)?,
        None => RuntimeConfig::default(),
    })
}

fn open_pool(config: &RuntimeConfig) -> Result<VoicePool, Box<dyn Error>> {
    let backend = hardware::get_backend(config.audio())?;
    Ok(VoicePool::new(config.voices(), backend)?)
}

/// Sleeps for `duration`, advancing the pool's transitions as time passes.
fn run_for(pool: &mut VoicePool, duration: Duration) {
    let mut remaining = duration;
    while !remaining.is_zero() {
        let step = remaining.min(TICK);
        thread::sleep(step);
        pool.advance(step);
        remaining -= step;
    }
}

/// One second of a 16-bit mono sine tone, suitable for looping.
fn sine(frequency: f32) -> Result<Arc<Sample>, Box<dyn Error>> {
    // A whole number of cycles so the loop point doesn't click.
    let cycles = frequency.round().max(1.0);
    let points: Vec<i16> = (0..TONE_RATE)
        .map(|i| {
            let t = i as f32 / TONE_RATE as f32;
            ((2.0 * PI * cycles * t).sin() * i16::MAX as f32 * 0.5) as i16
        })
        .collect();
    Ok(Arc::new(Sample::from_i16(Channels::Mono, TONE_RATE, &points)?))
}

/// Tiles a small pattern across the screen, then stretches a sprite over it.
fn tiles(width: usize, height: usize, scroll: i32) -> Result<Surface, Box<dyn Error>> {
    let mut tile = Surface::new(8, 8)?;
    for y in 0..8 {
        for x in 0..8 {
            tile.put_pixel(x, y, if (x + y) % 4 == 0 { 1 } else { 2 });
        }
    }

    let mut sprite = Surface::new(4, 4)?;
    for (x, y) in [(1, 0), (2, 0), (0, 1), (3, 1), (0, 2), (3, 2), (1, 3), (2, 3)] {
        sprite.put_pixel(x, y, 9);
    }

    let mut screen = Surface::new(width, height)?;
    masked_blit(&tile, &mut screen, scroll, 0, 0, 0, width, height);

    let sprite_w = (width / 3).max(1);
    let sprite_h = (height / 2).max(1);
    let x = ((width - sprite_w) / 2) as i32;
    let y = ((height - sprite_h) / 2) as i32;
    masked_stretch_blit(&sprite, &mut screen, 0, 0, 4, 4, x, y, sprite_w, sprite_h)?;
    Ok(screen)
}

fn render(surface: &Surface) -> String {
    let mut out = String::with_capacity((surface.width() + 1) * surface.height());
    for y in 0..surface.height() {
        for color in surface.row(y as i32) {
            out.push(GLYPHS[*color as usize % GLYPHS.len()] as char);
        }
        out.push('\n');
    }
    out
}
