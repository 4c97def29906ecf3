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
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pixvox::blit::{masked_blit, masked_stretch_blit};
use pixvox::hardware::mixer::{ChannelMixer, MixerCommand};
use pixvox::hardware::PlayCommand;
use pixvox::samples::{Channels, Sample};
use pixvox::surface::Surface;
use std::sync::Arc;

/// A surface with roughly a quarter of its pixels transparent.
fn pattern(width: usize, height: usize) -> Surface {
    let pixels = (0..width * height)
        .map(|i| if i % 4 == 0 { 0 } else { (i % 255) as u8 + 1 })
        .collect();
    Surface::from_pixels(width, height, pixels).unwrap()
}

fn benchmark_masked_blit(c: &mut Criterion) {
    let mut group = c.benchmark_group("masked_blit");

    // Sprite-sized copies through full-screen background fills.
    for size in [16, 64, 256] {
        let src = pattern(size, size);
        let mut dst = Surface::new(384, 224).unwrap();

        group.bench_function(BenchmarkId::new("square", size), |b| {
            b.iter(|| {
                masked_blit(
                    black_box(&src),
                    &mut dst,
                    black_box(-3),
                    0,
                    100,
                    50,
                    size,
                    size,
                )
            })
        });
    }

    let tile = pattern(8, 8);
    let mut screen = Surface::new(384, 224).unwrap();
    group.bench_function("tiled_background", |b| {
        b.iter(|| masked_blit(black_box(&tile), &mut screen, 5, 3, 0, 0, 384, 224))
    });

    group.finish();
}

fn benchmark_stretch_blit(c: &mut Criterion) {
    let mut group = c.benchmark_group("masked_stretch_blit");

    let src = pattern(64, 64);
    let test_cases = vec![("shrink_half", 32), ("identity", 64), ("grow_double", 128)];

    for (name, target) in test_cases {
        let mut dst = Surface::new(384, 224).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                masked_stretch_blit(
                    black_box(&src),
                    &mut dst,
                    0,
                    0,
                    64,
                    64,
                    10,
                    10,
                    target,
                    target,
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_mixer(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer");

    let points: Vec<i16> = (0..22050).map(|i| ((i * 37) % 4096) as i16).collect();
    let sample = Arc::new(Sample::from_i16(Channels::Mono, 22050, &points).unwrap());

    for voices in [1, 8, 32] {
        let mut mixer = ChannelMixer::new(64, 48000);
        for channel in 0..voices {
            mixer.apply(MixerCommand::Play(
                channel,
                PlayCommand {
                    repeat: true,
                    format: sample.depth().into(),
                    rate: 22050,
                    volume: 0.5,
                    pan: 0.0,
                    sample: sample.clone(),
                    byte_len: sample.data().len(),
                },
            ));
        }

        let mut out = vec![0.0f32; 1024];
        group.bench_function(BenchmarkId::new("voices", voices), |b| {
            b.iter(|| {
                mixer.mix_into(black_box(&mut out));
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_masked_blit,
    benchmark_stretch_blit,
    benchmark_mixer
);
criterion_main!(benches);
