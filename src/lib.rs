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

//! Indexed-color blitting and pooled voice playback.
//!
//! [`surface`] and [`blit`] cover raster copies with wraparound addressing.
//! [`voices`] binds [`samples`] to a fixed pool of hardware channels driven
//! through a [`hardware::Backend`].

pub mod blit;
pub mod config;
pub mod hardware;
pub mod menu;
pub mod samples;
pub mod surface;
pub mod voices;

#[cfg(test)]
mod testutil;
