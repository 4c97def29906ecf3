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

//! Voice allocation and playback control.
//!
//! A [`VoicePool`] owns a fixed number of voices, each bound to the hardware
//! channel with the same index. Samples are bound to voices with
//! [`VoicePool::allocate`], and every parameter change is projected onto the
//! channel through the pool's [`Backend`](crate::hardware::Backend).

mod pool;
mod transition;
mod voice;

pub use pool::{PoolError, SharedVoicePool, VoicePool};
pub use voice::{VoiceId, VoiceStatus};
