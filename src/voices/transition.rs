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
use std::time::Duration;

/// A linear move from one value to another over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Ramp {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

impl Ramp {
    /// Creates a ramp. A zero duration finishes on the first advance.
    pub(crate) fn new(from: f32, to: f32, duration: Duration) -> Ramp {
        Ramp {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Moves the ramp forward and returns the value at the new point in time.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> f32 {
        self.elapsed = self.elapsed.saturating_add(elapsed).min(self.duration);
        self.value()
    }

    pub(crate) fn value(&self) -> f32 {
        if self.is_done() {
            return self.to;
        }
        let progress = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * progress as f32
    }

    pub(crate) fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_progress() {
        let mut ramp = Ramp::new(0.0, 100.0, Duration::from_millis(100));
        assert_eq!(ramp.value(), 0.0);
        assert_eq!(ramp.advance(Duration::from_millis(25)), 25.0);
        assert_eq!(ramp.advance(Duration::from_millis(25)), 50.0);
        assert!(!ramp.is_done());
    }

    #[test]
    fn test_overshoot_lands_on_target() {
        let mut ramp = Ramp::new(1.0, 0.0, Duration::from_millis(10));
        assert_eq!(ramp.advance(Duration::from_secs(1)), 0.0);
        assert!(ramp.is_done());
        assert_eq!(ramp.advance(Duration::from_millis(1)), 0.0);
    }

    #[test]
    fn test_huge_advance_saturates() {
        let mut ramp = Ramp::new(0.0, 10.0, Duration::from_secs(10));
        assert_eq!(ramp.advance(Duration::from_secs(1)), 1.0);
        assert_eq!(ramp.advance(Duration::MAX), 10.0);
        assert!(ramp.is_done());
    }

    #[test]
    fn test_zero_duration() {
        let mut ramp = Ramp::new(8000.0, 22050.0, Duration::ZERO);
        assert!(ramp.is_done());
        assert_eq!(ramp.advance(Duration::ZERO), 22050.0);
    }
}
