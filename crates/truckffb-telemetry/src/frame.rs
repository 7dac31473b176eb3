//! Frame-start timestamp bookkeeping.

use serde::{Deserialize, Serialize};

use crate::TelemetrySample;

/// Timing information delivered with every frame-start event (microseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameStart {
    pub render_time: u64,
    pub simulation_time: u64,
    pub paused_simulation_time: u64,
    /// The host restarted its timers; `paused_simulation_time` counts from zero again.
    pub timer_restart: bool,
}

/// Accumulates simulation time across frames into [`TelemetrySample::timestamp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<u64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the sample's clock for one frame start.
    pub fn on_frame_start(&mut self, info: &FrameStart, sample: &mut TelemetrySample) {
        let mut last = self.last.unwrap_or(info.paused_simulation_time);
        if info.timer_restart {
            last = 0;
        }

        sample.timestamp = sample
            .timestamp
            .saturating_add(info.paused_simulation_time.saturating_sub(last));
        self.last = Some(info.paused_simulation_time);

        sample.raw_render_timestamp = info.render_time;
        sample.raw_simulation_timestamp = info.simulation_time;
        sample.raw_paused_simulation_timestamp = info.paused_simulation_time;
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(paused: u64) -> FrameStart {
        FrameStart {
            render_time: paused + 7,
            simulation_time: paused + 3,
            paused_simulation_time: paused,
            timer_restart: false,
        }
    }

    #[test]
    fn test_first_frame_does_not_jump() -> Result<(), Box<dyn std::error::Error>> {
        let mut clock = FrameClock::new();
        let mut s = TelemetrySample::new();
        clock.on_frame_start(&frame(5_000_000), &mut s);
        assert_eq!(s.timestamp, 0);
        assert_eq!(s.raw_paused_simulation_timestamp, 5_000_000);
        assert_eq!(s.raw_render_timestamp, 5_000_007);
        Ok(())
    }

    #[test]
    fn test_accumulates_deltas() -> Result<(), Box<dyn std::error::Error>> {
        let mut clock = FrameClock::new();
        let mut s = TelemetrySample::new();
        clock.on_frame_start(&frame(1_000), &mut s);
        clock.on_frame_start(&frame(17_666), &mut s);
        clock.on_frame_start(&frame(34_333), &mut s);
        assert_eq!(s.timestamp, 33_333);
        Ok(())
    }

    #[test]
    fn test_timer_restart_counts_from_zero() -> Result<(), Box<dyn std::error::Error>> {
        let mut clock = FrameClock::new();
        let mut s = TelemetrySample::new();
        clock.on_frame_start(&frame(100_000), &mut s);
        clock.on_frame_start(&frame(110_000), &mut s);

        let mut restart = frame(2_000);
        restart.timer_restart = true;
        clock.on_frame_start(&restart, &mut s);
        assert_eq!(s.timestamp, 12_000);
        Ok(())
    }

    #[test]
    fn test_backwards_time_does_not_underflow() -> Result<(), Box<dyn std::error::Error>> {
        let mut clock = FrameClock::new();
        let mut s = TelemetrySample::new();
        clock.on_frame_start(&frame(50), &mut s);
        clock.on_frame_start(&frame(10), &mut s);
        assert_eq!(s.timestamp, 0);
        Ok(())
    }
}
