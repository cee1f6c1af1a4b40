//! Audio/video pacing derived from the monitor refresh rate and the loaded
//! core's declared timing.

use std::time::{Duration, Instant};

use log::info;

use crate::av::SystemTiming;
use crate::settings::DriverSettings;

/// Number of frame intervals kept for pacing statistics.
const FRAME_SAMPLES: usize = 1024;

/// Rate values handed to backends at construction/reinit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateSnapshot {
    pub refresh_rate: f64,
    pub core_fps: f64,
    /// Rate at which the core's audio is fed into the resampler.
    pub audio_in_rate: f64,
    pub audio_out_rate: u32,
    /// `audio_out_rate / audio_in_rate`.
    pub src_ratio: f64,
}

#[derive(Clone, Debug)]
pub struct RateMonitor {
    refresh_rate: f64,
    max_timing_skew: f64,
    audio_out_rate: u32,
    core_fps: f64,
    audio_in_rate: f64,
    src_ratio: f64,
}

impl RateMonitor {
    pub fn new(settings: &DriverSettings) -> Self {
        let audio_out_rate = settings.audio_out_rate;
        Self {
            refresh_rate: settings.video_refresh_rate,
            max_timing_skew: settings.audio_max_timing_skew,
            audio_out_rate,
            core_fps: 0.0,
            audio_in_rate: audio_out_rate as f64,
            src_ratio: 1.0,
        }
    }

    pub fn refresh_rate(&self) -> f64 {
        self.refresh_rate
    }

    pub fn set_refresh_rate(&mut self, hz: f64) {
        info!("Setting refresh rate to: {hz:.3} Hz");
        self.refresh_rate = hz;
    }

    /// Relative deviation between the core's fps and the display.
    pub fn timing_skew(&self, fps: f64) -> f64 {
        if self.refresh_rate <= 0.0 {
            return f64::INFINITY;
        }
        (1.0 - fps / self.refresh_rate).abs()
    }

    /// Recomputes video pacing and returns whether the core must run
    /// non-blocking.
    ///
    /// VSync cannot be relied on when the core runs faster than the display
    /// and the difference is beyond what audio resampling absorbs.
    pub fn adjust_video(&mut self, timing: &SystemTiming) -> bool {
        if timing.fps <= 0.0 {
            return false;
        }
        self.core_fps = timing.fps;

        if self.timing_skew(timing.fps) <= self.max_timing_skew {
            return false;
        }
        info!(
            "Timings deviate too much. Will not adjust. (Display = {:.2} Hz, Game = {:.2} Hz)",
            self.refresh_rate, timing.fps
        );
        if timing.fps <= self.refresh_rate {
            return false;
        }
        info!("Game FPS > Monitor FPS. Cannot rely on VSync.");
        true
    }

    /// Derives the audio input rate from the core's sample rate.
    ///
    /// Within the skew tolerance the rate is scaled so that audio tracks the
    /// display's refresh instead of the core's nominal fps.
    pub fn adjust_audio(&mut self, timing: &SystemTiming) {
        if timing.sample_rate <= 0.0 {
            return;
        }

        self.audio_in_rate = timing.sample_rate;
        if timing.fps > 0.0 && self.timing_skew(timing.fps) <= self.max_timing_skew {
            self.audio_in_rate *= self.refresh_rate / timing.fps;
        }
        info!("Set audio input rate to: {:.2} Hz", self.audio_in_rate);
        self.update_src_ratio();
    }

    /// Recomputes the resampler ratio after a refresh-rate change.
    pub fn update_src_ratio(&mut self) {
        if self.audio_in_rate > 0.0 {
            self.src_ratio = self.audio_out_rate as f64 / self.audio_in_rate;
        }
    }

    pub fn snapshot(&self) -> RateSnapshot {
        RateSnapshot {
            refresh_rate: self.refresh_rate,
            core_fps: self.core_fps,
            audio_in_rate: self.audio_in_rate,
            audio_out_rate: self.audio_out_rate,
            src_ratio: self.src_ratio,
        }
    }
}

/// Frame interval statistics used to estimate the real display rate.
#[derive(Clone, Debug, Default)]
pub struct FramePacing {
    last_frame: Option<Instant>,
    intervals: Vec<Duration>,
    next: usize,
}

impl FramePacing {
    pub fn reset(&mut self) {
        self.last_frame = None;
        self.intervals.clear();
        self.next = 0;
    }

    pub fn record_frame(&mut self, now: Instant) {
        if let Some(last) = self.last_frame {
            let interval = now.saturating_duration_since(last);
            if self.intervals.len() < FRAME_SAMPLES {
                self.intervals.push(interval);
            } else {
                self.intervals[self.next] = interval;
            }
            self.next = (self.next + 1) % FRAME_SAMPLES;
        }
        self.last_frame = Some(now);
    }

    pub fn last_frame(&self) -> Option<Instant> {
        self.last_frame
    }

    pub fn samples(&self) -> usize {
        self.intervals.len()
    }

    pub fn mean_frame_time(&self) -> Option<Duration> {
        if self.intervals.is_empty() {
            return None;
        }
        let total: Duration = self.intervals.iter().sum();
        Some(total / self.intervals.len() as u32)
    }

    /// Refresh rate implied by the recorded intervals.
    pub fn estimated_refresh_rate(&self) -> Option<f64> {
        let mean = self.mean_frame_time()?;
        let secs = mean.as_secs_f64();
        (secs > 0.0).then(|| 1.0 / secs)
    }
}
