//! Keeps audio/video pacing consistent with the loaded core's timing and
//! with the input's turbo state.

use log::{debug, info};

use crate::av::SystemAvInfo;
use crate::category::DriverCategory;
use crate::host::{DriverHost, EventCommand, MSG_RESTARTING_RECORDING, Notice};
use crate::manager::DriverManager;

impl<H: DriverHost> DriverManager<H> {
    /// Recomputes audio and video pacing from the current AV info, then
    /// reapplies the blocking policy if a video instance is live.
    pub fn adjust_system_rates(&mut self) {
        let timing = self.system.av_info.timing;
        self.rates.adjust_audio(&timing);
        self.system.force_nonblock = self.rates.adjust_video(&timing);

        if !self.has_instance(DriverCategory::Video) {
            return;
        }

        if self.system.force_nonblock {
            self.host.command(EventCommand::VideoSetNonblockingState);
        } else {
            self.set_nonblock_state();
        }
    }

    /// Applies input's turbo flag to video and audio.
    ///
    /// Video only follows it while active and live, and is always
    /// non-blocking without vsync or when the system forces it. Audio mirrors
    /// the turbo flag unconditionally.
    pub fn set_nonblock_state(&mut self) {
        let enable = self.input_nonblock;

        let video = &mut self.states[DriverCategory::Video.slot()];
        if video.is_active() && video.has_instance() {
            let nonblock = enable || !self.settings.video_vsync || self.system.force_nonblock;
            video.set_nonblock(nonblock);
        }

        self.states[DriverCategory::Audio.slot()].set_nonblock(enable);
    }

    /// Forces the video backend into non-blocking mode.
    pub fn force_video_nonblock(&mut self) {
        let video = &mut self.states[DriverCategory::Video.slot()];
        if video.has_instance() {
            video.set_nonblock(true);
        }
    }

    /// Updates the monitor refresh rate and everything derived from it.
    pub fn set_refresh_rate(&mut self, hz: f64) {
        self.settings.video_refresh_rate = hz;
        self.rates.set_refresh_rate(hz);
        self.rates.update_src_ratio();
        self.adjust_system_rates();
    }

    /// Replaces the system AV info and asks the host to rebuild drivers.
    ///
    /// A running recording cannot follow new AV parameters, so it is
    /// restarted from scratch. Always returns `true`.
    pub fn update_system_av_info(&mut self, info: &SystemAvInfo) -> bool {
        self.system.av_info = *info;
        debug!(
            "System AV info updated: {:.3} fps, {:.1} Hz, {}x{}",
            info.timing.fps,
            info.timing.sample_rate,
            info.geometry.base_width,
            info.geometry.base_height
        );
        self.host.command(EventCommand::Reinit);

        if self.recording_active() {
            info!("{MSG_RESTARTING_RECORDING}");
            self.host.notify(Notice::new(MSG_RESTARTING_RECORDING, 2, 180));
            self.host.command(EventCommand::RecordDeinit);
            self.host.command(EventCommand::RecordInit);
        }

        true
    }
}
