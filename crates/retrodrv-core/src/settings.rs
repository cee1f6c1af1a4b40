use serde::{Deserialize, Serialize};

use crate::category::DriverCategory;

/// Driver selection and pacing settings read by the driver manager.
///
/// Parsing happens in the frontend; the manager only reads these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub video_driver: String,
    pub audio_driver: String,
    pub input_driver: String,
    pub joypad_driver: String,
    pub camera_driver: String,
    pub location_driver: String,
    pub menu_driver: String,
    pub record_driver: String,
    pub audio_resampler: String,

    pub video_vsync: bool,
    /// Refresh rate of the monitor the video backend presents to, in Hz.
    pub video_refresh_rate: f64,
    /// Output rate the audio backend is opened with, in Hz.
    pub audio_out_rate: u32,
    /// Largest relative fps/refresh deviation that is still corrected by
    /// resampling audio.
    pub audio_max_timing_skew: f64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            video_driver: "null".to_string(),
            audio_driver: "null".to_string(),
            input_driver: "null".to_string(),
            joypad_driver: "null".to_string(),
            camera_driver: "null".to_string(),
            location_driver: "null".to_string(),
            menu_driver: "null".to_string(),
            record_driver: "null".to_string(),
            audio_resampler: "null".to_string(),
            video_vsync: true,
            video_refresh_rate: 59.94,
            audio_out_rate: 48_000,
            audio_max_timing_skew: 0.05,
        }
    }
}

impl DriverSettings {
    pub fn selected(&self, category: DriverCategory) -> &str {
        match category {
            DriverCategory::Video => &self.video_driver,
            DriverCategory::Audio => &self.audio_driver,
            DriverCategory::Input => &self.input_driver,
            DriverCategory::Joypad => &self.joypad_driver,
            DriverCategory::Camera => &self.camera_driver,
            DriverCategory::Location => &self.location_driver,
            DriverCategory::Menu => &self.menu_driver,
            DriverCategory::Record => &self.record_driver,
            DriverCategory::AudioResampler => &self.audio_resampler,
        }
    }

    pub fn select(&mut self, category: DriverCategory, ident: impl Into<String>) {
        let slot = match category {
            DriverCategory::Video => &mut self.video_driver,
            DriverCategory::Audio => &mut self.audio_driver,
            DriverCategory::Input => &mut self.input_driver,
            DriverCategory::Joypad => &mut self.joypad_driver,
            DriverCategory::Camera => &mut self.camera_driver,
            DriverCategory::Location => &mut self.location_driver,
            DriverCategory::Menu => &mut self.menu_driver,
            DriverCategory::Record => &mut self.record_driver,
            DriverCategory::AudioResampler => &mut self.audio_resampler,
        };
        *slot = ident.into();
    }
}
