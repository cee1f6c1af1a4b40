#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Frame and sample rate a loaded core wants to run at.
pub struct SystemTiming {
    pub fps: f64,
    pub sample_rate: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Framebuffer dimensions declared by a loaded core.
///
/// An `aspect_ratio` of zero or below means "derive from base width/height".
pub struct GameGeometry {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
}

impl GameGeometry {
    pub fn effective_aspect(&self) -> f32 {
        if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else if self.base_height != 0 {
            self.base_width as f32 / self.base_height as f32
        } else {
            1.0
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SystemAvInfo {
    pub timing: SystemTiming,
    pub geometry: GameGeometry,
}

/// Per-system information shared between the frontend and the driver
/// manager.
///
/// The manager overwrites `av_info` on AV-info updates and recomputes
/// `force_nonblock` during rate adjustment; everything else is read-only here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemInfo {
    pub av_info: SystemAvInfo,
    /// The loaded core cannot be throttled to the display.
    pub force_nonblock: bool,
}
