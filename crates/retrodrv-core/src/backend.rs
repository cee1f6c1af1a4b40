use crate::av::SystemAvInfo;
use crate::category::DriverCategory;
use crate::error::DriverError;
use crate::rates::RateSnapshot;
use crate::settings::DriverSettings;

/// Everything a backend sees while it is being built or re-entered.
pub struct InitContext<'a> {
    pub category: DriverCategory,
    pub ident: &'a str,
    pub av_info: &'a SystemAvInfo,
    pub rates: RateSnapshot,
    pub settings: &'a DriverSettings,
}

/// A live backend instance owned by the driver manager.
///
/// Only `ident` is required; the other hooks default to no-ops so each
/// category implements just the calls it reacts to.
pub trait Backend {
    fn ident(&self) -> &str;

    /// Toggle real-time throttling (video and audio).
    fn set_nonblock_state(&mut self, _nonblock: bool) {}

    /// Called when a retained instance is reused by a scoped init instead of
    /// being reconstructed.
    fn reinit(&mut self, _ctx: &InitContext<'_>) {}

    /// The rendering context was (re)created (menu).
    fn context_reset(&mut self) {}

    /// The rendering context is about to go away (menu).
    fn context_destroy(&mut self) {}

    /// Release runtime resources such as streams, windows or devices. The
    /// instance itself may be kept alive afterwards, and a retained instance
    /// is deinitialized again when it is finally destroyed, so this must
    /// tolerate repeated calls.
    fn deinit(&mut self) {}

    /// Reports that the graphics context survived this reinit, so the core's
    /// hardware context-reset callback must not run.
    fn context_cached(&self) -> bool {
        false
    }
}

/// Builds a backend instance for one registry entry.
pub type BackendFactory =
    Box<dyn Fn(&InitContext<'_>) -> Result<Box<dyn Backend>, DriverError>>;
