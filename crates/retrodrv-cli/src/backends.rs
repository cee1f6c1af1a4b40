//! Headless backends compiled into the `retrodrv` binary.
//!
//! None of them touch real devices; they log what the driver manager asks of
//! them so a session can be inspected with `RUST_LOG=debug`.

use log::{debug, info};
use retrodrv_core::{
    Backend, DriverCategory, DriverError, DriverSettings, InitContext, Registries, Registry,
    RegistryEntry,
};

/// Backend that only tracks the state the manager pushes into it.
struct HeadlessBackend {
    category: DriverCategory,
    ident: &'static str,
    nonblock: bool,
    reinits: u32,
}

impl HeadlessBackend {
    fn build(ctx: &InitContext<'_>, ident: &'static str) -> Self {
        match ctx.category {
            DriverCategory::Video => {
                let geometry = ctx.av_info.geometry;
                info!(
                    "[{ident}] video {}x{} (aspect {:.3}) at {:.3} Hz",
                    geometry.base_width,
                    geometry.base_height,
                    geometry.effective_aspect(),
                    ctx.rates.refresh_rate
                );
            }
            DriverCategory::Audio => {
                info!(
                    "[{ident}] audio out {} Hz, in {:.2} Hz, ratio {:.5}",
                    ctx.rates.audio_out_rate, ctx.rates.audio_in_rate, ctx.rates.src_ratio
                );
            }
            category => debug!("[{ident}] {category} up"),
        }
        Self {
            category: ctx.category,
            ident,
            nonblock: false,
            reinits: 0,
        }
    }
}

impl Backend for HeadlessBackend {
    fn ident(&self) -> &str {
        self.ident
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        if self.nonblock != nonblock {
            debug!("[{}] {} non-blocking: {nonblock}", self.ident, self.category);
        }
        self.nonblock = nonblock;
    }

    fn reinit(&mut self, ctx: &InitContext<'_>) {
        self.reinits += 1;
        debug!(
            "[{}] {} reused x{} (src ratio {:.5})",
            self.ident, self.category, self.reinits, ctx.rates.src_ratio
        );
    }

    fn context_reset(&mut self) {
        debug!("[{}] context reset", self.ident);
    }

    fn context_destroy(&mut self) {
        debug!("[{}] context destroyed", self.ident);
    }

    fn deinit(&mut self) {
        debug!("[{}] {} deinit", self.ident, self.category);
    }
}

fn headless(ident: &'static str) -> RegistryEntry {
    RegistryEntry::backend(ident, move |ctx: &InitContext<'_>| {
        Ok(Box::new(HeadlessBackend::build(ctx, ident)) as Box<dyn Backend>)
    })
}

/// A backend whose device is never available.
fn unavailable(ident: &'static str) -> RegistryEntry {
    RegistryEntry::backend(ident, move |ctx: &InitContext<'_>| {
        Err(DriverError::backend_init(
            ctx.category,
            ident,
            "no device in headless builds",
        ))
    })
}

/// Registries of every category, first entry being the preferred backend.
pub fn registries() -> Registries {
    use DriverCategory::*;

    let mut registries = Registries::absent_only();
    registries.install(Registry::new(
        Video,
        vec![headless("headless"), unavailable("gl"), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(
        Audio,
        vec![headless("sink"), unavailable("alsa"), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(
        Input,
        vec![headless("headless"), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(
        Camera,
        vec![headless("still"), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(Menu, vec![headless("text"), RegistryEntry::Absent]));
    registries.install(Registry::new(Record, vec![headless("log"), RegistryEntry::Absent]));
    registries.install(Registry::new(
        AudioResampler,
        vec![headless("nearest"), headless("linear")],
    ));
    registries
}

/// Settings selecting the preferred backend of every category.
pub fn default_settings() -> DriverSettings {
    let registries = registries();
    let mut settings = DriverSettings::default();
    for category in DriverCategory::ALL {
        if let Some(ident) = registries.get(category).and_then(|r| r.find_ident(0)) {
            settings.select(category, ident);
        }
    }
    settings
}
