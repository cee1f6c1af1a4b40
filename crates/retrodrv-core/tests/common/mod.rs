#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use retrodrv_core::{
    Backend, DriverCategory, DriverError, DriverHost, DriverManager, DriverSettings, EventCommand,
    InitContext, Notice, RateSnapshot, Registries, Registry, RegistryEntry,
};

/// Video backend ident whose fake reports a cached graphics context.
pub const CACHED_CONTEXT_IDENT: &str = "vulkan";

/// Everything a fake backend observed, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Construct {
        category: DriverCategory,
        ident: String,
        rates: RateSnapshot,
    },
    Reinit(DriverCategory),
    Nonblock(DriverCategory, bool),
    ContextReset(DriverCategory),
    ContextDestroy(DriverCategory),
    Deinit(DriverCategory),
    Drop(DriverCategory),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &CallLog, wanted: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|call| wanted(call)).count()
}

pub fn constructions(log: &CallLog, category: DriverCategory) -> usize {
    count(log, |call| matches!(call, Call::Construct { category: c, .. } if *c == category))
}

pub fn drops(log: &CallLog, category: DriverCategory) -> usize {
    count(log, |call| *call == Call::Drop(category))
}

/// Rates the most recent instance of `category` was built with.
pub fn construction_rates(log: &CallLog, category: DriverCategory) -> Option<RateSnapshot> {
    log.borrow().iter().rev().find_map(|call| match call {
        Call::Construct {
            category: c, rates, ..
        } if *c == category => Some(*rates),
        _ => None,
    })
}

/// Last non-blocking state pushed to a live `category` instance.
pub fn last_nonblock(log: &CallLog, category: DriverCategory) -> Option<bool> {
    log.borrow().iter().rev().find_map(|call| match call {
        Call::Nonblock(c, nonblock) if *c == category => Some(*nonblock),
        _ => None,
    })
}

/// A backend that only records how the manager drives it.
pub struct FakeBackend {
    category: DriverCategory,
    ident: &'static str,
    log: CallLog,
}

impl Backend for FakeBackend {
    fn ident(&self) -> &str {
        self.ident
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.log
            .borrow_mut()
            .push(Call::Nonblock(self.category, nonblock));
    }

    fn reinit(&mut self, _ctx: &InitContext<'_>) {
        self.log.borrow_mut().push(Call::Reinit(self.category));
    }

    fn context_reset(&mut self) {
        self.log.borrow_mut().push(Call::ContextReset(self.category));
    }

    fn context_destroy(&mut self) {
        self.log
            .borrow_mut()
            .push(Call::ContextDestroy(self.category));
    }

    fn deinit(&mut self) {
        self.log.borrow_mut().push(Call::Deinit(self.category));
    }

    fn context_cached(&self) -> bool {
        self.ident == CACHED_CONTEXT_IDENT
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::Drop(self.category));
    }
}

pub fn fake(category: DriverCategory, ident: &'static str, log: &CallLog) -> RegistryEntry {
    let log = Rc::clone(log);
    RegistryEntry::backend(ident, move |ctx: &InitContext<'_>| {
        log.borrow_mut().push(Call::Construct {
            category,
            ident: ctx.ident.to_string(),
            rates: ctx.rates,
        });
        Ok(Box::new(FakeBackend {
            category,
            ident,
            log: Rc::clone(&log),
        }) as Box<dyn Backend>)
    })
}

pub fn failing(category: DriverCategory, ident: &'static str) -> RegistryEntry {
    RegistryEntry::backend(ident, move |_ctx: &InitContext<'_>| {
        Err(DriverError::backend_init(category, ident, "device busy"))
    })
}

/// Registries with a few fake backends per category, mirroring a typical
/// desktop build.
pub fn fake_registries(log: &CallLog) -> Registries {
    use DriverCategory::*;

    let mut registries = Registries::absent_only();
    registries.install(Registry::new(
        Video,
        vec![
            fake(Video, "gl", log),
            fake(Video, CACHED_CONTEXT_IDENT, log),
            RegistryEntry::Absent,
        ],
    ));
    registries.install(Registry::new(
        Audio,
        vec![
            fake(Audio, "alsa", log),
            fake(Audio, "pulse", log),
            RegistryEntry::Absent,
        ],
    ));
    registries.install(Registry::new(
        Input,
        vec![fake(Input, "udev", log), fake(Input, "x", log)],
    ));
    registries.install(Registry::new(
        Camera,
        vec![fake(Camera, "v4l2", log), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(
        Location,
        vec![fake(Location, "corelocation", log), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(
        Menu,
        vec![
            fake(Menu, "xmb", log),
            fake(Menu, "rgui", log),
            RegistryEntry::Absent,
        ],
    ));
    registries.install(Registry::new(
        Record,
        vec![fake(Record, "ffmpeg", log), RegistryEntry::Absent],
    ));
    registries.install(Registry::new(
        AudioResampler,
        vec![
            fake(AudioResampler, "sinc", log),
            fake(AudioResampler, "nearest", log),
        ],
    ));
    registries
}

pub fn fake_settings() -> DriverSettings {
    DriverSettings {
        video_driver: "gl".into(),
        audio_driver: "alsa".into(),
        input_driver: "udev".into(),
        camera_driver: "v4l2".into(),
        location_driver: "corelocation".into(),
        menu_driver: "xmb".into(),
        record_driver: "ffmpeg".into(),
        audio_resampler: "sinc".into(),
        ..DriverSettings::default()
    }
}

/// A host that records every command and notice it receives.
#[derive(Default)]
pub struct RecordingHost {
    pub commands: Vec<EventCommand>,
    pub notices: Vec<Notice>,
}

impl DriverHost for RecordingHost {
    fn command(&mut self, cmd: EventCommand) -> bool {
        self.commands.push(cmd);
        true
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

pub type TestManager = DriverManager<RecordingHost>;

/// A discovered manager over the fake registries.
pub fn manager(log: &CallLog) -> TestManager {
    manager_with(log, fake_settings())
}

pub fn manager_with(log: &CallLog, settings: DriverSettings) -> TestManager {
    let mut manager = DriverManager::new(RecordingHost::default(), fake_registries(log), settings);
    assert!(manager.discover().is_empty());
    manager
}
