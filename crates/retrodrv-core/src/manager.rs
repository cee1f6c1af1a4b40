//! Bitmask-scoped initialization and teardown of driver categories.
//!
//! [`DriverManager`] owns one [`CategoryState`] per category. Scoped init and
//! uninit act on the categories named by a [`DriverFlags`] set; everything
//! else is left untouched. An instance whose category "owns" its driver is
//! moved into a retained slot on uninit and handed back to the next init
//! instead of being rebuilt.

use std::fmt;

use log::{debug, info, warn};

use crate::av::{SystemAvInfo, SystemInfo};
use crate::backend::{Backend, InitContext};
use crate::category::{DriverCategory, DriverFlags};
use crate::error::DriverError;
use crate::host::{DriverHost, EventCommand};
use crate::rates::{FramePacing, RateMonitor};
use crate::registry::{BackendHandle, Registries, RegistryEntry};
use crate::settings::DriverSettings;

/// Categories resolved by discovery, in resolution order.
const DISCOVERED: [DriverCategory; 6] = [
    DriverCategory::Audio,
    DriverCategory::Video,
    DriverCategory::Input,
    DriverCategory::Camera,
    DriverCategory::Location,
    DriverCategory::Menu,
];

/// Closed command surface of the driver manager.
#[derive(Clone, Copy, Debug)]
pub enum DriverCtl<'a> {
    None,
    /// Destroy every instance and drop core callback bindings. Terminal.
    Deinit,
    Init(Option<DriverFlags>),
    Uninit(Option<DriverFlags>),
    /// Resolve which backend each category will use.
    InitPre,
    SetRefreshRate(f64),
    SetNonblockState,
    UpdateSystemAvInfo(Option<&'a SystemAvInfo>),
}

/// Lifecycle phase of a single category.
///
/// A category whose instance was freed by a scoped uninit reports
/// `Discovered`: the destroyed instance is gone but the resolved backend
/// stays cached, so the next scoped init builds it without running
/// discovery again. `Destroyed` is only reported after full teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverPhase {
    Uninitialized,
    Discovered,
    Active,
    Retained,
    Destroyed,
}

#[derive(Default)]
enum Slot {
    #[default]
    Empty,
    Active(Box<dyn Backend>),
    Retained(Box<dyn Backend>),
}

impl Slot {
    fn backend(&self) -> Option<&dyn Backend> {
        match self {
            Slot::Active(backend) => Some(backend.as_ref()),
            Slot::Empty | Slot::Retained(_) => None,
        }
    }

    fn backend_mut(&mut self) -> Option<&mut (dyn Backend + 'static)> {
        match self {
            Slot::Active(backend) => Some(backend.as_mut()),
            Slot::Empty | Slot::Retained(_) => None,
        }
    }
}

/// Per-category lifecycle record.
#[derive(Default)]
pub struct CategoryState {
    selected: Option<BackendHandle>,
    slot: Slot,
    owns_driver: bool,
    active: bool,
    nonblock: bool,
}

impl CategoryState {
    pub fn selected(&self) -> Option<BackendHandle> {
        self.selected
    }

    pub fn owns_driver(&self) -> bool {
        self.owns_driver
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_instance(&self) -> bool {
        matches!(self.slot, Slot::Active(_))
    }

    pub fn is_retained(&self) -> bool {
        matches!(self.slot, Slot::Retained(_))
    }

    /// Last non-blocking state applied to this category.
    pub fn nonblock(&self) -> bool {
        self.nonblock
    }

    pub(crate) fn set_nonblock(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
        if let Some(backend) = self.slot.backend_mut() {
            backend.set_nonblock_state(nonblock);
        }
    }
}

impl fmt::Debug for CategoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = match &self.slot {
            Slot::Empty => "empty".to_string(),
            Slot::Active(b) => format!("active({})", b.ident()),
            Slot::Retained(b) => format!("retained({})", b.ident()),
        };
        f.debug_struct("CategoryState")
            .field("selected", &self.selected)
            .field("slot", &slot)
            .field("owns_driver", &self.owns_driver)
            .field("active", &self.active)
            .finish()
    }
}

/// Outcome of a scoped init.
#[derive(Debug, Default)]
pub struct InitReport {
    /// Categories that got a freshly built instance.
    pub constructed: DriverFlags,
    /// Categories whose retained (or still live) instance was reused.
    pub reused: DriverFlags,
    /// Categories that failed to produce a live instance.
    pub failed: Vec<DriverError>,
}

impl InitReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct DriverManager<H: DriverHost> {
    pub(crate) host: H,
    pub(crate) registries: Registries,
    pub(crate) settings: DriverSettings,
    pub(crate) system: SystemInfo,
    pub(crate) rates: RateMonitor,
    pub(crate) pacing: FramePacing,
    pub(crate) states: [CategoryState; DriverCategory::COUNT],
    pub(crate) input_nonblock: bool,
    video_cache_context_ack: bool,
    hw_context_reset: Option<Box<dyn FnMut()>>,
    shut_down: bool,
}

impl<H: DriverHost> DriverManager<H> {
    pub fn new(host: H, registries: Registries, settings: DriverSettings) -> Self {
        let rates = RateMonitor::new(&settings);
        Self {
            host,
            registries,
            settings,
            system: SystemInfo::default(),
            rates,
            pacing: FramePacing::default(),
            states: std::array::from_fn(|_| CategoryState::default()),
            input_nonblock: false,
            video_cache_context_ack: false,
            hw_context_reset: None,
            shut_down: false,
        }
    }

    /// Dispatches one command. Returns `false` for `None`, for scoped
    /// init/uninit without flags, for an AV-info update without info, and for
    /// scoped init/uninit after shutdown.
    pub fn ctl(&mut self, cmd: DriverCtl<'_>) -> bool {
        match cmd {
            DriverCtl::None => false,
            DriverCtl::Deinit => {
                self.shutdown();
                true
            }
            DriverCtl::Init(flags) => {
                let Some(flags) = flags else {
                    warn!("{}", DriverError::MissingFlags);
                    return false;
                };
                self.init_drivers(flags).is_ok()
            }
            DriverCtl::Uninit(flags) => {
                let Some(flags) = flags else {
                    warn!("{}", DriverError::MissingFlags);
                    return false;
                };
                self.uninit_drivers(flags).is_ok()
            }
            DriverCtl::InitPre => {
                self.discover();
                true
            }
            DriverCtl::SetRefreshRate(hz) => {
                self.set_refresh_rate(hz);
                true
            }
            DriverCtl::SetNonblockState => {
                self.set_nonblock_state();
                true
            }
            DriverCtl::UpdateSystemAvInfo(info) => match info {
                Some(info) => self.update_system_av_info(info),
                None => false,
            },
        }
    }

    /// Resolves the configured backend of every discoverable category.
    ///
    /// Unknown identifiers fall back to the first registered backend. Returns
    /// the categories that could not be resolved at all.
    pub fn discover(&mut self) -> Vec<DriverError> {
        let mut failures = Vec::new();
        for category in DISCOVERED {
            if !category.is_compiled_in() {
                continue;
            }
            if let Err(err) = self.find_driver(category) {
                warn!("Driver discovery failed: {err}");
                failures.push(err);
            }
        }
        failures
    }

    /// Resolves and caches the backend `category` will use.
    pub fn find_driver(&mut self, category: DriverCategory) -> Result<BackendHandle, DriverError> {
        let registry = self
            .registries
            .get(category)
            .ok_or(DriverError::CategoryUnavailable(category))?;
        if registry.is_empty() {
            return Err(DriverError::NoBackends(category));
        }

        let wanted = self.settings.selected(category);
        let index = match self.registries.index_of(category.label(), wanted) {
            Some(index) => index,
            None => {
                warn!("Couldn't find any {category} driver named \"{wanted}\"");
                debug!(
                    "Available {category} drivers are: {}",
                    registry.idents().collect::<Vec<_>>().join(", ")
                );
                warn!("Going to default to first {category} driver...");
                0
            }
        };

        let handle = registry
            .find_handle(index)
            .ok_or(DriverError::NoBackends(category))?;
        debug!(
            "Selected {category} driver \"{}\"",
            registry.find_ident(index).unwrap_or_default()
        );
        self.states[category.slot()].selected = Some(handle);
        Ok(handle)
    }

    /// Initializes the categories in `flags`.
    pub fn init_drivers(&mut self, flags: DriverFlags) -> Result<InitReport, DriverError> {
        if self.shut_down {
            warn!("Ignoring driver init of {flags:?}; drivers were shut down");
            return Err(DriverError::ShutDown);
        }
        debug!("Initializing drivers {flags:?}");

        for category in [
            DriverCategory::Video,
            DriverCategory::Audio,
            DriverCategory::Input,
            DriverCategory::Camera,
            DriverCategory::Location,
        ] {
            if flags.contains(category) {
                self.states[category.slot()].owns_driver = false;
            }
        }
        // The menu persists through driver reinits unless told otherwise.
        if DriverCategory::Menu.is_compiled_in() {
            self.states[DriverCategory::Menu.slot()].owns_driver = true;
        }

        // Backends read their pacing at construction.
        if flags.intersects(DriverFlags::VIDEO | DriverFlags::AUDIO) {
            self.adjust_system_rates();
        }

        let mut report = InitReport::default();

        if flags.contains(DriverCategory::Video) {
            self.pacing.reset();
            self.activate(DriverCategory::Video, &mut report);
            self.finish_video_init();
        }
        if flags.intersects(DriverFlags::VIDEO_INPUT) {
            self.activate(DriverCategory::Input, &mut report);
        }
        if flags.contains(DriverCategory::Audio) {
            self.activate(DriverCategory::Audio, &mut report);
        }

        // Camera and location are only built once something asked for them.
        for category in [DriverCategory::Camera, DriverCategory::Location] {
            if flags.contains(category) && self.states[category.slot()].active {
                self.activate(category, &mut report);
            }
        }

        if DriverCategory::Menu.is_compiled_in() {
            self.refresh_menu_core_info();
            if flags.contains(DriverCategory::Menu) {
                self.activate(DriverCategory::Menu, &mut report);
                if let Some(menu) = self.states[DriverCategory::Menu.slot()].slot.backend_mut() {
                    menu.context_reset();
                }
            }
        }

        if flags.intersects(DriverFlags::VIDEO | DriverFlags::AUDIO) && self.input_nonblock {
            self.set_nonblock_state();
        }

        for err in &report.failed {
            warn!("{err}");
        }
        Ok(report)
    }

    /// Tears down the categories in `flags`.
    ///
    /// Instances of categories that own their driver are retained for the
    /// next init.
    pub fn uninit_drivers(&mut self, flags: DriverFlags) -> Result<(), DriverError> {
        if self.shut_down {
            warn!("Ignoring driver uninit of {flags:?}; drivers were shut down");
            return Err(DriverError::ShutDown);
        }
        debug!("Uninitializing drivers {flags:?}");

        if DriverCategory::Menu.is_compiled_in() && flags.contains(DriverCategory::Menu) {
            let menu = &mut self.states[DriverCategory::Menu.slot()];
            if let Some(backend) = menu.slot.backend_mut() {
                backend.context_destroy();
            }
            if menu.owns_driver {
                retain(menu);
            } else {
                destroy(menu);
            }
        }

        for category in [DriverCategory::Location, DriverCategory::Camera] {
            if !flags.contains(category) {
                continue;
            }
            let state = &mut self.states[category.slot()];
            if state.owns_driver {
                retain(state);
            } else {
                destroy(state);
            }
        }

        if flags.contains(DriverCategory::Audio) {
            self.deinit_backend(DriverCategory::Audio);
        }
        if flags.intersects(DriverFlags::VIDEO_INPUT) {
            self.deinit_backend(DriverCategory::Video);
            self.deinit_backend(DriverCategory::Input);
        }

        for category in [
            DriverCategory::Video,
            DriverCategory::Input,
            DriverCategory::Audio,
        ] {
            if flags.contains(category) {
                let state = &mut self.states[category.slot()];
                release(state);
                state.active = false;
            }
        }
        Ok(())
    }

    /// Destroys every instance regardless of ownership and drops the core's
    /// callbacks. No further scoped init/uninit is accepted afterwards.
    pub fn shutdown(&mut self) {
        for state in &mut self.states {
            destroy(state);
            *state = CategoryState::default();
        }
        self.hw_context_reset = None;
        self.video_cache_context_ack = false;
        self.shut_down = true;
        info!("Driver manager shut down");
    }

    /// Builds the recording backend. A no-op while a recording is running.
    pub fn init_record(&mut self) -> Result<(), DriverError> {
        if self.shut_down {
            return Err(DriverError::ShutDown);
        }
        if self.recording_active() {
            return Ok(());
        }
        let mut report = InitReport::default();
        self.activate(DriverCategory::Record, &mut report);
        match report.failed.pop() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stops and frees the recording backend.
    pub fn deinit_record(&mut self) {
        destroy(&mut self.states[DriverCategory::Record.slot()]);
    }

    pub fn recording_active(&self) -> bool {
        self.states[DriverCategory::Record.slot()].has_instance()
    }

    pub fn phase(&self, category: DriverCategory) -> DriverPhase {
        if self.shut_down {
            return DriverPhase::Destroyed;
        }
        let state = &self.states[category.slot()];
        match state.slot {
            Slot::Active(_) => DriverPhase::Active,
            Slot::Retained(_) => DriverPhase::Retained,
            Slot::Empty if state.selected.is_some() => DriverPhase::Discovered,
            Slot::Empty => DriverPhase::Uninitialized,
        }
    }

    pub fn state(&self, category: DriverCategory) -> &CategoryState {
        &self.states[category.slot()]
    }

    pub fn backend(&self, category: DriverCategory) -> Option<&dyn Backend> {
        self.states[category.slot()].slot.backend()
    }

    pub fn backend_mut(&mut self, category: DriverCategory) -> Option<&mut (dyn Backend + 'static)> {
        self.states[category.slot()].slot.backend_mut()
    }

    pub fn has_instance(&self, category: DriverCategory) -> bool {
        self.states[category.slot()].has_instance()
    }

    pub fn owns_driver(&self, category: DriverCategory) -> bool {
        self.states[category.slot()].owns_driver
    }

    pub fn set_own_driver(&mut self, category: DriverCategory) {
        self.states[category.slot()].owns_driver = true;
    }

    pub fn unset_own_driver(&mut self, category: DriverCategory) {
        self.states[category.slot()].owns_driver = false;
    }

    pub fn is_active(&self, category: DriverCategory) -> bool {
        self.states[category.slot()].active
    }

    /// Marks a category as required for use (or not). Camera and location
    /// are only built by a scoped init while marked. For video, audio and
    /// input the flag is overwritten by the next scoped init or uninit.
    pub fn set_active(&mut self, category: DriverCategory, active: bool) {
        self.states[category.slot()].active = active;
    }

    pub fn input_nonblock(&self) -> bool {
        self.input_nonblock
    }

    /// Sets input's turbo (fast-forward) flag. Call
    /// [`DriverManager::set_nonblock_state`] to propagate it.
    pub fn set_input_nonblock(&mut self, nonblock: bool) {
        self.input_nonblock = nonblock;
    }

    /// Acknowledges that the video context survives the next video init.
    pub fn set_video_cache_context_ack(&mut self) {
        self.video_cache_context_ack = true;
    }

    pub fn video_cache_context_ack(&self) -> bool {
        self.video_cache_context_ack
    }

    /// Installs the loaded core's hardware-render context-reset callback.
    pub fn set_hw_context_reset(&mut self, callback: Option<Box<dyn FnMut()>>) {
        self.hw_context_reset = callback;
    }

    pub fn has_hw_context_reset(&self) -> bool {
        self.hw_context_reset.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DriverSettings {
        &mut self.settings
    }

    pub fn system(&self) -> &SystemInfo {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut SystemInfo {
        &mut self.system
    }

    pub fn rates(&self) -> &RateMonitor {
        &self.rates
    }

    pub fn frame_pacing(&self) -> &FramePacing {
        &self.pacing
    }

    pub fn frame_pacing_mut(&mut self) -> &mut FramePacing {
        &mut self.pacing
    }

    /// Brings `category` to the active phase, reusing a retained or live
    /// instance when there is one.
    fn activate(&mut self, category: DriverCategory, report: &mut InitReport) {
        let live = match std::mem::take(&mut self.states[category.slot()].slot) {
            Slot::Active(mut backend) | Slot::Retained(mut backend) => {
                let ctx = InitContext {
                    category,
                    ident: backend_ident(&self.registries, self.states[category.slot()].selected),
                    av_info: &self.system.av_info,
                    rates: self.rates.snapshot(),
                    settings: &self.settings,
                };
                backend.reinit(&ctx);
                debug!("Reusing {category} driver \"{}\"", backend.ident());
                self.states[category.slot()].slot = Slot::Active(backend);
                report.reused.insert(category);
                true
            }
            Slot::Empty => match self.construct(category) {
                Ok(Some(backend)) => {
                    info!("Initialized {category} driver \"{}\"", backend.ident());
                    self.states[category.slot()].slot = Slot::Active(backend);
                    report.constructed.insert(category);
                    true
                }
                Ok(None) => {
                    debug!("No {category} backend selected");
                    false
                }
                Err(err) => {
                    report.failed.push(err);
                    false
                }
            },
        };
        if tracks_activity(category) {
            self.states[category.slot()].active = live;
        }
    }

    fn construct(&mut self, category: DriverCategory) -> Result<Option<Box<dyn Backend>>, DriverError> {
        let handle = match self.states[category.slot()].selected {
            Some(handle) => handle,
            None => self.find_driver(category)?,
        };

        let entry = self
            .registries
            .entry(handle)
            .ok_or(DriverError::NoBackends(category))?;
        let RegistryEntry::Backend { ident, factory } = entry else {
            return Ok(None);
        };

        let ctx = InitContext {
            category,
            ident: *ident,
            av_info: &self.system.av_info,
            rates: self.rates.snapshot(),
            settings: &self.settings,
        };
        factory(&ctx).map(Some)
    }

    fn finish_video_init(&mut self) {
        let video = &self.states[DriverCategory::Video.slot()];
        let context_cached = match video.slot.backend() {
            Some(backend) => backend.context_cached(),
            None => {
                self.video_cache_context_ack = false;
                return;
            }
        };

        let context_kept = self.video_cache_context_ack || context_cached;
        if !context_kept && let Some(reset) = self.hw_context_reset.as_mut() {
            reset();
        }
        self.video_cache_context_ack = false;
    }

    fn deinit_backend(&mut self, category: DriverCategory) {
        if let Some(backend) = self.states[category.slot()].slot.backend_mut() {
            backend.deinit();
        }
    }

    fn refresh_menu_core_info(&mut self) {
        let menu = &self.states[DriverCategory::Menu.slot()];
        if matches!(menu.slot, Slot::Empty) {
            return;
        }
        self.host.command(EventCommand::CoreInfoInit);
        self.host.command(EventCommand::LoadCorePersist);
    }
}

/// Categories whose active flag follows their live instance. For camera and
/// location it is the caller's "required for use" marker instead.
fn tracks_activity(category: DriverCategory) -> bool {
    matches!(
        category,
        DriverCategory::Video | DriverCategory::Audio | DriverCategory::Input
    )
}

fn backend_ident(registries: &Registries, selected: Option<BackendHandle>) -> &'static str {
    selected
        .and_then(|handle| registries.entry(handle))
        .map(RegistryEntry::ident)
        .unwrap_or_default()
}

/// Keeps the instance alive for the next scoped init.
fn retain(state: &mut CategoryState) {
    state.slot = match std::mem::take(&mut state.slot) {
        Slot::Active(backend) | Slot::Retained(backend) => Slot::Retained(backend),
        Slot::Empty => Slot::Empty,
    };
}

/// Stops and frees the instance, active or retained.
fn destroy(state: &mut CategoryState) {
    match std::mem::take(&mut state.slot) {
        Slot::Active(mut backend) | Slot::Retained(mut backend) => {
            debug!("Destroying driver \"{}\"", backend.ident());
            backend.deinit();
        }
        Slot::Empty => {}
    }
}

/// Frees the instance unless the category owns its driver, in which case it
/// is retained.
fn release(state: &mut CategoryState) {
    if state.owns_driver {
        retain(state);
        return;
    }
    if let Slot::Active(backend) | Slot::Retained(backend) = std::mem::take(&mut state.slot) {
        debug!("Freeing driver \"{}\"", backend.ident());
    }
}
