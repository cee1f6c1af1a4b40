//! Driver lifecycle management for a libretro-style frontend.
//!
//! This crate owns the compiled-in backend registries of every driver
//! category (video, audio, input, camera, ...), resolves which backend the
//! user selected, and brings categories up and down in scoped groups. It
//! keeps audio/video pacing in step with the loaded core's timing.
//! Frontends talk to it through [`DriverManager`] and supply a
//! [`DriverHost`] for events and on-screen notices.

/// Core timing and geometry shared with the frontend.
pub mod av;

/// The backend trait implemented by every driver instance.
pub mod backend;

/// Driver categories and category sets.
pub mod category;

/// Errors raised by discovery, construction and scoped init.
pub mod error;

/// Host callbacks (event bus and message queue).
pub mod host;

/// Per-category lifecycle state and scoped init/uninit.
pub mod manager;

/// Audio/video rate derivation and frame pacing statistics.
pub mod rates;

/// Backend registries and label-based lookup.
pub mod registry;

/// Cycling through registered backends by identifier.
pub mod selector;

/// Persisted backend selections and rate preferences.
pub mod settings;

/// Refresh-rate, non-blocking and AV-info synchronization hooks.
pub mod sync;

pub use av::{GameGeometry, SystemAvInfo, SystemInfo, SystemTiming};
pub use backend::{Backend, BackendFactory, InitContext};
pub use category::{DriverCategory, DriverFlags};
pub use error::DriverError;
pub use host::{DriverHost, EventCommand, MSG_RESTARTING_RECORDING, Notice};
pub use manager::{CategoryState, DriverCtl, DriverManager, DriverPhase, InitReport};
pub use rates::{FramePacing, RateMonitor, RateSnapshot};
pub use registry::{ABSENT_IDENT, BackendHandle, IDENT_CAPACITY, IdentBuf, Registries, Registry, RegistryEntry};
pub use settings::DriverSettings;
