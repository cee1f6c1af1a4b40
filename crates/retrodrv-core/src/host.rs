/// Cross-cutting actions the driver manager asks the frontend to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventCommand {
    /// Tear down and rebuild video, audio and input with the current
    /// settings and AV info.
    Reinit,
    RecordInit,
    RecordDeinit,
    /// Force the video backend into non-blocking mode.
    VideoSetNonblockingState,
    CoreInfoInit,
    LoadCorePersist,
}

/// A user-visible message for the frontend's on-screen queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub priority: u32,
    /// How long the message stays visible, in frames.
    pub duration_frames: u32,
    /// Drop queued messages before showing this one.
    pub flush: bool,
}

impl Notice {
    pub fn new(message: impl Into<String>, priority: u32, duration_frames: u32) -> Self {
        Self {
            message: message.into(),
            priority,
            duration_frames,
            flush: false,
        }
    }
}

pub const MSG_RESTARTING_RECORDING: &str = "Restarting recording due to driver reinit.";

/// Host callbacks required by [`crate::DriverManager`].
///
/// The host owns the event bus and the message queue. Commands are issued
/// from inside manager operations, so a host that reacts by calling back into
/// the manager must queue them and act after the operation returns.
pub trait DriverHost {
    /// Requests a cross-cutting action. Returns whether the host accepted it.
    fn command(&mut self, cmd: EventCommand) -> bool;

    /// Queues a user-visible notice.
    fn notify(&mut self, notice: Notice);
}
