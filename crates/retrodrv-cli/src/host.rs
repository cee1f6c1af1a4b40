//! Channel-backed [`DriverHost`] and the loop that acts on its events.
//!
//! The manager emits commands from inside its own operations, so they are
//! queued here and handled once the operation has returned.

use crossbeam_channel as cb;
use log::{debug, info, warn};
use retrodrv_core::{DriverFlags, DriverHost, DriverManager, EventCommand, Notice};

#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Command(EventCommand),
    Notice(Notice),
}

pub struct ChannelHost {
    event_tx: cb::Sender<HostEvent>,
}

pub fn channel() -> (ChannelHost, cb::Receiver<HostEvent>) {
    let (event_tx, event_rx) = cb::unbounded();
    (ChannelHost { event_tx }, event_rx)
}

impl DriverHost for ChannelHost {
    fn command(&mut self, cmd: EventCommand) -> bool {
        self.event_tx.send(HostEvent::Command(cmd)).is_ok()
    }

    fn notify(&mut self, notice: Notice) {
        if self.event_tx.send(HostEvent::Notice(notice)).is_err() {
            warn!("Dropping notice; event receiver is gone");
        }
    }
}

/// Handles queued events until the channel is empty, including events
/// raised while handling earlier ones. Returns how many were handled.
pub fn drain(manager: &mut DriverManager<ChannelHost>, event_rx: &cb::Receiver<HostEvent>) -> usize {
    let mut handled = 0;
    while let Ok(event) = event_rx.try_recv() {
        handled += 1;
        match event {
            HostEvent::Command(cmd) => handle_command(manager, cmd),
            HostEvent::Notice(notice) => {
                info!(
                    "[notice p{} {}f] {}",
                    notice.priority, notice.duration_frames, notice.message
                );
            }
        }
    }
    handled
}

fn handle_command(manager: &mut DriverManager<ChannelHost>, cmd: EventCommand) {
    match cmd {
        EventCommand::Reinit => {
            let result = manager
                .uninit_drivers(DriverFlags::ALL)
                .and_then(|()| manager.init_drivers(DriverFlags::ALL));
            match result {
                Ok(report) if !report.is_complete() => {
                    warn!("Driver reinit left {} categories down", report.failed.len());
                }
                Ok(_) => debug!("Drivers reinitialized"),
                Err(err) => warn!("Driver reinit failed: {err}"),
            }
        }
        EventCommand::RecordInit => {
            if let Err(err) = manager.init_record() {
                warn!("Failed to start recording: {err}");
            }
        }
        EventCommand::RecordDeinit => manager.deinit_record(),
        EventCommand::VideoSetNonblockingState => manager.force_video_nonblock(),
        EventCommand::CoreInfoInit | EventCommand::LoadCorePersist => {
            debug!("{cmd:?}: no core loaded");
        }
    }
}
