//! Integration tests for refresh-rate, non-blocking and AV-info
//! synchronization.

mod common;

use common::{
    Call, call_log, construction_rates, count, last_nonblock, manager, manager_with,
    fake_settings,
};
use retrodrv_core::{
    DriverCategory, DriverCtl, DriverFlags, DriverSettings, EventCommand, GameGeometry,
    MSG_RESTARTING_RECORDING, SystemAvInfo, SystemTiming,
};

fn av_info(fps: f64, sample_rate: f64) -> SystemAvInfo {
    SystemAvInfo {
        timing: SystemTiming { fps, sample_rate },
        geometry: GameGeometry {
            base_width: 256,
            base_height: 224,
            max_width: 512,
            max_height: 448,
            aspect_ratio: 4.0 / 3.0,
        },
    }
}

fn settings_at(refresh: f64) -> DriverSettings {
    DriverSettings {
        video_refresh_rate: refresh,
        audio_out_rate: 48_000,
        ..fake_settings()
    }
}

#[test]
fn av_info_update_requests_reinit() {
    let log = call_log();
    let mut manager = manager(&log);
    let info = av_info(60.0, 44_100.0);

    assert!(manager.ctl(DriverCtl::UpdateSystemAvInfo(Some(&info))));
    assert_eq!(manager.system().av_info, info);
    assert_eq!(manager.host().commands, vec![EventCommand::Reinit]);
    assert!(manager.host().notices.is_empty());
}

#[test]
fn av_info_update_restarts_running_recording() {
    let log = call_log();
    let mut manager = manager(&log);
    manager.init_record().unwrap();

    assert!(manager.update_system_av_info(&av_info(50.0, 32_000.0)));
    assert_eq!(
        manager.host().commands,
        vec![
            EventCommand::Reinit,
            EventCommand::RecordDeinit,
            EventCommand::RecordInit
        ]
    );

    let notices = &manager.host().notices;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, MSG_RESTARTING_RECORDING);
    assert_eq!(notices[0].priority, 2);
    assert_eq!(notices[0].duration_frames, 180);
    assert!(!notices[0].flush);
}

#[test]
fn rates_are_adjusted_before_construction() {
    let log = call_log();
    let mut manager = manager_with(&log, settings_at(60.0));
    manager.system_mut().av_info = av_info(60.0, 48_000.0);

    manager.init_drivers(DriverFlags::VIDEO | DriverFlags::AUDIO).unwrap();

    let audio = construction_rates(&log, DriverCategory::Audio).unwrap();
    assert_eq!(audio.core_fps, 60.0);
    assert!((audio.audio_in_rate - 48_000.0).abs() < 1e-9);
    assert!((audio.src_ratio - 1.0).abs() < 1e-12);
    let video = construction_rates(&log, DriverCategory::Video).unwrap();
    assert_eq!(video.refresh_rate, 60.0);
    assert!(!manager.system().force_nonblock);
}

#[test]
fn vsync_off_keeps_video_nonblocking() {
    let log = call_log();
    let settings = DriverSettings {
        video_vsync: false,
        ..fake_settings()
    };
    let mut manager = manager_with(&log, settings);
    manager.init_drivers(DriverFlags::VIDEO | DriverFlags::AUDIO).unwrap();

    assert!(manager.ctl(DriverCtl::SetNonblockState));
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(true));
    assert_eq!(last_nonblock(&log, DriverCategory::Audio), Some(false));
    assert!(manager.state(DriverCategory::Video).nonblock());
    assert!(!manager.state(DriverCategory::Audio).nonblock());
}

#[test]
fn turbo_reaches_video_and_audio() {
    let log = call_log();
    let mut manager = manager(&log);
    manager.init_drivers(DriverFlags::VIDEO | DriverFlags::AUDIO).unwrap();

    manager.set_input_nonblock(true);
    manager.set_nonblock_state();
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(true));
    assert_eq!(last_nonblock(&log, DriverCategory::Audio), Some(true));

    manager.set_input_nonblock(false);
    manager.set_nonblock_state();
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(false));
    assert_eq!(last_nonblock(&log, DriverCategory::Audio), Some(false));
}

#[test]
fn turbo_is_reapplied_after_reinit() {
    let log = call_log();
    let mut manager = manager(&log);
    manager.set_input_nonblock(true);

    manager.init_drivers(DriverFlags::VIDEO | DriverFlags::AUDIO).unwrap();
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(true));
    assert_eq!(last_nonblock(&log, DriverCategory::Audio), Some(true));
}

#[test]
fn inactive_video_ignores_nonblock_changes() {
    let log = call_log();
    let mut manager = manager(&log);
    manager.init_drivers(DriverFlags::AUDIO).unwrap();

    manager.set_input_nonblock(true);
    manager.set_nonblock_state();
    assert_eq!(count(&log, |c| matches!(c, Call::Nonblock(DriverCategory::Video, _))), 0);
    assert_eq!(last_nonblock(&log, DriverCategory::Audio), Some(true));
}

#[test]
fn fast_core_forces_video_nonblock() {
    let log = call_log();
    let mut manager = manager_with(&log, settings_at(60.0));
    manager.system_mut().av_info = av_info(120.0, 48_000.0);
    manager.init_drivers(DriverFlags::VIDEO).unwrap();
    assert!(manager.system().force_nonblock);

    assert!(manager.ctl(DriverCtl::SetRefreshRate(60.0)));
    assert_eq!(
        manager.host().commands,
        vec![EventCommand::VideoSetNonblockingState]
    );

    // What a host does in response to the event.
    manager.force_video_nonblock();
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(true));

    manager.set_nonblock_state();
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(true));
}

#[test]
fn refresh_rate_change_rescales_audio() {
    let log = call_log();
    let mut manager = manager_with(&log, settings_at(60.0));
    manager.system_mut().av_info = av_info(60.0, 48_000.0);
    manager.init_drivers(DriverFlags::VIDEO | DriverFlags::AUDIO).unwrap();

    manager.set_refresh_rate(59.0);
    assert_eq!(manager.settings().video_refresh_rate, 59.0);
    assert_eq!(manager.rates().refresh_rate(), 59.0);

    let rates = manager.rates().snapshot();
    let expected = 48_000.0 * 59.0 / 60.0;
    assert!((rates.audio_in_rate - expected).abs() < 1e-6);
    assert!((rates.src_ratio - 48_000.0 / expected).abs() < 1e-9);
    // Within tolerance, so vsync stays in charge.
    assert!(manager.host().commands.is_empty());
    assert_eq!(last_nonblock(&log, DriverCategory::Video), Some(false));
}
