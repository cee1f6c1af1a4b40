//! Integration tests for cycling through registered backends by identifier.

mod common;

use common::{call_log, fake, fake_registries};
use retrodrv_core::{DriverCategory, IdentBuf, Registries, Registry, RegistryEntry};

fn gl_then_null() -> Registries {
    let log = call_log();
    let mut registries = Registries::absent_only();
    registries.install(Registry::new(
        DriverCategory::Video,
        vec![fake(DriverCategory::Video, "gl", &log), RegistryEntry::Absent],
    ));
    registries
}

#[test]
fn index_of_finds_every_registered_ident() {
    let registries = fake_registries(&call_log());
    let registry = registries.get(DriverCategory::Video).unwrap();
    for (index, ident) in registry.idents().enumerate() {
        assert_eq!(registries.index_of("video driver", ident), Some(index));
    }
}

#[test]
fn index_of_ignores_ascii_case() {
    let registries = fake_registries(&call_log());
    assert_eq!(registries.index_of("video driver", "GL"), Some(0));
    assert_eq!(registries.index_of("audio driver", "Pulse"), Some(1));
    assert_eq!(registries.index_of("video driver", "NULL"), Some(2));
}

#[test]
fn index_of_misses_unknown_ident_and_label() {
    let registries = fake_registries(&call_log());
    assert_eq!(registries.index_of("video driver", "d3d11"), None);
    assert_eq!(registries.index_of("gpu driver", "gl"), None);
}

#[test]
fn index_of_stops_at_empty_ident() {
    let log = call_log();
    let mut registries = Registries::absent_only();
    registries.install(Registry::new(
        DriverCategory::Audio,
        vec![
            fake(DriverCategory::Audio, "alsa", &log),
            fake(DriverCategory::Audio, "", &log),
            fake(DriverCategory::Audio, "pulse", &log),
        ],
    ));
    assert_eq!(registries.index_of("audio driver", "alsa"), Some(0));
    assert_eq!(registries.index_of("audio driver", "pulse"), None);
}

#[test]
fn first_writes_index_zero() {
    let registries = fake_registries(&call_log());
    let mut ident = IdentBuf::from_ident("pulse");
    assert!(registries.first("audio driver", &mut ident));
    assert_eq!(ident, "alsa");
}

#[test]
fn first_succeeds_even_for_unknown_label() {
    let registries = fake_registries(&call_log());
    let mut ident = IdentBuf::from_ident("keep");
    assert!(registries.first("gpu driver", &mut ident));
    assert_eq!(ident, "keep");
}

#[test]
fn next_moves_onto_absent_entry_but_not_past_it() {
    let registries = gl_then_null();
    let mut ident = IdentBuf::from_ident("gl");

    assert!(registries.next("video driver", &mut ident));
    assert_eq!(ident, "null");

    assert!(!registries.next("video driver", &mut ident));
    assert_eq!(ident, "null");

    assert!(registries.previous("video driver", &mut ident));
    assert_eq!(ident, "gl");
}

#[test]
fn previous_at_first_entry_fails_unchanged() {
    let registries = fake_registries(&call_log());
    let mut ident = IdentBuf::from_ident("udev");
    assert!(!registries.previous("input driver", &mut ident));
    assert_eq!(ident, "udev");
}

#[test]
fn next_and_previous_fail_for_unregistered_ident() {
    let registries = fake_registries(&call_log());
    let mut ident = IdentBuf::from_ident("sdl2");
    assert!(!registries.next("input driver", &mut ident));
    assert!(!registries.previous("input driver", &mut ident));
    assert_eq!(ident, "sdl2");
}

#[test]
fn cycling_from_first_visits_every_entry_once() {
    let registries = fake_registries(&call_log());
    for label in ["video driver", "input driver", "menu driver", "audio resampler driver"] {
        let category = DriverCategory::from_label(label).unwrap();
        if !category.is_compiled_in() {
            continue;
        }
        let registry = registries.get(category).unwrap();
        let expected: Vec<_> = registry.idents().collect();

        let mut ident = IdentBuf::new();
        assert!(registries.first(label, &mut ident));
        let mut visited = vec![ident.to_string()];
        for _ in 1..registry.len() {
            assert!(registries.next(label, &mut ident), "{label}: stuck at {ident}");
            visited.push(ident.to_string());
        }
        assert_eq!(visited, expected);

        // The last entry has nowhere to go.
        assert!(!registries.next(label, &mut ident));
        assert_eq!(ident.as_str(), *expected.last().unwrap());
    }
}

#[test]
fn lookup_truncates_ident_to_buffer_capacity() {
    let registries = fake_registries(&call_log());
    let mut ident = IdentBuf::with_capacity(2);

    let handle = registries.lookup("video driver", 1, &mut ident).unwrap();
    assert_eq!(handle.category(), DriverCategory::Video);
    assert_eq!(handle.index(), 1);
    assert_eq!(ident.as_str(), "vu");

    // Out of range leaves the buffer alone.
    assert!(registries.lookup("video driver", 9, &mut ident).is_none());
    assert_eq!(ident.as_str(), "vu");
}
