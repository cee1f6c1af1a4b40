mod backends;
mod config;
mod host;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};
use retrodrv_core::{
    DriverCategory, DriverCtl, DriverFlags, DriverManager, DriverSettings, GameGeometry,
    IdentBuf, Registries, SystemAvInfo, SystemTiming,
};

#[derive(Parser)]
#[command(name = "retrodrv", about = "Inspect and exercise frontend driver selection")]
struct Args {
    /// Driver config file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,

    /// List registered backends per category and exit
    #[arg(long, conflicts_with = "cycle")]
    list: bool,

    /// Select the next backend of a category, e.g. "video driver"
    #[arg(long, value_name = "LABEL")]
    cycle: Option<String>,

    /// Select the previous backend instead of the next one (with --cycle)
    #[arg(long, requires = "cycle")]
    previous: bool,

    /// Frame rate of the simulated core
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Audio sample rate of the simulated core
    #[arg(long, default_value_t = 48_000.0)]
    sample_rate: f64,

    /// Override the monitor refresh rate from the config
    #[arg(long)]
    refresh_rate: Option<f64>,

    /// Number of frames to run
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Run the session with fast-forward held
    #[arg(long)]
    turbo: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut settings = config::load_from_file(&config_path);
    if let Some(hz) = args.refresh_rate {
        settings.video_refresh_rate = hz;
    }

    let registries = backends::registries();

    if args.list {
        list_backends(&registries, &settings);
        return;
    }

    if let Some(label) = &args.cycle {
        if !cycle_backend(&registries, &mut settings, label, args.previous) {
            std::process::exit(1);
        }
    } else {
        run_session(&args, registries, settings.clone());
    }

    if args.save_config {
        match config::save_to_file(&config_path, &settings) {
            Ok(()) => info!("Saved driver config to {}", config_path.display()),
            Err(e) => error!("Failed to save driver config {}: {e}", config_path.display()),
        }
    }
}

fn list_backends(registries: &Registries, settings: &DriverSettings) {
    for category in DriverCategory::ALL {
        let Some(registry) = registries.get(category) else {
            println!("{}: (not compiled in)", category.label());
            continue;
        };
        let selected = settings.selected(category);
        let idents: Vec<String> = registry
            .idents()
            .map(|ident| {
                if ident.eq_ignore_ascii_case(selected) {
                    format!("[{ident}]")
                } else {
                    ident.to_string()
                }
            })
            .collect();
        println!("{}: {}", category.label(), idents.join(" "));
    }
}

fn cycle_backend(
    registries: &Registries,
    settings: &mut DriverSettings,
    label: &str,
    backwards: bool,
) -> bool {
    let Some(category) = DriverCategory::from_label(label) else {
        error!("Unknown driver category \"{label}\"");
        return false;
    };

    let mut ident = IdentBuf::from_ident(settings.selected(category));
    let moved = if backwards {
        registries.previous(label, &mut ident)
    } else {
        registries.next(label, &mut ident)
    };
    if moved {
        settings.select(category, ident.as_str());
        println!("{label}: {ident}");
    }
    moved
}

fn run_session(args: &Args, registries: Registries, settings: DriverSettings) {
    let (host, event_rx) = host::channel();
    let mut manager = DriverManager::new(host, registries, settings);

    manager.ctl(DriverCtl::InitPre);
    manager.system_mut().av_info = SystemAvInfo {
        timing: SystemTiming {
            fps: args.fps,
            sample_rate: args.sample_rate,
        },
        geometry: GameGeometry {
            base_width: 320,
            base_height: 240,
            max_width: 640,
            max_height: 480,
            aspect_ratio: 4.0 / 3.0,
        },
    };

    match manager.init_drivers(DriverFlags::ALL) {
        Ok(report) => {
            info!(
                "Drivers up: built {:?}, reused {:?}",
                report.constructed, report.reused
            );
            for err in &report.failed {
                warn!("{err}");
            }
        }
        Err(err) => {
            error!("Driver init failed: {err}");
            return;
        }
    }
    host::drain(&mut manager, &event_rx);

    if args.turbo {
        manager.set_input_nonblock(true);
        manager.ctl(DriverCtl::SetNonblockState);
    }

    // Frames are paced on a synthetic clock at the core's rate.
    let frame_time = Duration::from_secs_f64(1.0 / args.fps.max(1.0));
    let start = Instant::now();
    for frame in 0..args.frames {
        manager.frame_pacing_mut().record_frame(start + frame_time * frame);
    }
    if let Some(hz) = manager.frame_pacing().estimated_refresh_rate() {
        info!(
            "Paced {} frames at {hz:.3} Hz (display {:.3} Hz)",
            manager.frame_pacing().samples() + 1,
            manager.rates().refresh_rate()
        );
    }

    // A second pass with the same AV info exercises the reinit path.
    let av_info = manager.system().av_info;
    manager.ctl(DriverCtl::UpdateSystemAvInfo(Some(&av_info)));
    let handled = host::drain(&mut manager, &event_rx);
    info!("Handled {handled} host events after AV info update");

    manager.ctl(DriverCtl::Deinit);
}
