use anyhow::{Context, Result};
use chrono::{Local, Utc};
use fs2::FileExt;
use std::{
    fs::{File, OpenOptions},
    io::{Seek, SeekFrom, Write},
    sync::atomic::Ordering,
    time::Duration,
};

mod args;
mod backlight;
mod brightness;
mod config;
mod constants;
mod display;
mod logger;
mod signals;
mod solar;
mod utils;

use args::{CliAction, ParsedArgs, display_help, display_version_info};
use backlight::{set_backlight_power, verify_brightnessctl_installed_and_version};
use brightness::BrightnessModel;
use config::Config;
use constants::*;
use logger::Log;
use signals::{SignalState, WaitOutcome, setup_signal_handler, wait_out_poll_interval};

// Constants
const CHECK_INTERVAL: Duration = Duration::from_secs(CHECK_INTERVAL_SECS);

/// Determine the lock file path for this instance.
///
/// `XDG_RUNTIME_DIR` is already per-user; the `/tmp` fallback gets a uid
/// suffix so two users on a shared machine do not contend for one file.
fn lock_file_path() -> String {
    match std::env::var("XDG_RUNTIME_DIR") {
        Ok(runtime_dir) => format!("{}/brightr.lock", runtime_dir),
        Err(_) => format!("/tmp/brightr-{}.lock", nix::unistd::Uid::current()),
    }
}

/// Acquire the single-instance lock, writing our PID into the lock file.
///
/// The file is opened without truncation so a losing instance never destroys
/// the winner's PID record; only after the exclusive lock is held do we
/// truncate and write. The advisory lock is released automatically by the
/// kernel if the process dies, so a leftover file from a crash is harmless -
/// the next instance locks it and overwrites the stale PID.
///
/// # Returns
/// - `Ok(file)` - Lock held; keep the handle alive for the process lifetime
/// - `Err` - Another instance holds the lock
fn acquire_lock(lock_path: &str) -> Result<File> {
    let mut lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("failed to open lock file {}", lock_path))?;

    if lock_file.try_lock_exclusive().is_err() {
        // Read the owner's PID for the error message; content is diagnostic only
        let owner = std::fs::read_to_string(lock_path)
            .ok()
            .and_then(|content| content.trim().parse::<i32>().ok());

        let detail = match owner {
            Some(pid) => {
                // Probe liveness so the message distinguishes a running
                // instance from a PID recycled by an unrelated process
                let alive =
                    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok();
                if alive {
                    format!("held by PID {}", pid)
                } else {
                    format!("held; lock file names PID {} which is gone", pid)
                }
            }
            None => "held by another process".to_string(),
        };
        anyhow::bail!("lock {} is {}", lock_path, detail);
    }

    // Lock acquired; now it is safe to replace the content with our PID
    lock_file.set_len(0).context("failed to truncate lock file")?;
    lock_file
        .seek(SeekFrom::Start(0))
        .context("failed to rewind lock file")?;
    writeln!(lock_file, "{}", nix::unistd::getpid())
        .context("failed to write PID to lock file")?;
    lock_file.flush().context("failed to flush lock file")?;

    Ok(lock_file)
}

/// Perform cleanup operations when shutting down the application.
///
/// Drops the lock file handle to release the advisory lock, then removes the
/// file from disk.
fn cleanup(lock_file: File, lock_path: &str) {
    Log::log_decorated("Performing cleanup...");

    drop(lock_file);

    if let Err(e) = std::fs::remove_file(lock_path) {
        Log::log_decorated(&format!("Warning: Failed to remove lock file: {}", e));
    }

    Log::log_decorated("Cleanup complete");
}

/// Push the model's current physical brightness to the backlight.
///
/// An actuator failure is logged and swallowed; the next tick retries with a
/// fresh value, so a transient brightnessctl error never kills the daemon.
fn push_backlight(model: &BrightnessModel, now: chrono::DateTime<Utc>, debug_enabled: bool) {
    let absolute = model.absolute(now);
    match set_backlight_power(absolute) {
        Ok(()) => {
            if debug_enabled {
                Log::log_debug(&format!(
                    "perceived {:.3}, backlight {}%",
                    model.perceived(now),
                    backlight::power_to_percent(absolute)
                ));
            }
        }
        Err(e) => {
            Log::log_warning(&format!("Failed to set backlight: {}", e));
            Log::log_decorated("Will retry on next cycle...");
        }
    }
}

/// Log today's solar events so the user can sanity-check their coordinates.
fn log_solar_diagnostics(config: &Config) {
    match solar::sunrise_sunset_local(config.latitude, config.longitude, Local::now().date_naive())
    {
        Ok((sunrise, sunset)) => {
            Log::log_indented(&format!(
                "Today: sunrise {}, sunset {}",
                sunrise.format("%H:%M"),
                sunset.format("%H:%M")
            ));
        }
        Err(e) => {
            Log::log_warning(&format!("Could not compute today's solar events: {}", e));
        }
    }
}

/// Run the poll/bump driver loop until a shutdown signal arrives.
///
/// Each iteration re-bases the model against the current solar elevation and
/// docked state, pushes the result, then waits out the poll interval in small
/// chunks. Brightness signals drain from the channel during the wait and are
/// applied and pushed immediately; the wait then resumes with its leftover
/// duration, so the next tick may come slightly early - harmless, since
/// `tick` only re-bases and lets the offset keep decaying from its last
/// anchor.
fn run_loop(
    config: &Config,
    model: &mut BrightnessModel,
    signal_state: &SignalState,
    debug_enabled: bool,
) -> Result<()> {
    let poll_interval = Duration::from_secs(config.poll_interval_secs());

    while signal_state.running.load(Ordering::SeqCst) {
        let now = Utc::now();
        let elevation = solar::solar_elevation(config.latitude, config.longitude, now)?;
        let external = display::external_display_connected();

        if debug_enabled {
            Log::log_debug(&format!(
                "solar elevation {:.2}°{}",
                elevation,
                if external { ", external display" } else { "" }
            ));
        }

        model.tick(now, elevation, external);
        push_backlight(model, now, debug_enabled);

        let outcome = wait_out_poll_interval(
            &signal_state.signal_receiver,
            &signal_state.running,
            poll_interval,
            CHECK_INTERVAL,
            |direction| {
                let now = Utc::now();
                model.bump(direction, now);
                Log::log_decorated(&format!(
                    "Brightness {:?}: perceived now {:.0}%",
                    direction,
                    model.perceived(now) * 100.0
                ));
                push_backlight(model, now, debug_enabled);
            },
        );
        if outcome == WaitOutcome::ShutdownRequested {
            return Ok(());
        }
    }

    Ok(())
}

/// Run the application after argument dispatch.
fn run(debug_enabled: bool) -> Result<()> {
    Log::log_version();

    // First thing: verify brightnessctl is installed and a compatible version
    verify_brightnessctl_installed_and_version()?;

    // Create and acquire the single-instance lock
    let lock_path = lock_file_path();
    let lock_file = match acquire_lock(&lock_path) {
        Ok(file) => file,
        Err(e) => {
            Log::log_error(&format!(
                "Another instance of brightr is already running ({}).\n\
                • Kill brightr before restarting.",
                e
            ));
            std::process::exit(EXIT_FAILURE);
        }
    };
    Log::log_decorated("Lock acquired, starting brightr...");

    let config = Config::load()?;
    config.log_config();
    log_solar_diagnostics(&config);

    let signal_state = setup_signal_handler()?;

    let mut model = BrightnessModel::new(&config.model_params(), Utc::now())?;

    Log::log_block_start("Tracking daylight...");
    let result = run_loop(&config, &mut model, &signal_state, debug_enabled);

    Log::log_block_start("Shutting down brightr...");
    cleanup(lock_file, &lock_path);
    Log::log_end();

    result
}

fn main() -> Result<()> {
    let parsed = ParsedArgs::from_env();

    match parsed.action {
        CliAction::Run { debug_enabled } => run(debug_enabled),
        CliAction::ShowVersion => {
            display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
    }
}
