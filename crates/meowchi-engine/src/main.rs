//! Host binary for the Meowchi virtual pet.
//!
//! Wires configuration, storage, and the runner together and keeps the pet
//! alive until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `meowchi.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Load the pet (initialize storage, recover if needed, start a session);
//!    a storage failure is logged and the pet runs from memory
//! 4. Install the panic hook that writes to the crash log
//! 5. Start the notification logger and the runner
//! 6. On Ctrl-C, stop the runner and await the final save

mod error;
mod notifications;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use meowchi_core::config::LoggingConfig;
use meowchi_core::runner::log_run_end;
use meowchi_core::{PetConfig, PetContext, Runner, SystemClock};
use meowchi_store::{CrashDetail, CrashLog};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "meowchi.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the final save
/// fails. Storage failures at startup are logged and the pet keeps running.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so a failure here goes
    //    straight to stderr through the returned error.
    let config = PetConfig::load_or_default(Path::new(CONFIG_PATH)).map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        test_mode = config.test_mode,
        save_dir = %config.storage.save_dir.display(),
        tick_interval_ms = config.schedule.tick_interval_ms,
        autosave_interval_ms = config.schedule.autosave_interval_ms,
        "meowchi-engine starting"
    );

    // 3. Load the pet. Storage failures are not fatal: the pet runs from
    //    memory and every autosave retries the disk.
    let (context, init) = PetContext::load(config, Arc::new(SystemClock)).await;
    if let Err(ref e) = init {
        warn!(error = %e, "save storage unavailable, continuing without it");
    }
    let snapshot = context.snapshot();
    info!(
        outcome = ?init.ok(),
        hunger = snapshot.hunger,
        cleanliness = snapshot.cleanliness,
        mood = snapshot.mood,
        status = %snapshot.status,
        "Pet loaded"
    );

    // 4. Record panics in the crash log.
    install_panic_hook(context.store().crash_log().clone());

    // 5. Start the notification logger and the runner.
    let (runner, handle) = Runner::new(context);
    let logger = tokio::spawn(notifications::log_notifications(handle.subscribe()));
    let run = tokio::spawn(runner.run());
    info!("Pet runner started, press Ctrl-C to stop");

    // 6. Wait for Ctrl-C, then stop and await the final save.
    let signal = tokio::signal::ctrl_c().await;
    if let Err(ref source) = signal {
        warn!(error = %source, "failed to listen for Ctrl-C, stopping now");
    }
    info!("Shutdown requested");
    handle.request_stop();
    drop(handle);

    match run.await {
        Ok(result) => log_run_end(&result.map_err(EngineError::from)?),
        // The panic hook has already written the crash log.
        Err(e) => error!(error = %e, "pet runner task failed, no final save"),
    }

    if let Err(e) = logger.await {
        warn!(error = %e, "notification logger ended abnormally");
    }

    signal.map_err(|source| EngineError::Signal { source })?;
    info!("meowchi-engine shutdown complete");
    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Chain a panic hook that appends the panic to the crash log.
fn install_panic_hook(crash_log: CrashLog) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        crash_log.record_blocking("panic", CrashDetail::message(info.to_string()), Utc::now());
        previous(info);
    }));
}
