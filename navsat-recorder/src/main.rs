#![deny(missing_docs)]
//! # Recorder
//! Reads NMEA sentences from a serial receiver (or a captured log) and
//! records the decoded navigation events as JSON lines.
mod config;
mod store;

use std::{
    fs::File,
    io,
    process::ExitCode,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use env_logger::Env;
use nmea_navsat::{open_serial, EventSink, JsonLinesSink, LineReader, NavSatDriver};

pub use config::{Args, RecorderCfg};
use store::EventStore;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();
    let cfg = match RecorderCfg::load(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if args.store_default {
        match cfg.store_default() {
            Ok(path) => log::info!("Configuration stored in {path:?}"),
            Err(e) => log::warn!("Failed to store configuration: {e}"),
        }
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed)) {
            log::warn!("Failed to install the interrupt handler: {e}");
        }
    }

    let mut sink: Box<dyn EventSink> = match &cfg.save_dir {
        Some(dir) => match EventStore::new(dir.clone(), cfg.compress) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::error!("Failed to create {dir:?}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(JsonLinesSink::new(io::stdout())),
    };

    let mut driver = NavSatDriver::new(&cfg.driver);
    let res = match &cfg.replay {
        Some(path) => match File::open(path) {
            Ok(file) => {
                log::info!("Replaying {path:?}");
                driver.run(&mut LineReader::new(file), sink.as_mut(), &shutdown)
            }
            Err(e) => {
                log::error!("Could not open {path:?}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => open_serial(
            &cfg.serial_port,
            cfg.baud_rate,
            Duration::from_millis(cfg.timeout),
        )
        .and_then(|mut port| driver.run(&mut port, sink.as_mut(), &shutdown)),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Could not read from {}: {e}", cfg.serial_port);
            ExitCode::FAILURE
        }
    }
}
