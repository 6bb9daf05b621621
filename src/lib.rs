#![deny(missing_docs)]
//! # NMEA Navigation Satellite Driver
//! Turns the NMEA sentences of a positioning receiver into navigation events.
//!
//! Decodes GGA, VTG, RMC, GST and HDT sentences and derives position fixes
//! with covariance, ground velocity, heading and a UTC time reference.
//! Error estimates reported by GST sentences are remembered and applied to
//! the following GGA fixes.
mod checksum;
mod config;
mod engine;
mod error;
mod events;
mod grammar;
mod parser;
mod quality;
mod sink;
mod transport;

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

pub use checksum::{nmea_checksum, validate_checksum};
pub use config::DriverConfig;
pub use engine::{FixEngine, ReceiverState};
pub use error::NavError;
pub use events::{
    FixEvent, Header, HeadingEvent, NavEvent, Quaternion, Service, TimeRefEvent, VelocityEvent,
};
pub use grammar::{GgaData, GstData, HdtData, RmcData, SentenceType, VtgData};
pub use parser::{parse_sentence, ParsedSentence};
pub use quality::{CovarianceType, EpeConfig, FixStatus, QualityEntry, QualityTable};
pub use sink::{EventSink, JsonLinesSink};
pub use transport::{open_serial, LineReader, ReadOutcome};

/// Checksum, parser and fix engine chained together
pub struct NavSatDriver {
    engine: FixEngine,
    state: ReceiverState,
    frame_id: String,
}

impl NavSatDriver {
    /// Create a driver with fresh receiver state
    pub fn new(cfg: &DriverConfig) -> Self {
        Self {
            engine: FixEngine::new(
                QualityTable::new(&cfg.epe),
                cfg.use_rmc,
                cfg.time_ref_source.clone(),
            ),
            state: ReceiverState::default(),
            frame_id: cfg.frame_id(),
        }
    }

    /// State carried across sentences
    pub fn state(&self) -> &ReceiverState {
        &self.state
    }

    /// The underlying fix engine
    pub fn engine(&self) -> &FixEngine {
        &self.engine
    }

    /// Validate, parse and process one sentence received at `stamp`.
    pub fn add_sentence(
        &mut self,
        sentence: &str,
        stamp: DateTime<Utc>,
    ) -> Result<Vec<NavEvent>, NavError> {
        let sentence = sentence.trim();
        validate_checksum(sentence)?;
        let parsed = parse_sentence(sentence)?;
        Ok(self
            .engine
            .process(&parsed, &mut self.state, stamp, &self.frame_id))
    }

    /// Process one raw line and publish its events.
    ///
    /// Bad lines are logged and dropped. Returns the number of published events.
    pub fn handle_line<S: EventSink + ?Sized>(
        &mut self,
        line: &[u8],
        stamp: DateTime<Utc>,
        sink: &mut S,
    ) -> usize {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                log_dropped(&NavError::Decode(e.to_string()), &String::from_utf8_lossy(line));
                return 0;
            }
        };
        if line.trim().is_empty() {
            return 0;
        }
        match self.add_sentence(line, stamp) {
            Ok(events) => {
                for event in &events {
                    sink.publish(event);
                }
                events.len()
            }
            Err(e) => {
                log_dropped(&e, line);
                0
            }
        }
    }

    /// Read lines from `source` until shutdown is requested or the source closes.
    ///
    /// Only a transport failure is returned as an error.
    pub fn run<R: Read, S: EventSink + ?Sized>(
        &mut self,
        source: &mut LineReader<R>,
        sink: &mut S,
        shutdown: &AtomicBool,
    ) -> Result<(), NavError> {
        while !shutdown.load(Ordering::Relaxed) {
            match source.read_line() {
                Ok(ReadOutcome::Line(line)) => {
                    self.handle_line(&line, Utc::now(), sink);
                }
                Ok(ReadOutcome::Timeout) => continue,
                Ok(ReadOutcome::Closed) => {
                    log::info!("Input closed");
                    return Ok(());
                }
                Err(e) => {
                    log::error!("{e}");
                    return Err(e);
                }
            }
        }
        log::info!("Shutdown requested");
        Ok(())
    }
}

fn log_dropped(err: &NavError, line: &str) {
    match err {
        NavError::UnsupportedSentenceType(kind) => {
            log::debug!("Sentence type {kind:?} not supported, ignoring")
        }
        NavError::MalformedSentence(_) => {
            log::debug!("{err}, sentence was: {line:?}")
        }
        NavError::ChecksumMismatch { .. } => {
            log::warn!("Received a sentence with an invalid checksum ({err}), sentence was: {line:?}")
        }
        _ => log::warn!("{err}, sentence was: {line:?}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const GST: &str = "$GPGST,172814.0,0.006,0.023,0.020,273.6,0.023,0.020,0.031*6A";

    #[test]
    fn example_fix() {
        let mut driver = NavSatDriver::new(&DriverConfig::default());
        let events = driver.add_sentence(GGA, Utc::now()).unwrap();
        let NavEvent::Fix(fix) = &events[0] else {
            panic!("expected a fix, got {events:?}");
        };
        assert!((fix.latitude - 48.1173).abs() < 1e-4);
        assert!((fix.longitude - 11.5166667).abs() < 1e-6);
        assert!((fix.altitude - 592.3).abs() < 1e-6);
        assert_eq!(fix.status, FixStatus::Fix);
        assert!(matches!(events[1], NavEvent::TimeRef(_)));
    }

    #[test]
    fn bad_lines_are_dropped() {
        let mut driver = NavSatDriver::new(&DriverConfig::default());
        let mut sink: Vec<NavEvent> = Vec::new();
        let stamp = Utc::now();
        let lines: [&[u8]; 6] = [
            // missing checksum
            b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,",
            // wrong checksum
            b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*48",
            // unsupported
            b"$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39",
            // undecodable latitude
            b"$GPGGA,123519,48x7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*0F",
            // not UTF-8
            b"$GPHDT,\xff\xfe,T*34",
            b"",
        ];
        for line in lines {
            assert_eq!(driver.handle_line(line, stamp, &mut sink), 0);
        }
        assert!(sink.is_empty());
        let state = driver.state();
        assert!(!state.valid_fix && !state.using_receiver_epe);
        assert!(state.lat_std_dev.is_nan() && state.lon_std_dev.is_nan());
        assert_eq!(
            driver.add_sentence("$GPHDT,045.0,T", stamp),
            Err(NavError::MalformedSentence(
                "expected one checksum delimiter in \"$GPHDT,045.0,T\"".into()
            ))
        );
    }

    #[test]
    fn run_until_closed() {
        let cfg = DriverConfig {
            tf_prefix: "rover".into(),
            ..Default::default()
        };
        let mut driver = NavSatDriver::new(&cfg);
        let input = format!("{GST}\r\ngarbage\r\n{GGA}\r\n$GPHDT,045.0,T*34\r\n");
        let mut source = LineReader::new(Cursor::new(input.into_bytes()));
        let mut sink: Vec<NavEvent> = Vec::new();
        let shutdown = AtomicBool::new(false);
        driver.run(&mut source, &mut sink, &shutdown).unwrap();

        assert_eq!(sink.len(), 3);
        assert!(sink.iter().all(|e| e.header().frame_id == "rover/gps"));
        let NavEvent::Fix(fix) = &sink[0] else {
            panic!("expected a fix");
        };
        // error estimates from the GST sentence
        assert!((fix.position_covariance[0] - (0.9f64 * 0.020).powi(2)).abs() < 1e-12);
        assert!(driver.state().using_receiver_epe);
        assert!(driver.engine().last_valid_fix_time().is_some());
        assert!(matches!(sink[2], NavEvent::Heading(_)));
    }

    #[test]
    fn run_stops_on_shutdown() {
        let mut driver = NavSatDriver::new(&DriverConfig::default());
        let mut source = LineReader::new(Cursor::new(format!("{GGA}\n").into_bytes()));
        let mut sink: Vec<NavEvent> = Vec::new();
        let shutdown = AtomicBool::new(true);
        driver.run(&mut source, &mut sink, &shutdown).unwrap();
        assert!(sink.is_empty());
    }
}
