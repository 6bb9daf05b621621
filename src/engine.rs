//! Turns decoded sentences into navigation events.
//!
//! The only state carried from one sentence to the next is [`ReceiverState`]:
//! GST sentences leave receiver-supplied error estimates behind that later
//! GGA fixes pick up, and GGA leaves the fix validity that gates VTG velocity.
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Timelike, Utc};

use crate::events::{
    FixEvent, Header, HeadingEvent, NavEvent, Quaternion, Service, TimeRefEvent, VelocityEvent,
};
use crate::grammar::{GgaData, GstData, HdtData, RmcData, VtgData};
use crate::parser::ParsedSentence;
use crate::quality::{CovarianceType, FixStatus, QualityTable};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq)]
/// Error estimates and fix validity remembered across sentences
pub struct ReceiverState {
    /// The std-devs below came from a GST sentence
    pub using_receiver_epe: bool,
    /// Longitude std-dev in meters, NaN if unset
    pub lon_std_dev: f64,
    /// Latitude std-dev in meters, NaN if unset
    pub lat_std_dev: f64,
    /// Altitude std-dev in meters, NaN if unset
    pub alt_std_dev: f64,
    /// Last GGA reported a usable position
    pub valid_fix: bool,
}

impl Default for ReceiverState {
    fn default() -> Self {
        Self {
            using_receiver_epe: false,
            lon_std_dev: f64::NAN,
            lat_std_dev: f64::NAN,
            alt_std_dev: f64::NAN,
            valid_fix: false,
        }
    }
}

#[derive(Debug, Clone)]
/// Dispatches sentences to events against a caller-owned [`ReceiverState`]
pub struct FixEngine {
    qualities: QualityTable,
    use_rmc: bool,
    time_ref_source: Option<String>,
    last_valid_fix_time: Option<TimeRefEvent>,
}

fn signed(magnitude: f64, direction: &str, negative: &str) -> f64 {
    if direction == negative {
        -magnitude
    } else {
        magnitude
    }
}

fn velocity(header: Header, speed: f64, course: f64) -> NavEvent {
    NavEvent::Velocity(VelocityEvent {
        header,
        vx: speed * course.sin(),
        vy: speed * course.cos(),
    })
}

/// Seconds since the epoch for a time of day on `date`
fn epoch_seconds(date: NaiveDate, seconds_of_day: f64) -> f64 {
    let midnight = date.and_time(NaiveTime::default()).and_utc().timestamp();
    midnight as f64 + seconds_of_day
}

/// Pick the day of `stamp` closest to a sentence time of day, so a sentence
/// from just before midnight received just after it lands on the previous day.
fn nearest_date(stamp: &DateTime<Utc>, seconds_of_day: f64) -> NaiveDate {
    let date = stamp.date_naive();
    let stamp_sod = stamp.num_seconds_from_midnight() as f64 + stamp.nanosecond() as f64 * 1e-9;
    let diff = seconds_of_day - stamp_sod;
    if diff > SECONDS_PER_DAY / 2.0 {
        date.checked_sub_days(Days::new(1)).unwrap_or(date)
    } else if diff < -SECONDS_PER_DAY / 2.0 {
        date.checked_add_days(Days::new(1)).unwrap_or(date)
    } else {
        date
    }
}

impl FixEngine {
    /// Create an engine.
    ///
    /// `use_rmc` selects RMC instead of GGA/VTG as the source of fixes.
    /// Time references are labelled with `time_ref_source`, or with the frame
    /// ID of the sentence when no label is given.
    pub fn new(qualities: QualityTable, use_rmc: bool, time_ref_source: Option<String>) -> Self {
        Self {
            qualities,
            use_rmc,
            time_ref_source: time_ref_source.filter(|s| !s.is_empty()),
            last_valid_fix_time: None,
        }
    }

    /// Time reference of the last GGA fix that carried a UTC time
    pub fn last_valid_fix_time(&self) -> Option<&TimeRefEvent> {
        self.last_valid_fix_time.as_ref()
    }

    /// Process one sentence received at `stamp` and return the resulting events.
    pub fn process(
        &mut self,
        sentence: &ParsedSentence,
        state: &mut ReceiverState,
        stamp: DateTime<Utc>,
        frame_id: &str,
    ) -> Vec<NavEvent> {
        let header = Header {
            stamp,
            frame_id: frame_id.to_string(),
        };
        let mut events = Vec::new();
        match sentence {
            ParsedSentence::Gga(data) if !self.use_rmc => {
                self.process_gga(data, state, header, &mut events)
            }
            ParsedSentence::Vtg(data) if !self.use_rmc => {
                Self::process_vtg(data, state, header, &mut events)
            }
            ParsedSentence::Rmc(data) => self.process_rmc(data, header, &mut events),
            ParsedSentence::Gst(data) => Self::process_gst(data, state),
            ParsedSentence::Hdt(data) => Self::process_hdt(data, header, &mut events),
            _ => log::trace!(
                "{} ignored, RMC is the fix source",
                sentence.kind().as_str()
            ),
        }
        events
    }

    fn time_ref(&self, header: Header, time_ref: f64) -> TimeRefEvent {
        let source = self
            .time_ref_source
            .clone()
            .unwrap_or_else(|| header.frame_id.clone());
        TimeRefEvent {
            header,
            time_ref,
            source,
        }
    }

    fn process_gga(
        &mut self,
        data: &GgaData,
        state: &mut ReceiverState,
        header: Header,
        events: &mut Vec<NavEvent>,
    ) {
        let quality = self.qualities.lookup(data.fix_type);
        let default_epe = quality.default_epe;
        state.valid_fix = quality.status.is_fix();

        // fall back to the table unless a GST sentence gave us something better
        if !state.using_receiver_epe || state.lon_std_dev.is_nan() {
            state.lon_std_dev = default_epe;
        }
        if !state.using_receiver_epe || state.lat_std_dev.is_nan() {
            state.lat_std_dev = default_epe;
        }
        if !state.using_receiver_epe || state.alt_std_dev.is_nan() {
            state.alt_std_dev = default_epe * 2.0;
        }

        let hdop = data.hdop;
        let mut position_covariance = [0.0; 9];
        position_covariance[0] = (hdop * state.lon_std_dev).powi(2);
        position_covariance[4] = (hdop * state.lat_std_dev).powi(2);
        position_covariance[8] = (2.0 * hdop * state.alt_std_dev).powi(2);

        events.push(NavEvent::Fix(FixEvent {
            header: header.clone(),
            latitude: signed(data.latitude, &data.latitude_direction, "S"),
            longitude: signed(data.longitude, &data.longitude_direction, "W"),
            // reported altitude is above the geoid, add the separation back
            altitude: data.altitude + data.mean_sea_level,
            status: quality.status,
            service: Service::Gps,
            position_covariance,
            position_covariance_type: quality.covariance_type,
        }));

        if !data.utc_time.is_nan() {
            let date = nearest_date(&header.stamp, data.utc_time);
            let time_ref = self.time_ref(header, epoch_seconds(date, data.utc_time));
            self.last_valid_fix_time = Some(time_ref.clone());
            events.push(NavEvent::TimeRef(time_ref));
        }
    }

    fn process_vtg(
        data: &VtgData,
        state: &ReceiverState,
        header: Header,
        events: &mut Vec<NavEvent>,
    ) {
        // VTG has no quality of its own, trust it only behind a valid GGA fix
        if state.valid_fix {
            events.push(velocity(header, data.speed, data.true_course));
        } else {
            log::debug!("VTG ignored, no valid fix");
        }
    }

    fn process_rmc(&self, data: &RmcData, header: Header, events: &mut Vec<NavEvent>) {
        if self.use_rmc {
            let status = if data.fix_valid {
                FixStatus::Fix
            } else {
                FixStatus::NoFix
            };
            events.push(NavEvent::Fix(FixEvent {
                header: header.clone(),
                latitude: signed(data.latitude, &data.latitude_direction, "S"),
                longitude: signed(data.longitude, &data.longitude_direction, "W"),
                altitude: f64::NAN,
                status,
                service: Service::Gps,
                position_covariance: [0.0; 9],
                position_covariance_type: CovarianceType::Unknown,
            }));

            if !data.utc_time.is_nan() {
                let date = data
                    .date
                    .unwrap_or_else(|| nearest_date(&header.stamp, data.utc_time));
                let time_ref = self.time_ref(header.clone(), epoch_seconds(date, data.utc_time));
                events.push(NavEvent::TimeRef(time_ref));
            }
        }

        // GGA carries no velocity, so RMC velocity goes out whatever the fix source
        if data.fix_valid {
            events.push(velocity(header, data.speed, data.true_course));
        }
    }

    fn process_gst(data: &GstData, state: &mut ReceiverState) {
        state.using_receiver_epe = true;
        state.lon_std_dev = data.lon_std_dev;
        state.lat_std_dev = data.lat_std_dev;
        state.alt_std_dev = data.alt_std_dev;
    }

    fn process_hdt(data: &HdtData, header: Header, events: &mut Vec<NavEvent>) {
        if !data.heading.is_finite() {
            log::debug!("HDT without heading");
            return;
        }
        events.push(NavEvent::Heading(HeadingEvent {
            header,
            quaternion: Quaternion::from_euler(0.0, 0.0, data.heading.to_radians()),
        }));
    }
}
