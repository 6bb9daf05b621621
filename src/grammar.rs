//! Field layout of the supported sentences and the decoders for each field.
use chrono::NaiveDate;
use serde::Serialize;

use crate::NavError;

const KNOTS_TO_MPS: f64 = 0.514444444444;

#[derive(Debug, Copy, PartialEq, Eq, Clone, Hash, Serialize)]
/// Sentence types understood by the parser
pub enum SentenceType {
    /// Fix data
    Gga,
    /// Track made good and ground speed
    Vtg,
    /// Recommended minimum navigation data
    Rmc,
    /// Pseudorange error statistics
    Gst,
    /// True heading
    Hdt,
}

impl SentenceType {
    /// Resolve the three-letter type that follows the talker ID
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "GGA" => Some(Self::Gga),
            "VTG" => Some(Self::Vtg),
            "RMC" => Some(Self::Rmc),
            "GST" => Some(Self::Gst),
            "HDT" => Some(Self::Hdt),
            _ => None,
        }
    }

    /// Three-letter name of the sentence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gga => "GGA",
            Self::Vtg => "VTG",
            Self::Rmc => "RMC",
            Self::Gst => "GST",
            Self::Hdt => "HDT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Decoded GGA sentence
pub struct GgaData {
    /// Seconds since UTC midnight, NaN if blank
    pub utc_time: f64,
    /// Latitude magnitude in decimal degrees
    pub latitude: f64,
    /// `N` or `S`
    pub latitude_direction: String,
    /// Longitude magnitude in decimal degrees
    pub longitude: f64,
    /// `E` or `W`
    pub longitude_direction: String,
    /// Receiver fix quality code
    pub fix_type: i32,
    /// Satellites in use
    pub num_satellites: u32,
    /// Horizontal dilution of precision
    pub hdop: f64,
    /// Antenna altitude in meters
    pub altitude: f64,
    /// Geoid separation in meters
    pub mean_sea_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Decoded VTG sentence
pub struct VtgData {
    /// Course over ground, radians clockwise from true north
    pub true_course: f64,
    /// Ground speed in m/s
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Decoded RMC sentence
pub struct RmcData {
    /// Seconds since UTC midnight, NaN if blank
    pub utc_time: f64,
    /// `A` status flag
    pub fix_valid: bool,
    /// Latitude magnitude in decimal degrees
    pub latitude: f64,
    /// `N` or `S`
    pub latitude_direction: String,
    /// Longitude magnitude in decimal degrees
    pub longitude: f64,
    /// `E` or `W`
    pub longitude_direction: String,
    /// Ground speed in m/s
    pub speed: f64,
    /// Course over ground, radians clockwise from true north
    pub true_course: f64,
    /// UTC date of the fix, if reported
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Decoded GST sentence, all deviations in meters
pub struct GstData {
    /// Seconds since UTC midnight, NaN if blank
    pub utc_time: f64,
    /// RMS of the pseudorange residuals
    pub ranges_std_dev: f64,
    /// Semi-major axis of the error ellipse
    pub semi_major_ellipse_std_dev: f64,
    /// Semi-minor axis of the error ellipse
    pub semi_minor_ellipse_std_dev: f64,
    /// Orientation of the semi-major axis, degrees from true north
    pub semi_major_orientation: f64,
    /// Latitude error
    pub lat_std_dev: f64,
    /// Longitude error
    pub lon_std_dev: f64,
    /// Altitude error
    pub alt_std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Decoded HDT sentence
pub struct HdtData {
    /// True heading in degrees, NaN if absent
    pub heading: f64,
}

/// Comma-separated fields of one sentence, `$<talker><type>` at index 0
pub(crate) struct Fields<'a>(pub(crate) Vec<&'a str>);

impl<'a> Fields<'a> {
    fn get(&self, index: usize, name: &'static str) -> Result<&'a str, NavError> {
        self.0.get(index).copied().ok_or(NavError::FieldDecode {
            field: name,
            value: format!("<missing field #{index}>"),
        })
    }
}

fn field_error(name: &'static str, inp: &str) -> NavError {
    NavError::FieldDecode {
        field: name,
        value: inp.to_string(),
    }
}

/// Plain float; a blank field is NaN
pub fn decode_float(name: &'static str, inp: &str) -> Result<f64, NavError> {
    let inp = inp.trim();
    if inp.is_empty() {
        return Ok(f64::NAN);
    }
    inp.parse().map_err(|_| field_error(name, inp))
}

/// Plain integer; a blank field is zero
pub fn decode_int(name: &'static str, inp: &str) -> Result<i32, NavError> {
    let inp = inp.trim();
    if inp.is_empty() {
        return Ok(0);
    }
    inp.parse().map_err(|_| field_error(name, inp))
}

fn decode_degrees_minutes(name: &'static str, inp: &str, deg_len: usize) -> Result<f64, NavError> {
    let inp = inp.trim();
    if inp.len() <= deg_len || !inp.is_char_boundary(deg_len) {
        return Err(field_error(name, inp));
    }
    let deg = inp[..deg_len]
        .parse::<f64>()
        .map_err(|_| field_error(name, inp))?;
    let min = inp[deg_len..]
        .parse::<f64>()
        .map_err(|_| field_error(name, inp))?;
    Ok(deg + min / 60.0)
}

/// `ddmm.mmmm` to decimal degrees
pub fn decode_latitude(name: &'static str, inp: &str) -> Result<f64, NavError> {
    decode_degrees_minutes(name, inp, 2)
}

/// `dddmm.mmmm` to decimal degrees
pub fn decode_longitude(name: &'static str, inp: &str) -> Result<f64, NavError> {
    decode_degrees_minutes(name, inp, 3)
}

/// `hhmmss[.sss]` to seconds since midnight; a blank field is NaN
pub fn decode_time(name: &'static str, inp: &str) -> Result<f64, NavError> {
    let inp = inp.trim();
    if inp.is_empty() {
        return Ok(f64::NAN);
    }
    if inp.len() < 6 || !inp.as_bytes()[..6].iter().all(|b| b.is_ascii_digit()) {
        return Err(field_error(name, inp));
    }
    let hours: f64 = inp[0..2].parse().map_err(|_| field_error(name, inp))?;
    let minutes: f64 = inp[2..4].parse().map_err(|_| field_error(name, inp))?;
    let seconds: f64 = inp[4..].parse().map_err(|_| field_error(name, inp))?;
    if hours >= 24.0 || minutes >= 60.0 || seconds >= 61.0 {
        return Err(field_error(name, inp));
    }
    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// `ddmmyy` to a calendar date; a blank field is `None`
pub fn decode_date(name: &'static str, inp: &str) -> Result<Option<NaiveDate>, NavError> {
    let inp = inp.trim();
    if inp.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(inp, "%d%m%y")
        .map(Some)
        .map_err(|_| field_error(name, inp))
}

/// `A` means valid, anything else does not
pub fn decode_status_flag(inp: &str) -> bool {
    inp.trim() == "A"
}

/// Knots to m/s
pub fn decode_knots(name: &'static str, inp: &str) -> Result<f64, NavError> {
    Ok(decode_float(name, inp)? * KNOTS_TO_MPS)
}

/// Degrees to radians
pub fn decode_degrees(name: &'static str, inp: &str) -> Result<f64, NavError> {
    Ok(decode_float(name, inp)?.to_radians())
}

fn decode_text(inp: &str) -> String {
    inp.trim().to_string()
}

pub(crate) fn decode_gga(f: &Fields) -> Result<GgaData, NavError> {
    Ok(GgaData {
        utc_time: decode_time("utc_time", f.get(1, "utc_time")?)?,
        latitude: decode_latitude("latitude", f.get(2, "latitude")?)?,
        latitude_direction: decode_text(f.get(3, "latitude_direction")?),
        longitude: decode_longitude("longitude", f.get(4, "longitude")?)?,
        longitude_direction: decode_text(f.get(5, "longitude_direction")?),
        fix_type: decode_int("fix_type", f.get(6, "fix_type")?)?,
        num_satellites: decode_int("num_satellites", f.get(7, "num_satellites")?)?.max(0) as u32,
        hdop: decode_float("hdop", f.get(8, "hdop")?)?,
        altitude: decode_float("altitude", f.get(9, "altitude")?)?,
        mean_sea_level: decode_float("mean_sea_level", f.get(11, "mean_sea_level")?)?,
    })
}

pub(crate) fn decode_vtg(f: &Fields) -> Result<VtgData, NavError> {
    Ok(VtgData {
        true_course: decode_degrees("true_course", f.get(1, "true_course")?)?,
        speed: decode_knots("speed", f.get(5, "speed")?)?,
    })
}

pub(crate) fn decode_rmc(f: &Fields) -> Result<RmcData, NavError> {
    Ok(RmcData {
        utc_time: decode_time("utc_time", f.get(1, "utc_time")?)?,
        fix_valid: decode_status_flag(f.get(2, "fix_valid")?),
        latitude: decode_latitude("latitude", f.get(3, "latitude")?)?,
        latitude_direction: decode_text(f.get(4, "latitude_direction")?),
        longitude: decode_longitude("longitude", f.get(5, "longitude")?)?,
        longitude_direction: decode_text(f.get(6, "longitude_direction")?),
        speed: decode_knots("speed", f.get(7, "speed")?)?,
        true_course: decode_degrees("true_course", f.get(8, "true_course")?)?,
        date: match f.0.get(9) {
            Some(date) => decode_date("date", date)?,
            None => None,
        },
    })
}

pub(crate) fn decode_gst(f: &Fields) -> Result<GstData, NavError> {
    Ok(GstData {
        utc_time: decode_time("utc_time", f.get(1, "utc_time")?)?,
        ranges_std_dev: decode_float("ranges_std_dev", f.get(2, "ranges_std_dev")?)?,
        semi_major_ellipse_std_dev: decode_float(
            "semi_major_ellipse_std_dev",
            f.get(3, "semi_major_ellipse_std_dev")?,
        )?,
        semi_minor_ellipse_std_dev: decode_float(
            "semi_minor_ellipse_std_dev",
            f.get(4, "semi_minor_ellipse_std_dev")?,
        )?,
        semi_major_orientation: decode_float(
            "semi_major_orientation",
            f.get(5, "semi_major_orientation")?,
        )?,
        lat_std_dev: decode_float("lat_std_dev", f.get(6, "lat_std_dev")?)?,
        lon_std_dev: decode_float("lon_std_dev", f.get(7, "lon_std_dev")?)?,
        alt_std_dev: decode_float("alt_std_dev", f.get(8, "alt_std_dev")?)?,
    })
}

pub(crate) fn decode_hdt(f: &Fields) -> Result<HdtData, NavError> {
    Ok(HdtData {
        heading: decode_float("heading", f.get(1, "heading")?)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn degrees_minutes() {
        let lat = decode_latitude("latitude", "4807.038").unwrap();
        assert!((lat - 48.1173).abs() < 1e-9);
        let lon = decode_longitude("longitude", "01131.000").unwrap();
        assert!((lon - 11.516666666666667).abs() < 1e-9);
        assert!(decode_latitude("latitude", "").is_err());
        assert!(decode_longitude("longitude", "01x31.000").is_err());
    }

    #[test]
    fn utc_time() {
        assert_eq!(decode_time("utc_time", "123519").unwrap(), 45319.0);
        let t = decode_time("utc_time", "000001.25").unwrap();
        assert!((t - 1.25).abs() < 1e-12);
        assert!(decode_time("utc_time", "").unwrap().is_nan());
        assert!(decode_time("utc_time", "12:35").is_err());
        assert!(decode_time("utc_time", "256000").is_err());
    }

    #[test]
    fn numbers() {
        assert!(decode_float("hdop", "").unwrap().is_nan());
        assert_eq!(decode_float("hdop", "0.9").unwrap(), 0.9);
        assert_eq!(
            decode_float("hdop", "abc"),
            Err(NavError::FieldDecode {
                field: "hdop",
                value: "abc".into()
            })
        );
        assert_eq!(decode_int("fix_type", "").unwrap(), 0);
        assert_eq!(decode_int("fix_type", "4").unwrap(), 4);
        let speed = decode_knots("speed", "10").unwrap();
        assert!((speed - 5.14444444444).abs() < 1e-9);
        let course = decode_degrees("true_course", "180").unwrap();
        assert!((course - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn flags_and_dates() {
        assert!(decode_status_flag("A"));
        assert!(!decode_status_flag("V"));
        assert!(!decode_status_flag(""));
        assert_eq!(
            decode_date("date", "230394").unwrap(),
            NaiveDate::from_ymd_opt(1994, 3, 23)
        );
        assert_eq!(decode_date("date", "").unwrap(), None);
        assert!(decode_date("date", "320394").is_err());
    }

    #[test]
    fn missing_field() {
        let f = Fields(vec!["$GPHDT"]);
        assert!(matches!(
            decode_hdt(&f),
            Err(NavError::FieldDecode { field: "heading", .. })
        ));
    }
}
