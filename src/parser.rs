use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::grammar::{
    decode_gga, decode_gst, decode_hdt, decode_rmc, decode_vtg, Fields, GgaData, GstData, HdtData,
    RmcData, SentenceType, VtgData,
};
use crate::NavError;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A decoded sentence, one variant per supported type
pub enum ParsedSentence {
    /// Fix data
    Gga(GgaData),
    /// Track and ground speed
    Vtg(VtgData),
    /// Recommended minimum navigation data
    Rmc(RmcData),
    /// Pseudorange error statistics
    Gst(GstData),
    /// True heading
    Hdt(HdtData),
}

impl ParsedSentence {
    /// Type tag of the sentence
    pub fn kind(&self) -> SentenceType {
        match self {
            Self::Gga(_) => SentenceType::Gga,
            Self::Vtg(_) => SentenceType::Vtg,
            Self::Rmc(_) => SentenceType::Rmc,
            Self::Gst(_) => SentenceType::Gst,
            Self::Hdt(_) => SentenceType::Hdt,
        }
    }
}

/// Parse a sentence whose checksum has already been verified.
///
/// Fails with [`NavError::MalformedSentence`] if the line is not shaped like
/// `$<talker><type>,...*hh`, with [`NavError::UnsupportedSentenceType`] for
/// types outside [`SentenceType`], and with [`NavError::FieldDecode`] if a
/// field does not convert.
pub fn parse_sentence(sentence: &str) -> Result<ParsedSentence, NavError> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^\$(GP|GN|GL|IN)\w+(,[^,*]*)*\*[0-9A-Fa-f]{2}$")
            .expect("Failed to compile regex");
    }
    if !RE.is_match(sentence) {
        return Err(NavError::MalformedSentence(sentence.to_string()));
    }
    // the checksum is not part of the last field
    let body = match sentence.rfind('*') {
        Some(pos) => &sentence[..pos],
        None => sentence,
    };
    let fields = Fields(
        body.split(',')
            .map(|field| field.trim_end_matches(','))
            .collect(),
    );
    // skip the '$' and the talker ID
    let kind = fields.0[0].get(3..).unwrap_or_default();
    let kind = SentenceType::from_type(kind)
        .ok_or_else(|| NavError::UnsupportedSentenceType(kind.to_string()))?;
    Ok(match kind {
        SentenceType::Gga => ParsedSentence::Gga(decode_gga(&fields)?),
        SentenceType::Vtg => ParsedSentence::Vtg(decode_vtg(&fields)?),
        SentenceType::Rmc => ParsedSentence::Rmc(decode_rmc(&fields)?),
        SentenceType::Gst => ParsedSentence::Gst(decode_gst(&fields)?),
        SentenceType::Hdt => ParsedSentence::Hdt(decode_hdt(&fields)?),
    })
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::checksum::nmea_checksum;

    /// Wrap a payload into a full sentence with a correct checksum
    pub(crate) fn sentence(payload: &str) -> String {
        format!("${payload}*{:02X}", nmea_checksum(payload))
    }

    #[test]
    fn parse_gga() {
        let msg = parse_sentence(
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47",
        )
        .unwrap();
        let ParsedSentence::Gga(gga) = msg else {
            panic!("expected GGA, got {msg:?}");
        };
        assert_eq!(gga.utc_time, 45319.0);
        assert!((gga.latitude - 48.1173).abs() < 1e-9);
        assert_eq!(gga.latitude_direction, "N");
        assert!((gga.longitude - 11.516666666666667).abs() < 1e-9);
        assert_eq!(gga.longitude_direction, "E");
        assert_eq!(gga.fix_type, 1);
        assert_eq!(gga.num_satellites, 8);
        assert_eq!(gga.hdop, 0.9);
        assert_eq!(gga.altitude, 545.4);
        assert_eq!(gga.mean_sea_level, 46.9);
    }

    #[test]
    fn fields_survive_a_trip_through_the_wire() {
        let line = sentence("GNGST,172814.0,0.006,0.023,0.020,273.6,0.023,0.020,0.031");
        let msg = parse_sentence(&line).unwrap();
        assert_eq!(msg.kind(), SentenceType::Gst);
        let ParsedSentence::Gst(gst) = msg else {
            unreachable!()
        };
        assert_eq!(gst.utc_time, 17.0 * 3600.0 + 28.0 * 60.0 + 14.0);
        assert_eq!(gst.ranges_std_dev, 0.006);
        assert_eq!(gst.semi_major_ellipse_std_dev, 0.023);
        assert_eq!(gst.semi_minor_ellipse_std_dev, 0.020);
        assert_eq!(gst.semi_major_orientation, 273.6);
        assert_eq!(gst.lat_std_dev, 0.023);
        assert_eq!(gst.lon_std_dev, 0.020);
        // last field, right before the checksum
        assert_eq!(gst.alt_std_dev, 0.031);
    }

    #[test]
    fn parse_rmc_and_vtg() {
        let msg = parse_sentence(
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A",
        )
        .unwrap();
        let ParsedSentence::Rmc(rmc) = msg else {
            panic!("expected RMC, got {msg:?}");
        };
        assert!(rmc.fix_valid);
        assert!((rmc.speed - 22.4 * 0.514444444444).abs() < 1e-9);
        assert!((rmc.true_course - 84.4f64.to_radians()).abs() < 1e-12);
        assert_eq!(rmc.date, chrono::NaiveDate::from_ymd_opt(1994, 3, 23));

        let msg = parse_sentence("$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*48").unwrap();
        let ParsedSentence::Vtg(vtg) = msg else {
            panic!("expected VTG, got {msg:?}");
        };
        assert!((vtg.true_course - 54.7f64.to_radians()).abs() < 1e-12);
        assert!((vtg.speed - 5.5 * 0.514444444444).abs() < 1e-9);
    }

    #[test]
    fn parse_hdt() {
        let msg = parse_sentence(&sentence("GPHDT,045.0,T")).unwrap();
        assert_eq!(msg, ParsedSentence::Hdt(HdtData { heading: 45.0 }));
        let msg = parse_sentence(&sentence("GPHDT,,T")).unwrap();
        let ParsedSentence::Hdt(hdt) = msg else {
            unreachable!()
        };
        assert!(hdt.heading.is_nan());
    }

    #[test]
    fn structural_failures() {
        for line in [
            "$GPHDT,045.0,T",
            "GPHDT,045.0,T*34",
            "$XXHDT,045.0,T*34",
            "$GPHDT,045.0,T*3",
            "$GPHDT,045.0,T*34 trailing",
        ] {
            assert!(
                matches!(parse_sentence(line), Err(NavError::MalformedSentence(_))),
                "{line}"
            );
        }
    }

    #[test]
    fn unsupported_type() {
        let line = sentence("GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1");
        assert_eq!(
            parse_sentence(&line),
            Err(NavError::UnsupportedSentenceType("GSA".into()))
        );
    }

    #[test]
    fn bad_field() {
        let line = sentence("GPGGA,123519,48x7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
        assert!(matches!(
            parse_sentence(&line),
            Err(NavError::FieldDecode {
                field: "latitude",
                ..
            })
        ));
        let line = sentence("GPGGA,123519");
        assert!(matches!(
            parse_sentence(&line),
            Err(NavError::FieldDecode { .. })
        ));
    }
}
