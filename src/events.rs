use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::quality::{CovarianceType, FixStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Stamp and frame attached to every event
pub struct Header {
    /// Time at which the sentence was received
    pub stamp: DateTime<Utc>,
    /// Frame the data refers to
    pub frame_id: String,
}

#[derive(Debug, Copy, PartialEq, Eq, Clone, Serialize)]
/// Satellite system providing the fix
pub enum Service {
    /// GPS
    Gps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A position fix
pub struct FixEvent {
    /// Stamp and frame
    pub header: Header,
    /// Decimal degrees, positive north
    pub latitude: f64,
    /// Decimal degrees, positive east
    pub longitude: f64,
    /// Meters, NaN if unknown
    pub altitude: f64,
    /// Fix classification
    pub status: FixStatus,
    /// Satellite system
    pub service: Service,
    /// Row-major 3x3 covariance in ENU, m²
    pub position_covariance: [f64; 9],
    /// How the covariance was obtained
    pub position_covariance_type: CovarianceType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Ground velocity, x east and y north, m/s
pub struct VelocityEvent {
    /// Stamp and frame
    pub header: Header,
    /// East component
    pub vx: f64,
    /// North component
    pub vy: f64,
}

#[derive(Debug, Copy, PartialEq, Clone, Default, Serialize)]
/// Unit quaternion
pub struct Quaternion {
    /// x
    pub x: f64,
    /// y
    pub y: f64,
    /// z
    pub z: f64,
    /// w
    pub w: f64,
}

impl Quaternion {
    /// Rotation from static-axis roll, pitch and yaw in radians
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll / 2.0).sin_cos();
        let (sp, cp) = (pitch / 2.0).sin_cos();
        let (sy, cy) = (yaw / 2.0).sin_cos();
        Self {
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
            w: cr * cp * cy + sr * sp * sy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Heading as a yaw-only rotation
pub struct HeadingEvent {
    /// Stamp and frame
    pub header: Header,
    /// Orientation
    pub quaternion: Quaternion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Receiver time reference
pub struct TimeRefEvent {
    /// Stamp and frame
    pub header: Header,
    /// UTC time reported by the receiver, seconds since the Unix epoch
    pub time_ref: f64,
    /// Label of the time source
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
/// Anything the fix engine emits
pub enum NavEvent {
    /// Position fix
    Fix(FixEvent),
    /// Velocity
    Velocity(VelocityEvent),
    /// Heading
    Heading(HeadingEvent),
    /// Time reference
    TimeRef(TimeRefEvent),
}

impl NavEvent {
    /// Header of the wrapped event
    pub fn header(&self) -> &Header {
        match self {
            NavEvent::Fix(e) => &e.header,
            NavEvent::Velocity(e) => &e.header,
            NavEvent::Heading(e) => &e.header,
            NavEvent::TimeRef(e) => &e.header,
        }
    }
}
