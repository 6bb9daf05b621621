use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
/// Fix classification, ordered from worst to best
pub enum FixStatus {
    /// No usable position
    NoFix = -1,
    /// Unaugmented fix
    Fix = 0,
    /// Fix with satellite-based augmentation
    SbasFix = 1,
    /// Fix with ground-based augmentation
    GbasFix = 2,
}

impl FixStatus {
    /// Whether the receiver reports a usable position
    pub fn is_fix(&self) -> bool {
        *self > FixStatus::NoFix
    }
}

#[derive(Debug, Copy, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
/// How the position covariance of a fix was obtained
pub enum CovarianceType {
    /// Nothing is known about the covariance
    Unknown,
    /// Derived from dilution of precision and error estimates
    Approximated,
}

#[derive(Debug, Copy, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Default estimated position error (meters) per GGA quality code
pub struct EpeConfig {
    /// Invalid / unknown quality
    pub quality0: f64,
    /// SPS
    pub quality1: f64,
    /// DGPS
    pub quality2: f64,
    /// RTK fixed
    pub quality4: f64,
    /// RTK float
    pub quality5: f64,
    /// WAAS
    pub quality9: f64,
}

impl Default for EpeConfig {
    fn default() -> Self {
        Self {
            quality0: 1_000_000.0,
            quality1: 4.0,
            quality2: 0.1,
            quality4: 0.02,
            quality5: 4.0,
            quality9: 3.0,
        }
    }
}

#[derive(Debug, Copy, PartialEq, Clone)]
/// What a quality code means for a fix
pub struct QualityEntry {
    /// Position error used when the receiver provides none
    pub default_epe: f64,
    /// Fix classification
    pub status: FixStatus,
    /// Covariance classification
    pub covariance_type: CovarianceType,
}

/// Quality codes with a dedicated entry, in table order
const CODES: [i32; 7] = [-1, 0, 1, 2, 4, 5, 9];

#[derive(Debug, Clone)]
/// Lookup from GGA quality code to [`QualityEntry`]
pub struct QualityTable {
    entries: [QualityEntry; 7],
}

impl QualityTable {
    /// Build the table from the configured error estimates
    pub fn new(epe: &EpeConfig) -> Self {
        use CovarianceType::*;
        use FixStatus::*;
        let entry = |default_epe, status, covariance_type| QualityEntry {
            default_epe,
            status,
            covariance_type,
        };
        Self {
            entries: [
                entry(epe.quality0, NoFix, Unknown),
                entry(epe.quality0, NoFix, Unknown),
                entry(epe.quality1, Fix, Approximated),
                entry(epe.quality2, SbasFix, Approximated),
                entry(epe.quality4, GbasFix, Approximated),
                entry(epe.quality5, GbasFix, Approximated),
                entry(epe.quality9, GbasFix, Approximated),
            ],
        }
    }

    /// Entry for `code`, or the entry of code `-1` if the code is unknown
    pub fn lookup(&self, code: i32) -> QualityEntry {
        let idx = CODES.iter().position(|&c| c == code).unwrap_or(0);
        self.entries[idx]
    }
}

impl Default for QualityTable {
    fn default() -> Self {
        Self::new(&EpeConfig::default())
    }
}
