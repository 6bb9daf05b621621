use serde::{Deserialize, Serialize};

use crate::quality::EpeConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Configuration of the sentence pipeline
pub struct DriverConfig {
    /// Frame the fixes refer to
    pub frame_id: String,
    /// Optional prefix, prepended to the frame as `<prefix>/<frame_id>`
    pub tf_prefix: String,
    /// Label of the time references; the frame ID is used if unset
    pub time_ref_source: Option<String>,
    /// Take fixes from RMC instead of GGA/VTG
    pub use_rmc: bool,
    /// Default position errors per quality code
    pub epe: EpeConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_id: "gps".into(),
            tf_prefix: String::new(),
            time_ref_source: Some("gps".into()),
            use_rmc: false,
            epe: EpeConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Frame ID with the prefix applied
    pub fn frame_id(&self) -> String {
        if self.tf_prefix.is_empty() {
            self.frame_id.clone()
        } else {
            format!("{}/{}", self.tf_prefix, self.frame_id)
        }
    }
}
