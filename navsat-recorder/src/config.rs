use std::path::{Path, PathBuf};

use argh::FromArgs;
use directories::ProjectDirs;
use nmea_navsat::DriverConfig;
use serde::{Deserialize, Serialize};

#[derive(FromArgs, Debug, Default)]
/// Record navigation events decoded from an NMEA receiver
pub struct Args {
    /// serial device
    #[argh(positional)]
    pub serial_port: Option<String>,
    /// baud rate
    #[argh(option)]
    pub baud_rate: Option<u32>,
    /// read timeout in milliseconds
    #[argh(option)]
    pub timeout: Option<u64>,
    /// configuration file (JSON5)
    #[argh(option)]
    pub config: Option<PathBuf>,
    /// replay a captured NMEA log instead of reading the device
    #[argh(option)]
    pub replay: Option<PathBuf>,
    /// save events to this directory instead of printing them
    #[argh(option)]
    pub save_dir: Option<PathBuf>,
    /// gzip finished hourly files
    #[argh(switch)]
    pub compress: bool,
    /// take fixes from RMC instead of GGA/VTG
    #[argh(switch)]
    pub use_rmc: bool,
    /// frame the fixes refer to
    #[argh(option)]
    pub frame_id: Option<String>,
    /// write the effective configuration to the default location
    #[argh(switch)]
    pub store_default: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
/// Configuration for the recorder
pub struct RecorderCfg {
    /// serial device
    pub serial_port: String,
    /// baud rate
    pub baud_rate: u32,
    /// read timeout in milliseconds
    pub timeout: u64,
    /// replay this file instead of reading the device
    pub replay: Option<PathBuf>,
    /// save events to this directory
    pub save_dir: Option<PathBuf>,
    /// gzip finished hourly files
    pub compress: bool,
    /// sentence pipeline
    pub driver: DriverConfig,
}

impl Default for RecorderCfg {
    fn default() -> Self {
        Self {
            serial_port: "/dev/serial0".into(),
            baud_rate: 9600,
            timeout: 2000,
            replay: None,
            save_dir: None,
            compress: false,
            driver: DriverConfig::default(),
        }
    }
}

impl RecorderCfg {
    /// Configuration from `--config`, else the default location, with the
    /// command line applied on top
    pub fn load(args: &Args) -> Result<Self, std::io::Error> {
        let mut cfg = match &args.config {
            Some(path) => Self::load_file(path)?,
            None => Self::load_default().unwrap_or_else(|e| {
                log::debug!("No default configuration ({e}), using built-in defaults");
                Self::default()
            }),
        };
        cfg.apply(args);
        Ok(cfg)
    }

    /// Override file values with the ones given on the command line
    pub fn apply(&mut self, args: &Args) {
        if let Some(port) = &args.serial_port {
            self.serial_port = port.clone();
        }
        if let Some(baud) = args.baud_rate {
            self.baud_rate = baud;
        }
        if let Some(timeout) = args.timeout {
            self.timeout = timeout;
        }
        if args.replay.is_some() {
            self.replay = args.replay.clone();
        }
        if args.save_dir.is_some() {
            self.save_dir = args.save_dir.clone();
        }
        self.compress |= args.compress;
        self.driver.use_rmc |= args.use_rmc;
        if let Some(frame_id) = &args.frame_id {
            self.driver.frame_id = frame_id.clone();
        }
    }

    /// Load a JSON5 configuration file
    pub fn load_file(path: &Path) -> Result<Self, std::io::Error> {
        let data = std::fs::read_to_string(path)?;
        json5::from_str(&data).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Store the configuration in the default location
    pub fn store_default(&self) -> Result<PathBuf, std::io::Error> {
        let mut path = get_default_path();
        std::fs::create_dir_all(&path)?;
        path.push("config.json");
        std::fs::write(
            &path,
            serde_json::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?,
        )?;
        Ok(path)
    }

    /// Load the configuration from the default location
    pub fn load_default() -> Result<Self, std::io::Error> {
        let mut path = get_default_path();
        path.push("config.json");
        Self::load_file(&path)
    }
}

fn get_default_path() -> PathBuf {
    if let Some(path) = ProjectDirs::from("", "", "navsat_recorder") {
        path.config_dir().to_path_buf()
    } else {
        PathBuf::from(".")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json5_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");
        std::fs::write(
            &path,
            r#"{
                // receiver on the first USB port
                serial_port: "/dev/ttyUSB0",
                baud_rate: 115200,
                driver: { use_rmc: true, tf_prefix: "rover", epe: { quality4: 0.01 } },
            }"#,
        )
        .unwrap();
        let cfg = RecorderCfg::load_file(&path).unwrap();
        assert_eq!(cfg.serial_port, "/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115200);
        assert_eq!(cfg.timeout, 2000);
        assert!(cfg.driver.use_rmc);
        assert_eq!(cfg.driver.frame_id(), "rover/gps");
        assert_eq!(cfg.driver.epe.quality4, 0.01);
        assert_eq!(cfg.driver.epe.quality1, 4.0);
    }

    #[test]
    fn command_line_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json5");
        std::fs::write(&path, r#"{ serial_port: "/dev/ttyUSB0", baud_rate: 115200 }"#).unwrap();
        let args = Args {
            serial_port: Some("/dev/ttyACM0".into()),
            config: Some(path),
            use_rmc: true,
            frame_id: Some("antenna".into()),
            ..Default::default()
        };
        let cfg = RecorderCfg::load(&args).unwrap();
        assert_eq!(cfg.serial_port, "/dev/ttyACM0");
        assert_eq!(cfg.baud_rate, 115200);
        assert!(cfg.driver.use_rmc);
        assert_eq!(cfg.driver.frame_id, "antenna");
    }

    #[test]
    fn missing_file_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/navsat.json5")),
            ..Default::default()
        };
        assert!(RecorderCfg::load(&args).is_err());
    }
}
