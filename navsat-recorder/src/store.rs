use std::{
    fs::{remove_file, File, OpenOptions},
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use chrono::{DateTime, Utc};
use flate2::{write::GzEncoder, Compression};
use nmea_navsat::{EventSink, NavEvent};

/// Hourly JSON-lines files under `<root>/<YYYYMMDD>/`
#[derive(Debug)]
pub struct EventStore {
    root_dir: PathBuf,
    current_dir: PathBuf,
    current_file: Option<PathBuf>,
    last_date: Option<String>,
    last_hour: Option<String>,
    writer: Option<File>,
    compress_tx: Option<mpsc::Sender<Option<PathBuf>>>,
    compress_hdl: Option<thread::JoinHandle<()>>,
}

impl Drop for EventStore {
    fn drop(&mut self) {
        if let Some(tx) = &self.compress_tx {
            if let Some(hdl) = self.compress_hdl.take() {
                let _ = tx.send(None);
                let _ = hdl.join();
            }
        }
    }
}

fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let mut outfile = path.as_os_str().to_owned();
    outfile.push(".gz");
    let outfile = PathBuf::from(outfile);
    let mut input = BufReader::new(File::open(path)?);
    let mut gz = GzEncoder::new(File::create(&outfile)?, Compression::default());
    io::copy(&mut input, &mut gz)?;
    gz.finish()?.flush()?;
    remove_file(path)?;
    Ok(outfile)
}

impl EventStore {
    /// Create the store; with `compress`, every finished hourly file is
    /// gzipped on a background thread
    pub fn new(root_dir: PathBuf, compress: bool) -> Result<Self, io::Error> {
        std::fs::create_dir_all(&root_dir)?;
        let (compress_tx, compress_hdl) = if compress {
            let (tx, rx) = mpsc::channel::<Option<PathBuf>>();
            let hdl = thread::spawn(move || {
                log::info!("Compression thread started");
                while let Ok(Some(path)) = rx.recv() {
                    match compress_file(&path) {
                        Ok(out) => log::info!("Compressed {path:?} to {out:?}"),
                        Err(e) => log::warn!("Compression error {e:?}: {path:?}"),
                    }
                }
                log::info!("Compression thread exiting");
            });
            (Some(tx), Some(hdl))
        } else {
            (None, None)
        };
        Ok(Self {
            root_dir,
            current_dir: PathBuf::new(),
            current_file: None,
            last_date: None,
            last_hour: None,
            writer: None,
            compress_tx,
            compress_hdl,
        })
    }

    /// Append one line to the file for the hour of `tstamp`
    pub fn store(&mut self, tstamp: DateTime<Utc>, data: &[u8]) -> Result<(), io::Error> {
        let date = tstamp.format("%Y%m%d").to_string();
        let hour = tstamp.format("%H").to_string();
        if self.last_date.as_deref() != Some(&date) {
            self.current_dir = self.root_dir.join(&date);
            std::fs::create_dir_all(&self.current_dir)?;
            self.last_date = Some(date.clone());
            self.last_hour = None;
        }
        if self.last_hour.as_deref() != Some(&hour) {
            let filename = self.current_dir.join(format!("{}{}0000.json", &date, &hour));
            let writer = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&filename)?;
            // close the previous file before handing it over
            self.writer = Some(writer);
            if let Some(finished) = self.current_file.replace(filename) {
                if let Some(tx) = &self.compress_tx {
                    let _ = tx.send(Some(finished));
                }
            }
            self.last_hour = Some(hour);
        }
        match &mut self.writer {
            Some(writer) => {
                writer.write_all(data)?;
                writer.write_all(b"\n")?;
                writer.flush()
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "No file writer")),
        }
    }
}

impl EventSink for EventStore {
    fn publish(&mut self, event: &NavEvent) {
        let res = serde_json::to_vec(event)
            .map_err(io::Error::from)
            .and_then(|data| self.store(event.header().stamp, &data));
        if let Err(e) = res {
            log::warn!("Failed to store event: {e}");
        }
    }
}
