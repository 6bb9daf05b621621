use std::io::{ErrorKind, Read};
use std::time::Duration;

use serialport::SerialPort;

use crate::NavError;

/// Longest line kept while waiting for a newline
const MAX_LINE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of one [`LineReader::read_line`] call
pub enum ReadOutcome {
    /// A complete line without its terminator
    Line(Vec<u8>),
    /// Nothing complete arrived before the read timeout
    Timeout,
    /// The source has no more data
    Closed,
}

/// Splits a byte stream into newline-terminated lines.
///
/// Bytes of a line interrupted by a read timeout are kept and completed by
/// later reads.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    /// Wrap a byte source
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
        }
    }

    fn take_line(&mut self, end: usize) -> Vec<u8> {
        let mut line: Vec<u8> = self.buf.drain(..end).collect();
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        line
    }

    /// Read the next line, waiting at most one read timeout of the source
    pub fn read_line(&mut self) -> Result<ReadOutcome, NavError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                return Ok(ReadOutcome::Line(self.take_line(pos + 1)));
            }
            if self.buf.len() > MAX_LINE {
                log::warn!("Discarding {} bytes without a line break", self.buf.len());
                self.buf.clear();
            }
            let mut tmp = [0; 1024];
            match self.reader.read(&mut tmp) {
                Ok(0) if self.buf.is_empty() => return Ok(ReadOutcome::Closed),
                Ok(0) => {
                    let end = self.buf.len();
                    return Ok(ReadOutcome::Line(self.take_line(end)));
                }
                Ok(n) => self.buf.extend_from_slice(&tmp[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(ReadOutcome::Timeout)
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Open a serial device with a bounded read timeout
pub fn open_serial(
    port: &str,
    baud: u32,
    timeout: Duration,
) -> Result<LineReader<Box<dyn SerialPort>>, NavError> {
    let port = serialport::new(port, baud).timeout(timeout).open()?;
    log::info!(
        "Opened {} at {} baud",
        port.name().unwrap_or_default(),
        baud
    );
    Ok(LineReader::new(port))
}
