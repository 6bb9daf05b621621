use std::io::Write;

use crate::events::NavEvent;

/// Receives the events produced by the pipeline.
///
/// Publishing is fire-and-forget: a sink deals with its own failures.
pub trait EventSink {
    /// Hand over one event
    fn publish(&mut self, event: &NavEvent);
}

impl EventSink for Vec<NavEvent> {
    fn publish(&mut self, event: &NavEvent) {
        self.push(event.clone());
    }
}

/// Writes every event as one line of JSON
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn publish(&mut self, event: &NavEvent) {
        let res = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = res {
            log::warn!("Failed to write event: {e}");
        }
    }
}
