//! `TelemetryOutput<W>`: bridges `Telemetry` to an `OutputWriter`.

use log::warn;

use vb_behavior::{NodeInfo, Telemetry, TelemetryKind, TransitCollector};
use vb_core::{NodeId, SimTime};
use vb_message::MessageType;

use crate::row::{EventRow, TransitRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`Telemetry`] sink that writes every event as a row and every
/// completed transit to any [`OutputWriter`].
///
/// Transits are assembled by an inner [`TransitCollector`] and written as
/// soon as they complete.  Telemetry callbacks have no return value, so the
/// first write error is kept; check it with [`take_error`][Self::take_error]
/// or get it from [`finish`][Self::finish].
pub struct TelemetryOutput<W: OutputWriter> {
    writer:     W,
    collector:  TransitCollector,
    transits:   usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> TelemetryOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            collector:  TransitCollector::new(),
            transits:   0,
            last_error: None,
        }
    }

    /// Number of transits written so far.
    pub fn transits_written(&self) -> usize {
        self.transits
    }

    /// Histories still waiting for a final message.
    pub fn open_transits(&self) -> usize {
        self.collector.open_count()
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Returns the first error seen during the run, or
    /// the flush error.
    pub fn finish(&mut self) -> OutputResult<()> {
        if self.collector.open_count() > 0 {
            warn!("output: {} transits still open at finish", self.collector.open_count());
        }
        let result = self.writer.finish();
        match self.last_error.take() {
            Some(e) => Err(e),
            None => result,
        }
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn event(&mut self, row: EventRow) {
        let result = self.writer.write_events(&[row]);
        self.store_err(result);
    }

    fn flush_transits(&mut self) {
        let done = self.collector.drain_completed();
        if done.is_empty() {
            return;
        }
        let rows: Vec<TransitRow> = done.iter().map(TransitRow::from).collect();
        self.transits += rows.len();
        let result = self.writer.write_transits(&rows);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> Telemetry for TelemetryOutput<W> {
    fn on_start_toggle(&mut self, node: NodeId, now: SimTime, running: bool) {
        self.event(EventRow::toggle(node, now, running));
    }

    fn on_beacon_response(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.collector.on_beacon_response(rsu, now, info);
        self.event(EventRow::observation(TelemetryKind::BeaconResponse, rsu, now, info));
    }

    fn on_timeout(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.collector.on_timeout(rsu, now, info);
        self.event(EventRow::observation(TelemetryKind::Timeout, rsu, now, info));
    }

    fn on_last_message(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.collector.on_last_message(rsu, now, info);
        self.event(EventRow::observation(TelemetryKind::LastMessage, rsu, now, info));
        self.flush_transits();
    }

    fn on_no_longer_conformant(&mut self, rsu: NodeId, now: SimTime, info: &NodeInfo) {
        self.collector.on_no_longer_conformant(rsu, now, info);
        self.event(EventRow::observation(TelemetryKind::NoLongerConformant, rsu, now, info));
        self.flush_transits();
    }

    fn on_response_sent(&mut self, vehicle: NodeId, now: SimTime, to: NodeId, kind: MessageType, info: &NodeInfo) {
        self.event(EventRow::sent(vehicle, now, to, kind, info));
    }
}
