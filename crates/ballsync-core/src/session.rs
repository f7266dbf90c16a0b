//! One ingest-decode-parse-apply cycle per poll.
//!
//! A session owns the frame decoder for the lifetime of one connection and
//! is driven by an external scheduler; it assumes nothing about tick rate.
//! Errors are contained at the smallest unit: a corrupt length prefix costs
//! four bytes, a non-UTF-8 payload costs its frame, a malformed record costs
//! its line. Only I/O failures on the source surface as `SessionError`.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::CoordinateMapper;
use crate::protocols::framing::FrameDecoder;
use crate::protocols::records::{BallUpdate, Record, parse_payload};
use crate::sink::PositionSink;
use crate::source::{ByteSource, SourceError};

/// Size of a single read from the source.
pub const READ_CHUNK_LEN: usize = 1024;
/// Upper bound on reads per poll so a fast sender cannot starve the caller.
pub const MAX_READS_PER_POLL: usize = 256;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// What happened during one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The source is closed; polling should stop.
    Disconnected,
    /// Nothing to read this cycle.
    Idle,
    Processed(CycleSummary),
}

/// Counters for a single cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub bytes: u64,
    pub frames: u64,
    pub resyncs: u64,
    pub invalid_payloads: u64,
    pub invalid_records: u64,
    pub ignored_updates: u64,
    pub applied_updates: u64,
}

/// Totals across all cycles of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub polls: u64,
    pub bytes: u64,
    pub frames: u64,
    pub resyncs: u64,
    pub invalid_payloads: u64,
    pub invalid_records: u64,
    pub ignored_updates: u64,
    pub applied_updates: u64,
}

impl SessionStats {
    fn absorb(&mut self, cycle: &CycleSummary) {
        self.bytes += cycle.bytes;
        self.frames += cycle.frames;
        self.resyncs += cycle.resyncs;
        self.invalid_payloads += cycle.invalid_payloads;
        self.invalid_records += cycle.invalid_records;
        self.ignored_updates += cycle.ignored_updates;
        self.applied_updates += cycle.applied_updates;
    }
}

pub struct Session {
    decoder: FrameDecoder,
    mapper: CoordinateMapper,
    stats: SessionStats,
}

impl Session {
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self {
            decoder: FrameDecoder::new(),
            mapper,
            stats: SessionStats::default(),
        }
    }

    /// Run one cycle: read whatever the source has, decode it and apply the
    /// resulting updates to `sink`.
    pub fn poll<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<PollOutcome, SessionError>
    where
        S: ByteSource + ?Sized,
        K: PositionSink + ?Sized,
    {
        self.stats.polls += 1;
        if !source.is_connected() {
            return Ok(PollOutcome::Disconnected);
        }

        let mut summary = CycleSummary::default();
        let mut reads = 0;
        let drained = self.drain_source(source, sink, &mut summary, &mut reads);
        // Stats cover every update applied to the sink, including on source errors.
        self.stats.absorb(&summary);
        drained?;

        if reads == 0 {
            if source.is_connected() {
                return Ok(PollOutcome::Idle);
            }
            return Ok(PollOutcome::Disconnected);
        }
        Ok(PollOutcome::Processed(summary))
    }

    fn drain_source<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        summary: &mut CycleSummary,
        reads: &mut usize,
    ) -> Result<(), SessionError>
    where
        S: ByteSource + ?Sized,
        K: PositionSink + ?Sized,
    {
        let mut chunk = [0u8; READ_CHUNK_LEN];
        while *reads < MAX_READS_PER_POLL && source.available()? {
            let n = source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            *reads += 1;
            self.decode_into(&chunk[..n], sink, summary);
        }
        Ok(())
    }

    /// Feed bytes that were obtained elsewhere through the same pipeline.
    ///
    /// # Examples
    /// ```
    /// use ballsync_core::protocols::framing::encode_frame;
    /// use ballsync_core::{CoordinateMapper, Session, TargetTable};
    ///
    /// let mut session = Session::new(CoordinateMapper::new(1280.0, 720.0, 10.0, 5.0));
    /// let mut table = TargetTable::with_len(2);
    /// let wire = encode_frame(b"Ball1, id:1, X:640, Y:360, color:red\n").unwrap();
    /// let summary = session.process_bytes(&wire, &mut table);
    /// assert_eq!(summary.applied_updates, 1);
    /// ```
    pub fn process_bytes<K>(&mut self, bytes: &[u8], sink: &mut K) -> CycleSummary
    where
        K: PositionSink + ?Sized,
    {
        let mut summary = CycleSummary::default();
        self.decode_into(bytes, sink, &mut summary);
        self.stats.absorb(&summary);
        summary
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending_bytes(&self) -> usize {
        self.decoder.buffered()
    }

    fn decode_into<K>(&mut self, bytes: &[u8], sink: &mut K, summary: &mut CycleSummary)
    where
        K: PositionSink + ?Sized,
    {
        summary.bytes += bytes.len() as u64;
        let resyncs_before = self.decoder.stats().resyncs;
        let mapper = &self.mapper;
        for frame in self.decoder.ingest(bytes) {
            summary.frames += 1;
            apply_frame(mapper, &frame, sink, summary);
        }
        summary.resyncs += self.decoder.stats().resyncs - resyncs_before;
    }
}

fn apply_frame<K>(mapper: &CoordinateMapper, payload: &[u8], sink: &mut K, summary: &mut CycleSummary)
where
    K: PositionSink + ?Sized,
{
    let records = match parse_payload(payload) {
        Ok(records) => records,
        Err(err) => {
            warn!("skipping frame of {} bytes: {err}", payload.len());
            summary.invalid_payloads += 1;
            return;
        }
    };
    trace!("frame of {} bytes", payload.len());

    for Record { line, outcome } in records {
        match outcome {
            Ok(update) => apply_update(mapper, &update, sink, summary),
            Err(err) => {
                warn!("skipping record {line:?}: {err}");
                summary.invalid_records += 1;
            }
        }
    }
}

fn apply_update<K>(
    mapper: &CoordinateMapper,
    update: &BallUpdate,
    sink: &mut K,
    summary: &mut CycleSummary,
) where
    K: PositionSink + ?Sized,
{
    let Some(id) = usize::try_from(update.id)
        .ok()
        .filter(|id| *id < sink.len() && sink.has_target(*id))
    else {
        trace!("no target for id {}", update.id);
        summary.ignored_updates += 1;
        return;
    };

    let position = mapper.map(update.pixel_x, update.pixel_y);
    sink.set_position(id, position);
    sink.set_label(id, &update.color);
    debug!(
        "target {id} <- ({}, {}) {} => ({:.3}, {:.3}, {:.3})",
        update.pixel_x, update.pixel_y, update.color, position.x, position.y, position.z
    );
    summary.applied_updates += 1;
}
