//! Device frame encoding and the transport seam.
//!
//! The wire contract with the hardware is one fixed binary frame per
//! resolved grid: `[0xAB, dim, (R,G,B) * dim^2, 0xBA]`. The encoder is pure;
//! connection lifecycle lives behind [`FrameSink`], and [`FrameStreamer`]
//! enforces the send throttle and the disconnect-on-failure rule.

use crate::{
    core::Grid,
    error::{PhotocycleError, PhotocycleResult},
};

/// First byte of every device frame.
pub const FRAME_HEADER: u8 = 0xAB;
/// Last byte of every device frame.
pub const FRAME_FOOTER: u8 = 0xBA;
/// Minimum spacing between transmitted frames, to avoid saturating the
/// transport. Also guarantees at most one in-flight write.
pub const MIN_SEND_INTERVAL_MS: u64 = 50;

/// Serialize a resolved grid into a device frame.
///
/// Per cell: `R,G,B = round(component * brightness_pct / 100)` when active,
/// else zeros. Cells missing from a short grid also emit zeros. Brightness
/// is clamped to `[0, 100]`. Total length is `2 + 3 * dim^2 + 1` bytes.
pub fn encode_frame(grid: &Grid, master_brightness_pct: u8, dim: u8) -> Vec<u8> {
    let dim = dim.max(1);
    let pct = f64::from(master_brightness_pct.min(100)) / 100.0;
    let count = usize::from(dim) * usize::from(dim);

    let mut buf = Vec::with_capacity(2 + 3 * count + 1);
    buf.push(FRAME_HEADER);
    buf.push(dim);
    for idx in 0..count {
        let cell = grid.cell_or_off(idx);
        if cell.active {
            buf.push(scale(cell.r, pct));
            buf.push(scale(cell.g, pct));
            buf.push(scale(cell.b, pct));
        } else {
            buf.extend_from_slice(&[0, 0, 0]);
        }
    }
    buf.push(FRAME_FOOTER);
    buf
}

fn scale(component: u8, pct: f64) -> u8 {
    (f64::from(component) * pct).round().clamp(0.0, 255.0) as u8
}

/// Byte sink contract for the hardware transport.
///
/// The core only pushes frames in the [`encode_frame`] format and never
/// parses a device response. A failing `write` must be observable so the
/// send loop stops attempting further sends until reconnection.
pub trait FrameSink {
    /// Transmit one framed buffer.
    fn write(&mut self, bytes: &[u8]) -> PhotocycleResult<()>;
    /// Release the underlying connection. Errors on close are ignored by
    /// callers; the sink is gone either way.
    fn close(&mut self);
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<Vec<u8>>,
    closed: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSink for InMemorySink {
    fn write(&mut self, bytes: &[u8]) -> PhotocycleResult<()> {
        self.frames.push(bytes.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Sink backed by any [`std::io::Write`] (a file, a pipe, a serial handle
/// opened elsewhere).
pub struct WriterSink<W: std::io::Write> {
    inner: W,
}

impl<W: std::io::Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: std::io::Write> FrameSink for WriterSink<W> {
    fn write(&mut self, bytes: &[u8]) -> PhotocycleResult<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| PhotocycleError::transport(format!("frame write failed: {e}")))
    }

    fn close(&mut self) {
        let _ = self.inner.flush();
    }
}

/// Outcome of one [`FrameStreamer::send`] attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Frame was written to the sink.
    Sent,
    /// Dropped: the previous frame was sent less than
    /// [`MIN_SEND_INTERVAL_MS`] ago.
    Throttled,
    /// No sink is connected.
    Disconnected,
}

/// Clock-driven frame sender: throttles to one frame per 50 ms and forces
/// disconnection on the first write failure rather than retrying silently.
/// There is no automatic reconnect; callers attach a new sink explicitly.
///
/// Timestamps are injected (`now_ms`) so tests drive the throttle with
/// synthetic time.
pub struct FrameStreamer {
    sink: Option<Box<dyn FrameSink>>,
    last_send_ms: Option<u64>,
}

impl FrameStreamer {
    pub fn new() -> Self {
        Self {
            sink: None,
            last_send_ms: None,
        }
    }

    /// Attach a freshly opened transport, replacing (and closing) any
    /// previous one.
    pub fn connect(&mut self, sink: Box<dyn FrameSink>) {
        self.disconnect();
        self.sink = Some(sink);
        self.last_send_ms = None;
    }

    /// Close and drop the current sink, if any.
    pub fn disconnect(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    /// Encode `grid` and transmit it, subject to the throttle.
    ///
    /// On a write failure the transport is disconnected and the error is
    /// returned; subsequent sends report [`SendOutcome::Disconnected`] until
    /// a new sink is attached.
    #[tracing::instrument(skip(self, grid))]
    pub fn send(
        &mut self,
        grid: &Grid,
        master_brightness_pct: u8,
        now_ms: u64,
    ) -> PhotocycleResult<SendOutcome> {
        if self.sink.is_none() {
            return Ok(SendOutcome::Disconnected);
        }
        if let Some(last) = self.last_send_ms
            && now_ms.saturating_sub(last) < MIN_SEND_INTERVAL_MS
        {
            return Ok(SendOutcome::Throttled);
        }

        let frame = encode_frame(grid, master_brightness_pct, grid.dim());
        let result = match self.sink.as_mut() {
            Some(sink) => sink.write(&frame),
            None => return Ok(SendOutcome::Disconnected),
        };
        match result {
            Ok(()) => {
                self.last_send_ms = Some(now_ms);
                Ok(SendOutcome::Sent)
            }
            Err(err) => {
                tracing::warn!(error = %err, "frame write failed, disconnecting transport");
                self.disconnect();
                Err(err)
            }
        }
    }
}

impl Default for FrameStreamer {
    fn default() -> Self {
        Self::new()
    }
}
