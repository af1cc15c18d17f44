use std::time::Duration;

use crate::detection::infrastructure::landmark_trace::{LandmarkTrace, TraceError, TraceRecord};
use crate::shared::clock::{ManualClock, Timestamp};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameSource, FrameSourceError};

impl From<TraceError> for FrameSourceError {
    fn from(e: TraceError) -> Self {
        match e {
            TraceError::Io { source, .. } => FrameSourceError::Io(source),
            other => FrameSourceError::Parse(other.to_string()),
        }
    }
}

/// Plays back a recorded landmark trace as a frame stream.
///
/// Frames carry no pixels; the matching faces come from a
/// [`CachedLandmarkProvider`](crate::detection::infrastructure::cached_landmark_provider::CachedLandmarkProvider)
/// built from the same trace. Each frame moves the shared clock to the
/// record's `t`, or one frame period past the previous frame when `t` is
/// absent. The clock never moves backwards.
pub struct ReplayFrameSource {
    records: Vec<TraceRecord>,
    position: usize,
    period: Duration,
    clock: ManualClock,
    last: Option<Timestamp>,
    released: bool,
}

impl ReplayFrameSource {
    pub fn new(trace: &LandmarkTrace, fps: f64, clock: ManualClock) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 1.0 };
        Self {
            records: trace.records().to_vec(),
            position: 0,
            period: Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::MAX),
            clock,
            last: None,
            released: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len().saturating_sub(self.position)
    }

    fn advance_clock(&mut self, frame: usize, t: Option<f64>) -> Result<(), FrameSourceError> {
        let at = match t {
            Some(secs) => Some(Timestamp::try_from_secs_f64(secs).ok_or_else(|| {
                FrameSourceError::Parse(format!("invalid capture time {secs} for frame {frame}"))
            })?),
            None => None,
        };
        let next = match (at, self.last) {
            (Some(at), Some(last)) => at.max(last),
            (Some(at), None) => at,
            (None, Some(last)) => last + self.period,
            (None, None) => Timestamp::ZERO,
        };
        self.clock.set(next);
        self.last = Some(next);
        Ok(())
    }
}

impl FrameSource for ReplayFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError> {
        if self.released {
            return Ok(None);
        }
        let Some(record) = self.records.get(self.position) else {
            return Ok(None);
        };
        let (index, t, camera_error) = (record.frame, record.t, record.camera_error.clone());
        self.position += 1;
        self.advance_clock(index, t)?;

        match camera_error {
            Some(message) => Err(FrameSourceError::Acquisition(message)),
            None => Ok(Some(Frame::placeholder(index))),
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            log::debug!("Replay released with {} frames unread", self.remaining());
        }
    }
}
