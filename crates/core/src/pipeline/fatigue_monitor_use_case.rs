use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::actuation::domain::actuator_bank::ActuatorBank;
use crate::actuation::domain::actuator_sink::{ActuatorError, ActuatorSink};
use crate::alerting::domain::fatigue_state::FatigueState;
use crate::alerting::domain::fatigue_state_machine;
use crate::alerting::domain::monitor_event::MonitorEvent;
use crate::alerting::domain::thresholds::Thresholds;
use crate::detection::domain::face_selection::FaceSelection;
use crate::detection::domain::landmark_provider::LandmarkProvider;
use crate::geometry::aspect_ratio::FaceMetrics;
use crate::shared::clock::{Clock, Timestamp};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameSource, FrameSourceError};

use super::monitor_logger::MonitorLogger;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("camera error: {0}")]
    FrameAcquisition(#[from] FrameSourceError),
    #[error("monitor already ran")]
    AlreadyRan,
}

/// Why a run ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    EndOfStream,
    Interrupted,
}

impl RunOutcome {
    fn reason(&self) -> &'static str {
        match self {
            RunOutcome::EndOfStream => "end_of_stream",
            RunOutcome::Interrupted => "interrupted",
        }
    }
}

/// Runs the frame loop: frame source, landmark provider, metrics, state
/// machine, actuators.
///
/// Single-use: `run` may be called once. Every exit route (end of stream,
/// camera failure, interrupt, panic unwinding through `Drop`) goes through
/// [`shutdown`](Self::shutdown), which forces both outputs off and releases
/// the frame source exactly once.
pub struct FatigueMonitorUseCase {
    source: Box<dyn FrameSource>,
    provider: Box<dyn LandmarkProvider>,
    bank: ActuatorBank,
    clock: Box<dyn Clock>,
    logger: Box<dyn MonitorLogger>,
    thresholds: Thresholds,
    selection: FaceSelection,
    state: FatigueState,
    cancelled: Arc<AtomicBool>,
    frames: usize,
    ran: bool,
    released: bool,
}

impl FatigueMonitorUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        provider: Box<dyn LandmarkProvider>,
        sink: Box<dyn ActuatorSink>,
        clock: Box<dyn Clock>,
        logger: Box<dyn MonitorLogger>,
        thresholds: Thresholds,
        selection: FaceSelection,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source,
            provider,
            bank: ActuatorBank::new(sink),
            clock,
            logger,
            thresholds,
            selection,
            state: FatigueState::new(),
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            frames: 0,
            ran: false,
            released: false,
        }
    }

    pub fn state(&self) -> &FatigueState {
        &self.state
    }

    /// Frames read from the source so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn run(&mut self) -> Result<RunOutcome, MonitorError> {
        if self.ran {
            return Err(MonitorError::AlreadyRan);
        }
        self.ran = true;

        let result = self.run_loop();
        let reason = match &result {
            Ok(outcome) => outcome.reason(),
            Err(_) => "camera_error",
        };
        self.shutdown(reason);
        self.logger.summary();
        result
    }

    fn run_loop(&mut self) -> Result<RunOutcome, MonitorError> {
        let now = self.clock.now();
        self.logger.event(&MonitorEvent::Started { at: now });
        for e in self.bank.initialize() {
            self.report_actuator_error(now, e);
        }

        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Ok(RunOutcome::Interrupted);
            }
            match self.source.next_frame() {
                Ok(Some(frame)) => {
                    self.frames += 1;
                    self.process_frame(&frame);
                }
                Ok(None) => {
                    self.logger.event(&MonitorEvent::EndOfStream {
                        at: self.clock.now(),
                        frames: self.frames,
                    });
                    return Ok(RunOutcome::EndOfStream);
                }
                Err(e) => {
                    self.logger.event(&MonitorEvent::CameraError {
                        at: self.clock.now(),
                        message: e.to_string(),
                    });
                    return Err(e.into());
                }
            }
        }
    }

    /// Feeds one frame through detection, metrics and the state machine.
    ///
    /// Detection and geometry failures are logged and leave the fatigue
    /// state untouched. Frames without a face are silent.
    pub fn process_frame(&mut self, frame: &Frame) {
        let now = self.clock.now();
        let faces = match self.provider.detect_faces(frame) {
            Ok(faces) => faces,
            Err(e) => {
                self.report_geometry_error(now, frame, e.to_string());
                return;
            }
        };

        let Some(chosen) = self.selection.select(&faces) else {
            log::trace!("frame={} no face", frame.index());
            return;
        };
        if faces.len() > 1 {
            log::debug!(
                "frame={} faces={} using={chosen} selection={}",
                frame.index(),
                faces.len(),
                self.selection
            );
        }

        let metrics = match FaceMetrics::from_landmarks(&faces[chosen]) {
            Ok(metrics) => metrics,
            Err(e) => {
                self.report_geometry_error(now, frame, e.to_string());
                return;
            }
        };

        let step = fatigue_state_machine::step(&self.state, &self.thresholds, metrics, now);
        self.state = step.state;
        for event in &step.events {
            self.logger.event(event);
        }
        for e in self.bank.apply(&step.commands) {
            self.report_actuator_error(now, e);
        }
    }

    /// Forces both outputs off and releases the frame source. Later calls
    /// do nothing.
    pub fn shutdown(&mut self, reason: &str) {
        if self.released {
            return;
        }
        self.released = true;

        let now = self.clock.now();
        for e in self.bank.shutdown() {
            self.report_actuator_error(now, e);
        }
        self.source.release();
        self.logger.event(&MonitorEvent::Shutdown {
            at: now,
            reason: reason.to_string(),
        });
    }

    fn report_geometry_error(&mut self, at: Timestamp, frame: &Frame, message: String) {
        self.logger.event(&MonitorEvent::GeometryError {
            at,
            frame: frame.index(),
            message,
        });
    }

    fn report_actuator_error(&mut self, at: Timestamp, e: ActuatorError) {
        self.logger.event(&MonitorEvent::ActuatorError {
            at,
            output: e.output(),
            message: e.to_string(),
        });
    }
}

impl Drop for FatigueMonitorUseCase {
    fn drop(&mut self) {
        self.shutdown("dropped");
    }
}
