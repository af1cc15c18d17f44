use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),
    #[error("frame source I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame data: {0}")]
    Parse(String),
}

/// Yields frames in capture order, blocking until the next one is available.
///
/// `Ok(None)` marks the end of the stream. Any error is fatal to the
/// monitor loop.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError>;

    /// Releases the underlying device or file. Called once at shutdown.
    fn release(&mut self);
}
