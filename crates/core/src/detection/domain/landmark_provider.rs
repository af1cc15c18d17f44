use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;

/// Domain interface for face detection plus landmark extraction.
///
/// Returns one [`LandmarkSet`] per detected face; an empty vector is a
/// normal frame with nobody in view. Implementations may be stateful,
/// hence `&mut self`.
pub trait LandmarkProvider: Send {
    fn detect_faces(&mut self, frame: &Frame)
        -> Result<Vec<LandmarkSet>, Box<dyn std::error::Error>>;
}
