//! Eye and mouth openness ratios from ordered contour points.
//!
//! Both ratios divide the mean of two vertical spans by the horizontal span
//! of the same contour, so they are invariant to face scale.

use thiserror::Error;

use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::point::Point;

/// Points in a canonical eye contour: corner, two upper, corner, two lower.
pub const EYE_POINTS: usize = 6;

/// Minimum mouth contour points needed for the mouth ratio.
pub const MIN_MOUTH_POINTS: usize = 11;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate {what} contour: horizontal span is zero")]
    Degenerate { what: &'static str },
    #[error("{what} contour needs at least {expected} points, got {actual}")]
    TooFewPoints {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Eye aspect ratio: `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)`.
///
/// Low values mean a closed or closing eye.
pub fn eye_aspect_ratio(eye: &[Point]) -> Result<f64, GeometryError> {
    if eye.len() < EYE_POINTS {
        return Err(GeometryError::TooFewPoints {
            what: "eye",
            expected: EYE_POINTS,
            actual: eye.len(),
        });
    }
    aspect_ratio("eye", eye, [(1, 5), (2, 4)], (0, 3))
}

/// Mouth aspect ratio: `(|p2-p10| + |p4-p8|) / (2 * |p0-p6|)`.
///
/// High values mean an open mouth (yawn proxy).
pub fn mouth_aspect_ratio(mouth: &[Point]) -> Result<f64, GeometryError> {
    if mouth.len() < MIN_MOUTH_POINTS {
        return Err(GeometryError::TooFewPoints {
            what: "mouth",
            expected: MIN_MOUTH_POINTS,
            actual: mouth.len(),
        });
    }
    aspect_ratio("mouth", mouth, [(2, 10), (4, 8)], (0, 6))
}

fn aspect_ratio(
    what: &'static str,
    points: &[Point],
    vertical: [(usize, usize); 2],
    horizontal: (usize, usize),
) -> Result<f64, GeometryError> {
    let width = points[horizontal.0].distance(&points[horizontal.1]);
    if width < f64::EPSILON || !width.is_finite() {
        return Err(GeometryError::Degenerate { what });
    }
    let a = points[vertical[0].0].distance(&points[vertical[0].1]);
    let b = points[vertical[1].0].distance(&points[vertical[1].1]);
    Ok((a + b) / (2.0 * width))
}

/// Per-face openness signals for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceMetrics {
    pub ear: f64,
    pub mar: f64,
}

impl FaceMetrics {
    pub fn new(ear: f64, mar: f64) -> Self {
        Self { ear, mar }
    }

    /// EAR is averaged over both eyes; MAR uses the outer mouth contour.
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Result<Self, GeometryError> {
        let left = eye_aspect_ratio(landmarks.left_eye())?;
        let right = eye_aspect_ratio(landmarks.right_eye())?;
        let mar = mouth_aspect_ratio(landmarks.mouth())?;
        Ok(Self {
            ear: (left + right) / 2.0,
            mar,
        })
    }
}
