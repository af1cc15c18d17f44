//! Facial landmark groups for one detected face.
//!
//! The full 68-point shape is split with the standard layout:
//! jaw 0..17, brows 17..27, nose 27..36, right eye 36..42,
//! left eye 42..48, mouth 48..68.

use std::ops::Range;

use thiserror::Error;

use crate::shared::constants::SHAPE_POINT_COUNT;
use crate::shared::point::Point;

pub const RIGHT_EYE: Range<usize> = 36..42;
pub const LEFT_EYE: Range<usize> = 42..48;
pub const MOUTH: Range<usize> = 48..68;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected 68 landmark points, got {0}")]
    ShapeSize(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    left_eye: [Point; 6],
    right_eye: [Point; 6],
    /// Outer contour first, in the collaborator's order.
    mouth: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(left_eye: [Point; 6], right_eye: [Point; 6], mouth: Vec<Point>) -> Self {
        Self {
            left_eye,
            right_eye,
            mouth,
        }
    }

    /// Splits a full 68-point shape into eye and mouth groups.
    pub fn from_shape(shape: &[Point]) -> Result<Self, LandmarkError> {
        if shape.len() != SHAPE_POINT_COUNT {
            return Err(LandmarkError::ShapeSize(shape.len()));
        }
        let eye = |range: Range<usize>| {
            let mut pts = [Point::default(); 6];
            pts.copy_from_slice(&shape[range]);
            pts
        };
        Ok(Self {
            left_eye: eye(LEFT_EYE),
            right_eye: eye(RIGHT_EYE),
            mouth: shape[MOUTH].to_vec(),
        })
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.left_eye
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.right_eye
    }

    pub fn mouth(&self) -> &[Point] {
        &self.mouth
    }

    /// Area of the axis-aligned box around every point; a proxy for how
    /// close the face is to the camera.
    pub fn bounding_area(&self) -> f64 {
        let mut points = self
            .left_eye
            .iter()
            .chain(self.right_eye.iter())
            .chain(self.mouth.iter());
        let Some(first) = points.next() else {
            return 0.0;
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (max_x - min_x) * (max_y - min_y)
    }
}
