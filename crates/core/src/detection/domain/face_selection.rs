use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::detection::domain::landmark_set::LandmarkSet;

/// Decides which detected face drives the fatigue state each frame.
///
/// Exactly one face is used per frame; the rest are ignored, so detector
/// iteration order never mixes several people into one set of counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSelection {
    /// First face reported by the provider.
    First,
    /// Face with the largest landmark bounding box (closest to the camera).
    /// Ties go to the earliest reported face.
    #[default]
    Largest,
}

impl FaceSelection {
    /// Index of the face to monitor, or `None` when no face was detected.
    pub fn select(&self, faces: &[LandmarkSet]) -> Option<usize> {
        if faces.is_empty() {
            return None;
        }
        match self {
            FaceSelection::First => Some(0),
            FaceSelection::Largest => {
                let mut best = 0;
                let mut best_area = faces[0].bounding_area();
                for (i, face) in faces.iter().enumerate().skip(1) {
                    let area = face.bounding_area();
                    if area > best_area {
                        best = i;
                        best_area = area;
                    }
                }
                Some(best)
            }
        }
    }
}

impl fmt::Display for FaceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceSelection::First => write!(f, "first"),
            FaceSelection::Largest => write!(f, "largest"),
        }
    }
}

impl FromStr for FaceSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(FaceSelection::First),
            "largest" => Ok(FaceSelection::Largest),
            other => Err(format!(
                "face selection must be 'first' or 'largest', got '{other}'"
            )),
        }
    }
}
