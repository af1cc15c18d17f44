use std::collections::HashMap;
use std::sync::Arc;

use crate::detection::domain::landmark_provider::LandmarkProvider;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;
use crate::shared::point::Point;

/// Replays pre-computed landmark shapes by frame index.
///
/// Shapes are validated when requested, so a malformed face in a trace
/// surfaces as a per-frame detection failure rather than aborting the load.
pub struct CachedLandmarkProvider {
    cache: Arc<HashMap<usize, Vec<Vec<Point>>>>,
}

impl CachedLandmarkProvider {
    pub fn new(cache: Arc<HashMap<usize, Vec<Vec<Point>>>>) -> Self {
        Self { cache }
    }
}

impl LandmarkProvider for CachedLandmarkProvider {
    fn detect_faces(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<LandmarkSet>, Box<dyn std::error::Error>> {
        let Some(shapes) = self.cache.get(&frame.index()) else {
            return Ok(Vec::new());
        };
        shapes
            .iter()
            .map(|shape| {
                LandmarkSet::from_shape(shape)
                    .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
            })
            .collect()
    }
}
