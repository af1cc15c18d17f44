pub mod cached_landmark_provider;
pub mod landmark_trace;
