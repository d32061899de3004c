use serde_derive::{Deserialize, Serialize};

use nalgebra as na;

use crate::track::TrackedObject;

/// Everything known about one video frame after reconciliation and team
/// classification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub frame_number: u64,
    pub timestamp: f64, // in seconds
    pub objects: Vec<TrackedObject>,
    pub player_count: usize,
    pub ball_detected: bool,
}

impl FrameRecord {
    pub fn new(frame_number: u64, fps: f64, objects: Vec<TrackedObject>) -> Self {
        let player_count = objects.iter().filter(|o| o.is_player()).count();
        let ball_detected = objects.iter().any(|o| o.is_ball());

        Self {
            frame_number,
            timestamp: frame_number as f64 / fps,
            objects,
            player_count,
            ball_detected,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn players(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.iter().filter(|o| o.is_player())
    }

    pub fn player_centers(&self) -> Vec<na::Point2<f32>> {
        self.players().map(|o| o.center()).collect()
    }

    /// Center of the most confident ball, if any
    pub fn ball_position(&self) -> Option<na::Point2<f32>> {
        self.objects
            .iter()
            .filter(|o| o.is_ball())
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|o| o.center())
    }
}
