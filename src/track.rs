use serde_derive::{Deserialize, Serialize};

use nalgebra as na;

use crate::bbox::{BBox, Ltrb};
use crate::detection::ObjectClass;
use crate::team::TeamColor;

/// Tracker output for one player in one frame
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Track {
    pub track_id: u32,
    pub bbox: BBox<Ltrb>,
}

impl Track {
    #[inline]
    pub fn new(track_id: u32, bbox: BBox<Ltrb>) -> Self {
        Self { track_id, bbox }
    }
}

/// Detection merged with tracker identity. `track_id` is `None` for untracked
/// objects (balls and players no track claimed).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub track_id: Option<u32>,
    pub class: ObjectClass,
    pub bbox: BBox<Ltrb>,
    pub confidence: f32,
    pub team_color: Option<TeamColor>,
}

impl TrackedObject {
    #[inline(always)]
    pub fn is_player(&self) -> bool {
        self.class == ObjectClass::Player
    }

    #[inline(always)]
    pub fn is_ball(&self) -> bool {
        self.class == ObjectClass::Ball
    }

    #[inline(always)]
    pub fn is_tracked(&self) -> bool {
        self.track_id.is_some()
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }
}
