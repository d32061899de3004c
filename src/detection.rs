use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::{BBox, Ltrb};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Player,
    Ball,
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectClass::Player => f.write_str("player"),
            ObjectClass::Ball => f.write_str("ball"),
        }
    }
}

/// Single-frame detector output, carries no identity
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Detection {
    #[serde(rename = "c")]
    pub class: ObjectClass,
    pub bbox: BBox<Ltrb>,
    #[serde(rename = "p")]
    pub confidence: f32,
}

impl Detection {
    #[inline]
    pub fn new(class: ObjectClass, bbox: BBox<Ltrb>, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn player(bbox: BBox<Ltrb>, confidence: f32) -> Self {
        Self::new(ObjectClass::Player, bbox, confidence)
    }

    #[inline]
    pub fn ball(bbox: BBox<Ltrb>, confidence: f32) -> Self {
        Self::new(ObjectClass::Ball, bbox, confidence)
    }

    #[inline(always)]
    pub fn is_player(&self) -> bool {
        self.class == ObjectClass::Player
    }

    #[inline(always)]
    pub fn is_ball(&self) -> bool {
        self.class == ObjectClass::Ball
    }
}
