use serde_derive::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use nalgebra as na;
use ndarray::prelude::*;
use tracing::trace;

use crate::bbox::{BBox, Ltrb};
use crate::config::Config;
use crate::track::TrackedObject;

// jersey region as fractions of the player box
const JERSEY_TOP: f32 = 0.1;
const JERSEY_BOTTOM: f32 = 0.5;
const JERSEY_LEFT: f32 = 0.2;
const JERSEY_RIGHT: f32 = 0.8;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Blue,
    Green,
    Yellow,
    Cyan,
    Magenta,
    Black,
    White,
    Gray,
}

impl TeamColor {
    pub const PALETTE: [TeamColor; 9] = [
        TeamColor::Red,
        TeamColor::Blue,
        TeamColor::Green,
        TeamColor::Yellow,
        TeamColor::Cyan,
        TeamColor::Magenta,
        TeamColor::Black,
        TeamColor::White,
        TeamColor::Gray,
    ];

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            TeamColor::Red => [255, 0, 0],
            TeamColor::Blue => [0, 0, 128],
            TeamColor::Green => [0, 128, 0],
            TeamColor::Yellow => [192, 192, 0],
            TeamColor::Cyan => [0, 192, 192],
            TeamColor::Magenta => [192, 0, 192],
            TeamColor::Black => [0, 0, 0],
            TeamColor::White => [255, 255, 255],
            TeamColor::Gray => [128, 128, 128],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Blue => "blue",
            TeamColor::Green => "green",
            TeamColor::Yellow => "yellow",
            TeamColor::Cyan => "cyan",
            TeamColor::Magenta => "magenta",
            TeamColor::Black => "black",
            TeamColor::White => "white",
            TeamColor::Gray => "gray",
        }
    }

    /// Palette entry closest to `color` in RGB space
    pub fn nearest(color: &na::Vector3<f32>) -> TeamColor {
        let mut best = TeamColor::Gray;
        let mut best_dist = f32::INFINITY;

        for candidate in TeamColor::PALETTE {
            let dist = (rgb_vector(candidate.rgb()) - color).norm();
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }

        best
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn rgb_vector(rgb: [u8; 3]) -> na::Vector3<f32> {
    na::Vector3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32)
}

/// Pixels of the jersey area of `bbox`, clipped to the image. `image` is
/// (height, width, 3) RGB.
pub fn jersey_pixels(image: ArrayView3<'_, u8>, bbox: &BBox<Ltrb>) -> Vec<na::Vector3<f32>> {
    let (ih, iw, channels) = image.dim();
    if channels < 3 {
        return Vec::new();
    }

    let (w, h) = (bbox.width(), bbox.height());
    let clip = |v: f32, max: usize| v.max(0.0).min(max as f32) as usize;

    let y0 = clip((bbox.top() + h * JERSEY_TOP).floor(), ih);
    let y1 = clip((bbox.top() + h * JERSEY_BOTTOM).ceil(), ih);
    let x0 = clip((bbox.left() + w * JERSEY_LEFT).floor(), iw);
    let x1 = clip((bbox.left() + w * JERSEY_RIGHT).ceil(), iw);

    if y1 <= y0 || x1 <= x0 {
        return Vec::new();
    }

    image
        .slice(s![y0..y1, x0..x1, ..3])
        .lanes(Axis(2))
        .into_iter()
        .map(|px| na::Vector3::new(px[0] as f32, px[1] as f32, px[2] as f32))
        .collect()
}

/// Two-means clustering with a deterministic seed: the first pixel, then the
/// pixel farthest from it. Returns `None` for fewer than two distinct colors.
pub fn two_means(pixels: &[na::Vector3<f32>], iterations: usize) -> Option<[na::Vector3<f32>; 2]> {
    let distinct: HashSet<[u32; 3]> = pixels
        .iter()
        .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
        .collect();

    if distinct.len() < 2 {
        return None;
    }

    let first = pixels[0];
    let second = pixels
        .iter()
        .copied()
        .max_by(|a, b| (a - first).norm().total_cmp(&(b - first).norm()))?;

    let mut centroids = [first, second];

    for _ in 0..iterations {
        let mut sums = [na::Vector3::<f32>::zeros(); 2];
        let mut counts = [0usize; 2];

        for p in pixels {
            let k = if (p - centroids[0]).norm() <= (p - centroids[1]).norm() {
                0
            } else {
                1
            };

            sums[k] += p;
            counts[k] += 1;
        }

        let mut next = centroids;
        for k in 0..2 {
            if counts[k] > 0 {
                next[k] = sums[k] / counts[k] as f32;
            }
        }

        if next == centroids {
            break;
        }

        centroids = next;
    }

    Some(centroids)
}

/// Maps a player crop to a palette color. The jersey is taken to be the
/// cluster farthest from the field color.
#[derive(Debug, Clone)]
pub struct TeamClassifier {
    field: na::Vector3<f32>,
    iterations: usize,
    recolor_below: f32,
}

impl TeamClassifier {
    pub fn new(cfg: &Config) -> Self {
        Self {
            field: rgb_vector(cfg.field_color),
            iterations: cfg.kmeans_iterations,
            recolor_below: cfg.recolor_below_confidence,
        }
    }

    pub fn classify(&self, image: ArrayView3<'_, u8>, bbox: &BBox<Ltrb>) -> Option<TeamColor> {
        let pixels = jersey_pixels(image, bbox);
        let [a, b] = two_means(&pixels, self.iterations)?;

        let jersey = if (a - self.field).norm() >= (b - self.field).norm() {
            a
        } else {
            b
        };

        Some(TeamColor::nearest(&jersey))
    }

    /// Fills `team_color` on every player of one frame. Tracked players go
    /// through `cache`; untracked players are classified afresh and balls get
    /// nothing.
    pub fn assign(
        &self,
        cache: &mut TeamColorCache,
        objects: &mut [TrackedObject],
        image: Option<ArrayView3<'_, u8>>,
    ) {
        for obj in objects.iter_mut().filter(|o| o.is_player()) {
            let bbox = obj.bbox;
            let compute = || image.and_then(|img| self.classify(img, &bbox));

            obj.team_color = match obj.track_id {
                Some(id) => cache.get_or_compute(id, obj.confidence < self.recolor_below, compute),
                None => compute(),
            };
        }
    }
}

/// Per-identity team colors for one video. Track ids are only meaningful
/// within a single tracking session, so a cache must never outlive it.
#[derive(Debug, Clone, Default)]
pub struct TeamColorCache {
    colors: HashMap<u32, TeamColor>,
}

impl TeamColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, track_id: u32) -> Option<TeamColor> {
        self.colors.get(&track_id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Cached color for `track_id`, computing it on a miss. With `force` the
    /// color is recomputed and replaces the entry, unless the recomputation
    /// comes back empty. Empty results are never stored.
    pub fn get_or_compute<F>(&mut self, track_id: u32, force: bool, compute: F) -> Option<TeamColor>
    where
        F: FnOnce() -> Option<TeamColor>,
    {
        if !force {
            if let Some(color) = self.get(track_id) {
                return Some(color);
            }
        }

        match compute() {
            Some(color) => {
                if self.colors.insert(track_id, color) != Some(color) {
                    trace!(track_id, %color, "team color assigned");
                }

                Some(color)
            }

            None => self.get(track_id),
        }
    }
}
