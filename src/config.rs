use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Tunables for one analysis session. Every field has a default, so a partial
/// document deserializes into a usable config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    // segmentation, seconds
    pub min_play_duration: f64,
    pub max_play_duration: f64,
    pub ball_settle_window: f64,

    // segmentation, pixels
    pub ball_movement_threshold: f32,
    pub player_clustering_threshold: f32,

    pub activation_player_count: usize,
    pub dispersal_player_count: usize,

    /// Only every n-th frame record is scanned by the segmenter
    pub frame_skip: usize,

    // identity reconciliation
    pub iou_threshold: f32,
    pub unmatched_track_confidence: f32,
    pub keep_unmatched_players: bool,

    // team colors
    pub field_color: [u8; 3],
    pub kmeans_iterations: usize,
    pub recolor_below_confidence: f32,

    // play type and events, pixels
    pub pass_displacement: f32,
    pub run_displacement: f32,
    pub tackle_radius: f32,
    pub tackle_min_players: usize,

    // formations
    pub formation_min_players: usize,
    pub formation_overlap_ratio: f32,

    /// Hand the frame records back with the plays
    pub return_frames: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_play_duration: 2.0,
            max_play_duration: 30.0,
            ball_settle_window: 2.0,
            ball_movement_threshold: 50.0,
            player_clustering_threshold: 100.0,
            activation_player_count: 6,
            dispersal_player_count: 4,
            frame_skip: 1,
            iou_threshold: 0.3,
            unmatched_track_confidence: 0.5,
            keep_unmatched_players: true,
            field_color: [0, 128, 0],
            kmeans_iterations: 10,
            recolor_below_confidence: 0.25,
            pass_displacement: 100.0,
            run_displacement: 200.0,
            tackle_radius: 100.0,
            tackle_min_players: 3,
            formation_min_players: 3,
            formation_overlap_ratio: 0.8,
            return_frames: false,
        }
    }
}

impl Config {
    /// Rejects threshold combinations the pipeline cannot run with. Called
    /// before any frame is processed.
    pub fn validate(&self) -> Result<(), Error> {
        non_negative("min_play_duration", self.min_play_duration)?;
        non_negative("max_play_duration", self.max_play_duration)?;
        non_negative("ball_settle_window", self.ball_settle_window)?;
        non_negative("ball_movement_threshold", self.ball_movement_threshold as f64)?;
        non_negative(
            "player_clustering_threshold",
            self.player_clustering_threshold as f64,
        )?;
        non_negative("pass_displacement", self.pass_displacement as f64)?;
        non_negative("run_displacement", self.run_displacement as f64)?;
        non_negative("tackle_radius", self.tackle_radius as f64)?;

        if self.min_play_duration > self.max_play_duration {
            return Err(Error::DurationBounds {
                min: self.min_play_duration,
                max: self.max_play_duration,
            });
        }

        if self.dispersal_player_count > self.activation_player_count {
            return Err(Error::PlayerCountOrder {
                dispersal: self.dispersal_player_count,
                activation: self.activation_player_count,
            });
        }

        fraction("iou_threshold", self.iou_threshold)?;
        fraction("unmatched_track_confidence", self.unmatched_track_confidence)?;
        fraction("recolor_below_confidence", self.recolor_below_confidence)?;
        fraction("formation_overlap_ratio", self.formation_overlap_ratio)?;

        at_least_one("frame_skip", self.frame_skip)?;
        at_least_one("activation_player_count", self.activation_player_count)?;
        at_least_one("kmeans_iterations", self.kmeans_iterations)?;
        at_least_one("tackle_min_players", self.tackle_min_players)?;
        at_least_one("formation_min_players", self.formation_min_players)?;

        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), Error> {
    // also rejects NaN
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::NegativeThreshold { name, value })
    }
}

fn fraction(name: &'static str, value: f32) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::FractionOutOfRange {
            name,
            value: value as f64,
        })
    }
}

fn at_least_one(name: &'static str, value: usize) -> Result<(), Error> {
    if value == 0 {
        Err(Error::ZeroCount { name })
    } else {
        Ok(())
    }
}
