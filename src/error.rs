use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("min_play_duration ({min}s) exceeds max_play_duration ({max}s)")]
    DurationBounds { min: f64, max: f64 },

    #[error("{name} must be a non-negative number, got {value}")]
    NegativeThreshold { name: &'static str, value: f64 },

    #[error("{name} must lie in [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("dispersal_player_count ({dispersal}) exceeds activation_player_count ({activation})")]
    PlayerCountOrder { dispersal: usize, activation: usize },

    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("frame rate must be positive and finite, got {0}")]
    InvalidFps(f64),

    #[error("frame {frame} received after frame {last}")]
    OutOfOrderFrame { frame: u64, last: u64 },
}
