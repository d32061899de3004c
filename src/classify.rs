use nalgebra as na;

use crate::config::Config;
use crate::frame::FrameRecord;
use crate::math;
use crate::play::{KeyEvent, PlayType};

/// Net ball movement between the first and the last sighting of a play, in
/// pixels. `vertical` is signed, negative when the ball moved up the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Displacement {
    pub fn of(ball: &[na::Point2<f32>]) -> Option<Self> {
        let first = ball.first()?;
        let last = ball.last()?;

        Some(Self {
            horizontal: (last.x - first.x).abs(),
            vertical: last.y - first.y,
        })
    }
}

/// Play type from ball movement, `None` meaning the ball was never seen
pub fn play_type(displacement: Option<Displacement>, pass_over: f32, run_over: f32) -> PlayType {
    match displacement {
        Some(d) if d.vertical.abs() > pass_over => PlayType::Pass,
        Some(d) if d.horizontal > run_over => PlayType::Run,
        Some(_) => PlayType::ShortPlay,
        None => PlayType::Unknown,
    }
}

#[derive(Debug, Clone)]
pub struct PlayClassifier {
    pass_displacement: f32,
    run_displacement: f32,
    tackle_radius: f32,
    tackle_min_players: usize,
}

impl PlayClassifier {
    pub fn new(cfg: &Config) -> Self {
        Self {
            pass_displacement: cfg.pass_displacement,
            run_displacement: cfg.run_displacement,
            tackle_radius: cfg.tackle_radius,
            tackle_min_players: cfg.tackle_min_players,
        }
    }

    /// Labels the play spanned by `frames` and lists its key events. The
    /// formation label, when present, is the last event. Tackles are only
    /// looked for after the first frame, the snap.
    pub fn classify(&self, frames: &[&FrameRecord], formation: Option<String>) -> (PlayType, Vec<KeyEvent>) {
        let ball: Vec<na::Point2<f32>> = frames.iter().filter_map(|f| f.ball_position()).collect();
        let kind = play_type(
            Displacement::of(&ball),
            self.pass_displacement,
            self.run_displacement,
        );

        let mut events = vec![KeyEvent::Snap];

        match kind {
            PlayType::Pass => events.push(KeyEvent::Pass),
            PlayType::Run => events.push(KeyEvent::Handoff),
            PlayType::ShortPlay | PlayType::Unknown => {}
        }

        if frames.iter().skip(1).any(|f| self.is_tackle(f)) {
            events.push(KeyEvent::Tackle);
        }

        if let Some(label) = formation {
            events.push(KeyEvent::Formation(label));
        }

        (kind, events)
    }

    pub fn is_tackle(&self, frame: &FrameRecord) -> bool {
        frame.player_count >= self.tackle_min_players
            && math::has_tight_group(
                &frame.player_centers(),
                self.tackle_min_players,
                self.tackle_radius,
            )
    }
}
