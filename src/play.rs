use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    Pass,
    Run,
    ShortPlay,
    Unknown,
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlayType::Pass => "pass",
            PlayType::Run => "run",
            PlayType::ShortPlay => "short_play",
            PlayType::Unknown => "unknown",
        })
    }
}

/// Tag attached to a play. Serialized as plain text, e.g. `"tackle"` or
/// `"formation: red: offensive line"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub enum KeyEvent {
    Snap,
    Pass,
    Handoff,
    Tackle,
    Formation(String),
}

const FORMATION_PREFIX: &str = "formation: ";

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Snap => f.write_str("snap"),
            KeyEvent::Pass => f.write_str("pass"),
            KeyEvent::Handoff => f.write_str("handoff"),
            KeyEvent::Tackle => f.write_str("tackle"),
            KeyEvent::Formation(label) => write!(f, "{}{}", FORMATION_PREFIX, label),
        }
    }
}

impl From<KeyEvent> for String {
    fn from(ev: KeyEvent) -> Self {
        ev.to_string()
    }
}

impl TryFrom<String> for KeyEvent {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "snap" => Ok(KeyEvent::Snap),
            "pass" => Ok(KeyEvent::Pass),
            "handoff" => Ok(KeyEvent::Handoff),
            "tackle" => Ok(KeyEvent::Tackle),
            other => match other.strip_prefix(FORMATION_PREFIX) {
                Some(label) => Ok(KeyEvent::Formation(label.to_string())),
                None => Err(format!("unknown key event: {:?}", other)),
            },
        }
    }
}

/// One detected play. Durations are in seconds, `player_count` is the peak
/// count seen while the play was open.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlaySegment {
    pub play_id: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub start_frame: u64,
    pub end_frame: u64,
    pub player_count: usize,
    pub play_type: PlayType,
    pub key_events: Vec<KeyEvent>,
}
