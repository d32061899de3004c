use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::team::TeamColor;
use crate::track::TrackedObject;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Formation {
    OffensiveLine,
    FourThreeDefense,
    PreventDefense,
    Balanced,
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Formation::OffensiveLine => "offensive line",
            Formation::FourThreeDefense => "4-3 defense",
            Formation::PreventDefense => "prevent defense",
            Formation::Balanced => "balanced",
        })
    }
}

/// Players per third of a team's own vertical extent, nearest third first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub front: usize,
    pub middle: usize,
    pub back: usize,
}

impl LineCounts {
    pub fn from_ys(ys: &[f32]) -> Self {
        let mut counts = LineCounts::default();

        let min = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let third = (max - min) / 3.0;

        for &y in ys {
            if third <= 0.0 || y < min + third {
                counts.front += 1;
            } else if y < min + 2.0 * third {
                counts.middle += 1;
            } else {
                counts.back += 1;
            }
        }

        counts
    }

    pub fn formation(&self) -> Formation {
        if self.front >= 5 {
            Formation::OffensiveLine
        } else if self.front >= 4 && self.middle >= 3 {
            Formation::FourThreeDefense
        } else if self.back >= 4 {
            Formation::PreventDefense
        } else {
            Formation::Balanced
        }
    }
}

struct TeamGroup {
    ys: Vec<f32>,
    top: f32,
    bottom: f32,
}

impl TeamGroup {
    fn new(ys: Vec<f32>) -> Self {
        let top = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let bottom = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        Self { ys, top, bottom }
    }

    #[inline]
    fn extent(&self) -> f32 {
        self.bottom - self.top
    }

    /// Share of the shorter y extent that both groups cover. A flat group
    /// lying within the other's extent counts as fully covered.
    fn overlap(&self, other: &TeamGroup) -> f32 {
        let shared = self.bottom.min(other.bottom) - self.top.max(other.top);
        if shared < 0.0 {
            return 0.0;
        }

        let shorter = self.extent().min(other.extent());
        if shorter <= 0.0 {
            return 1.0;
        }

        (shared / shorter).min(1.0)
    }
}

/// Names the formation of each team among `players`, e.g.
/// `"red: offensive line, blue: 4-3 defense"`.
///
/// Players without a team color are ignored, teams smaller than `min_players`
/// are skipped, and teams whose y extent overlaps another's by more than
/// `max_overlap` of the shorter one cannot be told apart and are skipped as
/// well. Returns `None`
/// when no team is left.
pub fn describe<'a, I>(players: I, min_players: usize, max_overlap: f32) -> Option<String>
where
    I: IntoIterator<Item = &'a TrackedObject>,
{
    let mut by_color: BTreeMap<TeamColor, Vec<f32>> = BTreeMap::new();
    for p in players.into_iter().filter(|o| o.is_player()) {
        if let Some(color) = p.team_color {
            by_color.entry(color).or_default().push(p.center().y);
        }
    }

    let groups: Vec<(TeamColor, TeamGroup)> = by_color
        .into_iter()
        .filter(|(_, ys)| ys.len() >= min_players)
        .map(|(color, ys)| (color, TeamGroup::new(ys)))
        .collect();

    let labels: Vec<String> = groups
        .iter()
        .enumerate()
        .filter(|(i, (color, group))| {
            let ambiguous = groups
                .iter()
                .enumerate()
                .any(|(j, (_, other))| *i != j && group.overlap(other) > max_overlap);

            if ambiguous {
                debug!(%color, "team depth overlaps another team, formation skipped");
            }

            !ambiguous
        })
        .map(|(_, (color, group))| {
            format!("{}: {}", color, LineCounts::from_ys(&group.ys).formation())
        })
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(", "))
    }
}
