use tracing::trace;

use crate::config::Config;
use crate::detection::{Detection, ObjectClass};
use crate::track::{Track, TrackedObject};

/// Index and overlap of the detection that best matches `track`, if any
/// reaches `threshold`.
pub fn best_match(track: &Track, detections: &[Detection], threshold: f32) -> Option<(usize, f32)> {
    detections
        .iter()
        .enumerate()
        .filter(|(_, det)| det.is_player())
        .map(|(idx, det)| (idx, track.bbox.iou(&det.bbox)))
        .fold(None, |best: Option<(usize, f32)>, (idx, iou)| match best {
            Some((_, b)) if b >= iou => best,
            _ => Some((idx, iou)),
        })
        .filter(|&(_, iou)| iou >= threshold)
}

/// Merges one frame of detector and tracker output.
///
/// Every track yields exactly one object carrying its identity and box, with
/// the matched detection's confidence when one overlaps enough. Several
/// tracks may claim the same detection. Player detections that no track
/// claimed follow as untracked objects (unless disabled), then every ball.
/// Team colors are left empty.
pub fn reconcile(detections: &[Detection], tracks: &[Track], cfg: &Config) -> Vec<TrackedObject> {
    let mut claimed = vec![false; detections.len()];
    let mut objects = Vec::with_capacity(tracks.len() + detections.len());

    for track in tracks {
        let (class, confidence) = match best_match(track, detections, cfg.iou_threshold) {
            Some((idx, iou)) => {
                claimed[idx] = true;
                trace!(track_id = track.track_id, detection = idx, iou, "track matched");

                (detections[idx].class, detections[idx].confidence)
            }

            None => {
                trace!(track_id = track.track_id, "track has no overlapping detection");

                (ObjectClass::Player, cfg.unmatched_track_confidence)
            }
        };

        objects.push(TrackedObject {
            track_id: Some(track.track_id),
            class,
            bbox: track.bbox,
            confidence,
            team_color: None,
        });
    }

    if cfg.keep_unmatched_players {
        objects.extend(
            detections
                .iter()
                .zip(claimed.iter())
                .filter(|&(det, &taken)| det.is_player() && !taken)
                .map(|(det, _)| untracked(det)),
        );
    }

    objects.extend(detections.iter().filter(|det| det.is_ball()).map(untracked));

    objects
}

#[inline]
fn untracked(det: &Detection) -> TrackedObject {
    TrackedObject {
        track_id: None,
        class: det.class,
        bbox: det.bbox,
        confidence: det.confidence,
        team_color: None,
    }
}
