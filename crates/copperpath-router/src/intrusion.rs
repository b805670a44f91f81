//! Detection and resolution of a moving segment intruding on the clearance
//! area of committed tracks.

use copperpath_board::{LayerId, Track};
use copperpath_geom::{
    perpendicular_push_vector, project_onto_segment, projects_onto_interior, segment_hit_test,
    Point,
};
use log::trace;

use crate::chain::RouteSegment;
use crate::settings::NetClasses;

/// Find the committed track whose clearance area contains `reference`.
///
/// Only live, non-busy tracks of another net on `layer` are considered. A
/// track that `reference` projects onto between its endpoints is returned
/// immediately; otherwise the first track hit near one of its ends is.
pub fn find_intrusion<'a>(
    tracks: &'a [Track],
    moving: &RouteSegment,
    layer: LayerId,
    reference: Point,
    net_classes: &NetClasses,
) -> Option<&'a Track> {
    let mut end_on = None;

    for track in tracks {
        if track.state.deleted || track.state.busy {
            continue;
        }
        if track.layer != layer || track.net == moving.net {
            continue;
        }

        let dist = (moving.width + track.width) / 2 + net_classes.clearance(moving.net, track.net);
        if !segment_hit_test(reference, track.start, track.end, dist) {
            continue;
        }

        if projects_onto_interior(reference, track.start, track.end) {
            return Some(track);
        }
        if end_on.is_none() {
            end_on = Some(track);
        }
    }

    end_on
}

/// Move `cursor` out of the clearance area of the track it intrudes on.
///
/// The result sits on the cursor's side of the offending track, at the
/// distance where both track edges plus the clearance just fit. `None` means
/// no push is needed or possible.
pub fn push_out_of_intrusion(
    tracks: &[Track],
    moving: &RouteSegment,
    layer: LayerId,
    cursor: Point,
    net_classes: &NetClasses,
) -> Option<Point> {
    let other = find_intrusion(tracks, moving, layer, cursor, net_classes)?;
    if other.net == moving.net {
        return None;
    }

    let dist = (moving.width + 1) / 2
        + (other.width + 1) / 2
        + net_classes.clearance(moving.net, other.net)
        + 2;
    let push = perpendicular_push_vector(cursor, other.start, other.end, dist);
    if push.is_zero() {
        return None;
    }

    let pushed = project_onto_segment(cursor, other.start, other.end) + push;
    trace!("Pushed {cursor} out of {} to {pushed}", other.id);
    Some(pushed)
}
