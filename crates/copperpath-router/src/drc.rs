//! Clearance checking of route segments against committed copper.

use std::fmt;

use copperpath_board::{LayerId, NetCode, PadId, TrackId};
use copperpath_geom::segment_segment_distance;
use thiserror::Error;

use crate::board::BoardQuery;
use crate::chain::RouteSegment;
use crate::settings::NetClasses;

/// Copper item a segment came too close to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    Track(TrackId),
    Pad(PadId),
}

impl fmt::Display for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obstacle::Track(id) => write!(f, "track {id}"),
            Obstacle::Pad(id) => write!(f, "pad {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{net} on {layer} is {actual:.0} from {obstacle} of {obstacle_net}, {required} required")]
pub struct ClearanceViolation {
    pub net: NetCode,
    pub layer: LayerId,
    pub obstacle: Obstacle,
    pub obstacle_net: NetCode,
    /// Centre-line distance found.
    pub actual: f64,
    /// Minimum centre-line distance allowed.
    pub required: i32,
}

/// A design rule check for a single segment.
pub trait ClearanceCheck {
    fn check<B: BoardQuery + ?Sized>(
        &self,
        segment: &RouteSegment,
        board: &B,
        net_classes: &NetClasses,
    ) -> Result<(), ClearanceViolation>;
}

/// Checks a segment against every track and pad of another net on its
/// layer. Pads are treated as their bounding rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentClearance;

impl ClearanceCheck for SegmentClearance {
    fn check<B: BoardQuery + ?Sized>(
        &self,
        segment: &RouteSegment,
        board: &B,
        net_classes: &NetClasses,
    ) -> Result<(), ClearanceViolation> {
        for track in board.tracks() {
            if !track.is_live()
                || track.state.busy
                || track.layer != segment.layer
                || track.net == segment.net
            {
                continue;
            }

            let required =
                (segment.width + track.width) / 2 + net_classes.clearance(segment.net, track.net);
            let actual = segment_segment_distance(segment.start, segment.end, track.start, track.end);
            if actual < required as f64 {
                return Err(ClearanceViolation {
                    net: segment.net,
                    layer: segment.layer,
                    obstacle: Obstacle::Track(track.id),
                    obstacle_net: track.net,
                    actual,
                    required,
                });
            }
        }

        for pad in board.pads() {
            if !pad.is_on_layer(segment.layer) || pad.net == segment.net {
                continue;
            }

            let required = segment.width / 2 + net_classes.clearance(segment.net, pad.net);
            let actual = pad.bounds().distance_to_segment(segment.start, segment.end);
            if actual < required as f64 {
                return Err(ClearanceViolation {
                    net: segment.net,
                    layer: segment.layer,
                    obstacle: Obstacle::Pad(pad.id),
                    obstacle_net: pad.net,
                    actual,
                    required,
                });
            }
        }

        Ok(())
    }
}
