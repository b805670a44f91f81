//! Read-only summary of a route in progress, for drawing and status display.

use copperpath_board::NetCode;
use copperpath_geom::Point;
use serde::Serialize;

use crate::chain::RouteSegment;
use crate::session::RouteSession;
use crate::settings::RouteSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePreview {
    pub net: NetCode,
    pub segments: Vec<PreviewSegment>,
    pub segment_count: usize,
    pub length: f64,
    /// Segment worth reporting: the tail, or the one before it while the
    /// tail has no length yet.
    pub info_segment: Option<PreviewSegment>,
    /// Where a via would go.
    pub cursor_end: Point,
    pub via_radius: i32,
    pub via_clearance_radius: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewSegment {
    pub start: Point,
    pub end: Point,
    pub width: i32,
}

impl From<&RouteSegment> for PreviewSegment {
    fn from(segment: &RouteSegment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            width: segment.width,
        }
    }
}

impl RoutePreview {
    pub fn of(session: &RouteSession, settings: &RouteSettings) -> Self {
        let chain = session.chain();
        let net = session.net();

        let info_segment = match (chain.tail(), chain.previous()) {
            (Some(tail), Some(previous)) if tail.is_null() => Some(previous),
            (tail, _) => tail,
        };

        let via_radius = settings.via_size(net) / 2;
        Self {
            net,
            segments: chain.iter().map(PreviewSegment::from).collect(),
            segment_count: chain.len(),
            length: chain.total_length(),
            info_segment: info_segment.map(PreviewSegment::from),
            cursor_end: chain.tail().map_or(session.cursor(), |tail| tail.end),
            via_radius,
            via_clearance_radius: via_radius + settings.net_classes.class_of(net).clearance,
        }
    }
}
