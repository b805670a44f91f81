//! Board items: identifiers, layers, tracks, pads and filled zones.

use copperpath_geom::{point_in_polygon, segment_hit_test, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a committed track segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PadId(pub u32);

impl fmt::Display for PadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Net number. `0` is the "no net" code used by floating copper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NetCode(pub u32);

impl NetCode {
    pub const UNCONNECTED: NetCode = NetCode(0);
}

impl fmt::Display for NetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net {}", self.0)
    }
}

/// Copper layer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u8);

impl LayerId {
    pub const F_CU: LayerId = LayerId(0);
    pub const B_CU: LayerId = LayerId(31);
}

impl Default for LayerId {
    fn default() -> Self {
        LayerId::F_CU
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LayerId::F_CU => write!(f, "F.Cu"),
            LayerId::B_CU => write!(f, "B.Cu"),
            LayerId(n) => write!(f, "In{n}.Cu"),
        }
    }
}

/// Bit set of layers, one bit per [`LayerId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSet(pub u64);

impl LayerSet {
    pub const EMPTY: LayerSet = LayerSet(0);

    pub fn single(layer: LayerId) -> Self {
        LayerSet(1u64 << (layer.0 & 63))
    }

    /// Front, back and all inner copper layers.
    pub fn all_copper() -> Self {
        LayerSet((1u64 << 32) - 1)
    }

    pub fn with(self, layer: LayerId) -> Self {
        LayerSet(self.0 | LayerSet::single(layer).0)
    }

    pub fn contains(self, layer: LayerId) -> bool {
        self.0 & LayerSet::single(layer).0 != 0
    }

    pub fn intersects(self, other: LayerSet) -> bool {
        self.0 & other.0 != 0
    }
}

/// What a track endpoint is attached to. Attachment is a connectivity
/// relation, not ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Anchor {
    #[default]
    None,
    Pad(PadId),
    Track(TrackId),
}

/// One of the two ends of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Status flags carried by a track segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackState {
    pub begin_on_pad: bool,
    pub end_on_pad: bool,
    /// Temporarily excluded from collision queries.
    pub busy: bool,
    pub deleted: bool,
}

/// A committed straight copper segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub start: Point,
    pub end: Point,
    pub layer: LayerId,
    pub width: i32,
    pub net: NetCode,
    #[serde(default)]
    pub start_anchor: Anchor,
    #[serde(default)]
    pub end_anchor: Anchor,
    #[serde(default)]
    pub state: TrackState,
}

impl Track {
    /// A detached segment. The id is a placeholder until the board assigns one.
    pub fn new(start: Point, end: Point, layer: LayerId, width: i32, net: NetCode) -> Self {
        Self {
            id: TrackId(0),
            start,
            end,
            layer,
            width,
            net,
            start_anchor: Anchor::None,
            end_anchor: Anchor::None,
            state: TrackState::default(),
        }
    }

    /// A null segment has coincident endpoints.
    pub fn is_null(&self) -> bool {
        self.start == self.end
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).length()
    }

    pub fn endpoint(&self, which: Endpoint) -> Point {
        match which {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn anchor(&self, which: Endpoint) -> Anchor {
        match which {
            Endpoint::Start => self.start_anchor,
            Endpoint::End => self.end_anchor,
        }
    }

    /// True when `pos` lies on the copper of this track.
    pub fn hit_test(&self, pos: Point) -> bool {
        pos == self.start
            || pos == self.end
            || segment_hit_test(pos, self.start, self.end, self.width / 2)
    }

    /// Whether the segment is usable for connectivity and collision queries.
    pub fn is_live(&self) -> bool {
        !self.state.deleted
    }
}

/// A fixed rectangular connection point of a footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    pub id: PadId,
    pub position: Point,
    pub width: i32,
    pub height: i32,
    pub net: NetCode,
    #[serde(default = "LayerSet::all_copper")]
    pub layers: LayerSet,
}

impl Pad {
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.width, self.height)
    }

    /// The pad centre or any point strictly inside its outline.
    pub fn hit_test(&self, pos: Point) -> bool {
        if pos == self.position {
            return true;
        }
        let d = pos - self.position;
        (d.x as i64).abs() * 2 < self.width as i64 && (d.y as i64).abs() * 2 < self.height as i64
    }

    pub fn is_on_layer(&self, layer: LayerId) -> bool {
        self.layers.contains(layer)
    }
}

/// A copper zone. Only filled zones are valid routing anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub net: NetCode,
    pub layer: LayerId,
    pub outline: Vec<Point>,
    #[serde(default = "default_filled")]
    pub filled: bool,
}

fn default_filled() -> bool {
    true
}

impl Zone {
    pub fn hit_test_filled_area(&self, pos: Point, layer: LayerId) -> bool {
        self.filled && self.layer == layer && point_in_polygon(pos, &self.outline)
    }
}

/// A connectable item found under a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPoint {
    Pad(PadId),
    Track(TrackId),
}

impl From<LockPoint> for Anchor {
    fn from(lock: LockPoint) -> Self {
        match lock {
            LockPoint::Pad(id) => Anchor::Pad(id),
            LockPoint::Track(id) => Anchor::Track(id),
        }
    }
}
