//! In-memory board model consumed by the copperpath router.
//!
//! The [`Board`] owns the persistent track list together with the pads and
//! filled zones that tracks can attach to. The router only reads it while a
//! route is in progress and mutates it once, when the route is committed.
//!
//! Boards are plain `serde` structures so that they can be stored or
//! exchanged as JSON (see [`Board::from_json`] and [`Board::to_json`]).

mod connectivity;
pub mod items;

pub use items::{
    Anchor, Endpoint, LayerId, LayerSet, LockPoint, NetCode, Pad, PadId, Track, TrackId,
    TrackState, Zone,
};

use copperpath_geom::{project_onto_segment, Point};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Committed segments, kept grouped by ascending net code.
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    pads: Vec<Pad>,
    #[serde(default)]
    zones: Vec<Zone>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn pad(&self, id: PadId) -> Option<&Pad> {
        self.pads.iter().find(|p| p.id == id)
    }

    fn track_index(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// The id the next inserted track will receive.
    pub fn next_track_id(&self) -> TrackId {
        TrackId(self.tracks.iter().map(|t| t.id.0 + 1).max().unwrap_or(1))
    }

    /// Add a pad with a fresh id.
    pub fn add_pad(
        &mut self,
        position: Point,
        width: i32,
        height: i32,
        net: NetCode,
        layers: LayerSet,
    ) -> PadId {
        let id = PadId(self.pads.iter().map(|p| p.id.0 + 1).max().unwrap_or(1));
        self.pads.push(Pad {
            id,
            position,
            width,
            height,
            net,
            layers,
        });
        id
    }

    pub fn add_zone(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    /// Add a free-standing track at its net-ordered position.
    pub fn add_track(
        &mut self,
        start: Point,
        end: Point,
        layer: LayerId,
        width: i32,
        net: NetCode,
    ) -> TrackId {
        let before = self.best_insert_point(net);
        self.insert_track(Track::new(start, end, layer, width, net), before)
    }

    /// Insert `track` before list position `before` (clamped to the end) and
    /// assign it a fresh id.
    pub fn insert_track(&mut self, mut track: Track, before: usize) -> TrackId {
        track.id = self.next_track_id();
        let id = track.id;
        let at = before.min(self.tracks.len());
        self.tracks.insert(at, track);
        id
    }

    /// List position in front of the first track whose net code is not below
    /// `net`, or the end of the list.
    pub fn best_insert_point(&self, net: NetCode) -> usize {
        self.tracks
            .iter()
            .position(|t| net <= t.net)
            .unwrap_or(self.tracks.len())
    }

    /// Remove a track. Tracks that referenced it are re-anchored to another
    /// live track of the same net and layer ending at the same point, or
    /// detached when there is none.
    pub fn remove_track(&mut self, id: TrackId) -> Option<Track> {
        let index = self.track_index(id)?;
        let removed = self.tracks.remove(index);
        for i in 0..self.tracks.len() {
            if self.tracks[i].start_anchor == Anchor::Track(id) {
                let at = self.tracks[i].start;
                self.tracks[i].start_anchor = self.anchor_replacing(&removed, i, at);
            }
            if self.tracks[i].end_anchor == Anchor::Track(id) {
                let at = self.tracks[i].end;
                self.tracks[i].end_anchor = self.anchor_replacing(&removed, i, at);
            }
        }
        Some(removed)
    }

    fn anchor_replacing(&self, removed: &Track, index: usize, at: Point) -> Anchor {
        let own = self.tracks[index].id;
        self.tracks
            .iter()
            .find(|t| {
                t.id != own
                    && t.is_live()
                    && t.net == removed.net
                    && t.layer == removed.layer
                    && (t.start == at || t.end == at)
            })
            .map_or(Anchor::None, |t| Anchor::Track(t.id))
    }

    /// First pad on any of `layers` covering `pos`.
    pub fn pad_at(&self, pos: Point, layers: LayerSet) -> Option<&Pad> {
        self.pads
            .iter()
            .find(|pad| pad.layers.intersects(layers) && pad.hit_test(pos))
    }

    /// First live track on any of `layers` covering `pos`.
    pub fn track_at(&self, pos: Point, layers: LayerSet) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.is_live() && layers.contains(t.layer) && t.hit_test(pos))
    }

    /// Connectable item under `pos`. Pads take precedence over tracks.
    pub fn find_lock_point(&self, pos: Point, layers: LayerSet) -> Option<LockPoint> {
        if let Some(pad) = self.pad_at(pos, layers) {
            return Some(LockPoint::Pad(pad.id));
        }
        self.track_at(pos, layers).map(|t| LockPoint::Track(t.id))
    }

    /// Net of the first filled zone covering `pos` on `layer`.
    pub fn filled_zone_at(&self, pos: Point, layer: LayerId) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|zone| zone.hit_test_filled_area(pos, layer))
    }

    /// Where a lock point on `track` near `pos` would land: the endpoint when
    /// `pos` is one, otherwise the nearest grid point on the segment.
    pub fn lock_point_position(&self, pos: Point, track: TrackId) -> Option<Point> {
        let t = self.track(track)?;
        if pos == t.start || pos == t.end {
            return Some(pos);
        }
        Some(project_onto_segment(pos, t.start, t.end))
    }

    /// Make `pos` a connection point of `track`, splitting the segment in
    /// two when `pos` is not already one of its endpoints.
    ///
    /// Returns the id of the segment that now ends at `pos` (or the
    /// untouched segment when no split was needed). The second half is
    /// inserted right after the first and takes over the original end.
    pub fn create_lock_point(&mut self, pos: Point, track: TrackId) -> Option<TrackId> {
        let index = self.track_index(track)?;
        let original = self.tracks[index].clone();

        if pos == original.start || pos == original.end {
            return Some(track);
        }

        let mut tail = original.clone();
        tail.start = pos;
        tail.start_anchor = Anchor::Track(track);
        tail.state.begin_on_pad = false;
        tail.id = self.next_track_id();
        let tail_id = tail.id;

        {
            let head = &mut self.tracks[index];
            head.end = pos;
            head.end_anchor = Anchor::Track(tail_id);
            head.state.end_on_pad = false;
        }

        // Whatever hung off the original end now hangs off the second half.
        for other in &mut self.tracks {
            if other.start_anchor == Anchor::Track(track) && other.start == original.end {
                other.start_anchor = Anchor::Track(tail_id);
            }
            if other.end_anchor == Anchor::Track(track) && other.end == original.end {
                other.end_anchor = Anchor::Track(tail_id);
            }
        }

        self.tracks.insert(index + 1, tail);
        debug!("Split {track} at {pos}, new segment {tail_id}");
        Some(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn board_with_nets() -> Board {
        let mut board = Board::new();
        board.add_track(p(0, 0), p(100, 0), LayerId::F_CU, 10, NetCode(3));
        board.add_track(p(0, 50), p(100, 50), LayerId::F_CU, 10, NetCode(1));
        board.add_track(p(0, 90), p(100, 90), LayerId::F_CU, 10, NetCode(5));
        board
    }

    #[test]
    fn tracks_stay_grouped_by_net() {
        let board = board_with_nets();
        let nets: Vec<u32> = board.tracks().iter().map(|t| t.net.0).collect();
        assert_eq!(nets, vec![1, 3, 5]);
        assert_eq!(board.best_insert_point(NetCode(3)), 1);
        assert_eq!(board.best_insert_point(NetCode(4)), 2);
        assert_eq!(board.best_insert_point(NetCode(9)), 3);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let board = board_with_nets();
        let mut ids: Vec<u32> = board.tracks().iter().map(|t| t.id.0).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(board.next_track_id(), TrackId(4));
    }

    #[test]
    fn pads_win_over_tracks() {
        let mut board = board_with_nets();
        let pad = board.add_pad(p(100, 0), 20, 20, NetCode(3), LayerSet::all_copper());
        let layers = LayerSet::single(LayerId::F_CU);

        assert_eq!(board.find_lock_point(p(100, 0), layers), Some(LockPoint::Pad(pad)));
        assert_eq!(
            board.find_lock_point(p(50, 2), layers),
            Some(LockPoint::Track(TrackId(1)))
        );
        assert_eq!(board.find_lock_point(p(50, 20), layers), None);
        assert_eq!(
            board.find_lock_point(p(50, 2), LayerSet::single(LayerId::B_CU)),
            None
        );
    }

    #[test]
    fn lock_point_splits_track() {
        let mut board = Board::new();
        let id = board.add_track(p(0, 0), p(100, 0), LayerId::F_CU, 10, NetCode(2));
        let at = board.lock_point_position(p(40, 3), id).unwrap();
        assert_eq!(at, p(40, 0));

        let locked = board.create_lock_point(at, id).unwrap();
        assert_eq!(locked, id);
        assert_eq!(board.tracks().len(), 2);

        let head = board.track(id).unwrap();
        assert_eq!((head.start, head.end), (p(0, 0), p(40, 0)));
        let tail_id = match head.end_anchor {
            Anchor::Track(tail) => tail,
            other => panic!("unexpected anchor {other:?}"),
        };
        let tail = board.track(tail_id).unwrap();
        assert_eq!((tail.start, tail.end), (p(40, 0), p(100, 0)));
        assert_eq!(tail.start_anchor, Anchor::Track(id));
    }

    #[test]
    fn lock_point_on_endpoint_does_not_split() {
        let mut board = Board::new();
        let id = board.add_track(p(0, 0), p(100, 0), LayerId::F_CU, 10, NetCode(2));
        assert_eq!(board.create_lock_point(p(100, 0), id), Some(id));
        assert_eq!(board.tracks().len(), 1);
        assert_eq!(board.create_lock_point(p(0, 0), TrackId(99)), None);
    }

    #[test]
    fn split_reattaches_downstream_track() {
        let mut board = Board::new();
        let a = board.add_track(p(0, 0), p(100, 0), LayerId::F_CU, 10, NetCode(2));
        let b = board.add_track(p(100, 0), p(100, 100), LayerId::F_CU, 10, NetCode(2));
        board.track_mut(b).unwrap().start_anchor = Anchor::Track(a);

        board.create_lock_point(p(50, 0), a);
        let tail = board
            .tracks()
            .iter()
            .find(|t| t.start == p(50, 0))
            .unwrap()
            .id;
        assert_eq!(board.track(b).unwrap().start_anchor, Anchor::Track(tail));
    }

    #[test]
    fn remove_detaches_references() {
        let mut board = Board::new();
        let a = board.add_track(p(0, 0), p(100, 0), LayerId::F_CU, 10, NetCode(2));
        let b = board.add_track(p(100, 0), p(100, 100), LayerId::F_CU, 10, NetCode(2));
        board.track_mut(b).unwrap().start_anchor = Anchor::Track(a);

        assert!(board.remove_track(a).is_some());
        assert!(board.remove_track(a).is_none());
        assert_eq!(board.track(b).unwrap().start_anchor, Anchor::None);
    }

    #[test]
    fn remove_reanchors_to_a_track_at_the_same_point() {
        let mut board = Board::new();
        let a = board.add_track(p(0, 0), p(100, 0), LayerId::F_CU, 10, NetCode(2));
        let b = board.add_track(p(100, 0), p(200, 0), LayerId::F_CU, 10, NetCode(2));
        let c = board.add_track(p(100, 100), p(100, 0), LayerId::F_CU, 10, NetCode(2));
        board.track_mut(b).unwrap().start_anchor = Anchor::Track(a);
        board.track_mut(c).unwrap().end_anchor = Anchor::Track(a);

        board.remove_track(a);
        assert_eq!(board.track(b).unwrap().start_anchor, Anchor::Track(c));
        assert_eq!(board.track(c).unwrap().end_anchor, Anchor::Track(b));
    }

    #[test]
    fn zone_supplies_net() {
        let mut board = Board::new();
        board.add_zone(Zone {
            net: NetCode(7),
            layer: LayerId::B_CU,
            outline: vec![p(0, 0), p(1000, 0), p(1000, 1000), p(0, 1000)],
            filled: true,
        });
        assert_eq!(
            board.filled_zone_at(p(500, 500), LayerId::B_CU).map(|z| z.net),
            Some(NetCode(7))
        );
        assert!(board.filled_zone_at(p(500, 500), LayerId::F_CU).is_none());
    }

    #[test]
    fn json_round_trip_preserves_board() {
        let mut board = board_with_nets();
        board.add_pad(p(0, 0), 30, 30, NetCode(3), LayerSet::single(LayerId::F_CU));
        let json = board.to_json().unwrap();
        let back = Board::from_json(&json).unwrap();
        assert_eq!(back, board);
    }
}
