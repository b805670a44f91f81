//! The board operations a route session needs.

use copperpath_board::{
    Board, LayerId, LayerSet, LockPoint, NetCode, Pad, PadId, Track, TrackId,
};
use copperpath_geom::Point;

/// Read access to committed copper plus the few mutations performed when a
/// route is committed.
///
/// Nothing on this trait is called with `&mut self` before the route is
/// ended, so a session that is aborted leaves the board untouched.
pub trait BoardQuery {
    fn tracks(&self) -> &[Track];

    fn pads(&self) -> &[Pad];

    fn track(&self, id: TrackId) -> Option<&Track>;

    fn pad(&self, id: PadId) -> Option<&Pad>;

    /// Pad or track under `position` on any of `layers`. Pads win.
    fn find_lock_point(&self, position: Point, layers: LayerSet) -> Option<LockPoint>;

    fn find_pad(&self, position: Point, layer: LayerId) -> Option<PadId>;

    /// Net of a filled zone covering `position`.
    fn filled_zone_net(&self, position: Point, layer: LayerId) -> Option<NetCode>;

    /// Where a lock point on `track` near `position` would land.
    fn lock_point_position(&self, position: Point, track: TrackId) -> Option<Point>;

    /// Split `track` at `position` if needed; returns the segment ending there.
    fn create_lock_point(&mut self, position: Point, track: TrackId) -> Option<TrackId>;

    fn best_insert_point(&self, net: NetCode) -> usize;

    fn insert_track(&mut self, track: Track, before: usize) -> TrackId;

    fn track_mut(&mut self, id: TrackId) -> Option<&mut Track>;

    fn redundant_path(
        &self,
        net: NetCode,
        layer: LayerId,
        from: Point,
        to: Point,
        exclude: &[TrackId],
    ) -> Option<Vec<TrackId>>;

    fn remove_track(&mut self, id: TrackId) -> Option<Track>;
}

impl BoardQuery for Board {
    fn tracks(&self) -> &[Track] {
        Board::tracks(self)
    }

    fn pads(&self) -> &[Pad] {
        Board::pads(self)
    }

    fn track(&self, id: TrackId) -> Option<&Track> {
        Board::track(self, id)
    }

    fn pad(&self, id: PadId) -> Option<&Pad> {
        Board::pad(self, id)
    }

    fn find_lock_point(&self, position: Point, layers: LayerSet) -> Option<LockPoint> {
        Board::find_lock_point(self, position, layers)
    }

    fn find_pad(&self, position: Point, layer: LayerId) -> Option<PadId> {
        self.pad_at(position, LayerSet::single(layer)).map(|pad| pad.id)
    }

    fn filled_zone_net(&self, position: Point, layer: LayerId) -> Option<NetCode> {
        self.filled_zone_at(position, layer).map(|zone| zone.net)
    }

    fn lock_point_position(&self, position: Point, track: TrackId) -> Option<Point> {
        Board::lock_point_position(self, position, track)
    }

    fn create_lock_point(&mut self, position: Point, track: TrackId) -> Option<TrackId> {
        Board::create_lock_point(self, position, track)
    }

    fn best_insert_point(&self, net: NetCode) -> usize {
        Board::best_insert_point(self, net)
    }

    fn insert_track(&mut self, track: Track, before: usize) -> TrackId {
        Board::insert_track(self, track, before)
    }

    fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        Board::track_mut(self, id)
    }

    fn redundant_path(
        &self,
        net: NetCode,
        layer: LayerId,
        from: Point,
        to: Point,
        exclude: &[TrackId],
    ) -> Option<Vec<TrackId>> {
        Board::redundant_path(self, net, layer, from, to, exclude)
    }

    fn remove_track(&mut self, id: TrackId) -> Option<Track> {
        Board::remove_track(self, id)
    }
}
