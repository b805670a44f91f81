//! A single route from its first click to commit or abort.
//!
//! The session owns the in-progress [`SegmentChain`]. It reads the board on
//! every step but only writes to it in [`RouteSession::end`], after every
//! check has passed, so dropping a session never leaves a trace.

use copperpath_board::{
    Anchor, LayerId, LayerSet, LockPoint, NetCode, PadId, Track, TrackId, TrackState,
};
use copperpath_geom::{snap_direction, Point};
use log::{debug, info, warn};
use serde::Serialize;

use crate::board::BoardQuery;
use crate::chain::{Link, RouteSegment, SegmentChain};
use crate::drc::ClearanceCheck;
use crate::error::RouteError;
use crate::intrusion::push_out_of_intrusion;
use crate::settings::RouteSettings;

/// What the first point of a route was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAnchor {
    /// Nothing under the cursor: the route has no net.
    Floating,
    Pad(PadId),
    /// A point on an existing track. The track is split there on commit.
    Track { track: TrackId, at: Point },
    /// Inside a filled zone, which only contributes its net.
    Zone(NetCode),
}

/// Board changes made by a committed route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub net: NetCode,
    /// New tracks in route order.
    pub inserted: Vec<TrackId>,
    /// Old tracks deleted as redundant.
    pub removed: Vec<TrackId>,
}

#[derive(Debug, Clone)]
pub struct RouteSession {
    chain: SegmentChain,
    net: NetCode,
    start: StartAnchor,
    alternate_posture: bool,
    cursor: Point,
}

impl RouteSession {
    /// Start a route at `cursor`, attaching to whatever lies under it on
    /// the active layer.
    pub fn begin<B: BoardQuery + ?Sized>(
        board: &B,
        settings: &RouteSettings,
        cursor: Point,
        alternate_posture: bool,
    ) -> Self {
        let layer = settings.active_layer;
        let policies = settings.policies;

        let mut at = cursor;
        let mut connected_width = None;
        let (start, net) = match board.find_lock_point(cursor, LayerSet::single(layer)) {
            Some(LockPoint::Pad(id)) => match board.pad(id) {
                Some(pad) => {
                    at = pad.position;
                    (StartAnchor::Pad(id), pad.net)
                }
                None => (StartAnchor::Floating, NetCode::UNCONNECTED),
            },
            Some(LockPoint::Track(id)) => {
                match (board.track(id), board.lock_point_position(cursor, id)) {
                    (Some(track), Some(lock)) => {
                        at = lock;
                        connected_width = Some(track.width);
                        (StartAnchor::Track { track: id, at: lock }, track.net)
                    }
                    _ => (StartAnchor::Floating, NetCode::UNCONNECTED),
                }
            }
            None => match board.filled_zone_net(cursor, layer) {
                Some(net) => (StartAnchor::Zone(net), net),
                None => (StartAnchor::Floating, NetCode::UNCONNECTED),
            },
        };

        let width = match connected_width {
            Some(width) if policies.use_connected_track_width => width,
            _ => settings.track_width(net),
        };

        let mut head = RouteSegment::new(at, layer, width, net);
        match start {
            StartAnchor::Pad(id) => {
                head.start_link = Link::Pad(id);
                head.begin_on_pad = true;
            }
            StartAnchor::Track { track, .. } => head.start_link = Link::Track(track),
            StartAnchor::Floating | StartAnchor::Zone(_) => {}
        }

        let mut chain = SegmentChain::with_head(head);
        if policies.use_two_segment_tracks {
            if let Some(second) = chain.clone_tail() {
                chain.push_back(second);
            }
        }

        debug!("Route begins at {at} on {layer}, {net}, anchor {start:?}");

        Self {
            chain,
            net,
            start,
            alternate_posture,
            cursor,
        }
    }

    pub fn net(&self) -> NetCode {
        self.net
    }

    pub fn start_anchor(&self) -> StartAnchor {
        self.start
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    /// Last cursor position fed to the session.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn alternate_posture(&self) -> bool {
        self.alternate_posture
    }

    pub fn set_alternate_posture(&mut self, alternate: bool) {
        self.alternate_posture = alternate;
    }

    /// Follow the cursor: refresh the design parameters of the moving
    /// segments and recompute the tail geometry.
    pub fn update<B: BoardQuery + ?Sized>(
        &mut self,
        board: &B,
        settings: &RouteSettings,
        cursor: Point,
    ) {
        self.cursor = cursor;
        let policies = settings.policies;
        let layer = settings.active_layer;
        let width = settings.track_width(self.net);

        let refresh = |segment: &mut RouteSegment| {
            segment.layer = layer;
            if !policies.use_connected_track_width {
                segment.width = width;
            }
        };
        if let Some(tail) = self.chain.tail_mut() {
            refresh(tail);
        }
        if policies.use_two_segment_tracks {
            if let Some(previous) = self.chain.previous_mut() {
                refresh(previous);
            }
        }

        let Some(tail) = self.chain.tail() else {
            return;
        };

        if policies.use_45_degree_tracks && policies.use_two_segment_tracks {
            let end = self.pushed(board, settings, cursor).unwrap_or(cursor);
            self.compute_break_point(end);
        } else if policies.use_45_degree_tracks {
            let start = tail.start;
            let snapped = snap_direction(start, cursor);
            // A pushed endpoint is snapped again so the tail keeps its angle.
            let end = match self.pushed(board, settings, snapped) {
                Some(pushed) => snap_direction(start, pushed),
                None => snapped,
            };
            if let Some(tail) = self.chain.tail_mut() {
                tail.end = end;
            }
        } else {
            let end = self.pushed(board, settings, cursor).unwrap_or(cursor);
            if let Some(tail) = self.chain.tail_mut() {
                tail.end = end;
            }
        }

        self.chain.debug_verify();
    }

    fn pushed<B: BoardQuery + ?Sized>(
        &self,
        board: &B,
        settings: &RouteSettings,
        cursor: Point,
    ) -> Option<Point> {
        if !settings.policies.drc_on {
            return None;
        }
        let tail = self.chain.tail()?;
        push_out_of_intrusion(
            board.tracks(),
            tail,
            settings.active_layer,
            cursor,
            &settings.net_classes,
        )
    }

    /// Place the bend between the two moving segments so that one is
    /// horizontal or vertical and the other at 45°, ending at `end`.
    fn compute_break_point(&mut self, end: Point) {
        let n = self.chain.len();
        let Some(previous) = self.chain.previous().cloned() else {
            if let Some(tail) = self.chain.tail_mut() {
                tail.end = end;
            }
            return;
        };

        let origin = previous.start;
        let (ox, oy) = (origin.x as i64, origin.y as i64);
        let (ex, ey) = (end.x as i64, end.y as i64);
        let dx = (ex - ox).abs();
        let dy = (ey - oy).abs();

        let diagonal_first = match n.checked_sub(3).and_then(|i| self.chain.get(i)) {
            Some(fixed) => fixed.vector().is_axis_aligned() && !self.alternate_posture,
            None => self.alternate_posture,
        };

        let mut bend = if diagonal_first {
            let d = dx.min(dy);
            let sx = if ex < ox { -d } else { d };
            let sy = if ey < oy { -d } else { d };
            Point::from_wide(ox + sx, oy + sy)
        } else if dx >= dy {
            let x = if ex < ox { ex + dy } else { ex - dy };
            Point::from_wide(x, oy)
        } else {
            let y = if ey < oy { ey + dx } else { ey - dx };
            Point::from_wide(ox, y)
        };
        if bend == origin {
            bend = end;
        }

        if let Some(previous) = self.chain.previous_mut() {
            previous.end = bend;
        }
        if let Some(tail) = self.chain.tail_mut() {
            tail.start = bend;
            tail.end = end;
        }
    }

    /// Fix the current segment and start a new one at its end.
    ///
    /// Returns `Ok(false)` when there is nothing to fix yet. A clearance
    /// violation rejects the click without changing the session.
    pub fn commit_segment<B, C>(
        &mut self,
        board: &B,
        settings: &RouteSettings,
        checker: &C,
    ) -> Result<bool, RouteError>
    where
        B: BoardQuery + ?Sized,
        C: ClearanceCheck,
    {
        let policies = settings.policies;
        let Some(tail) = self.chain.tail() else {
            return Ok(false);
        };

        if policies.drc_on {
            checker.check(tail, board, &settings.net_classes)?;
            if policies.use_two_segment_tracks {
                if let Some(previous) = self.chain.previous() {
                    checker.check(previous, board, &settings.net_classes)?;
                }
            }
        }

        let can_create = if policies.use_two_segment_tracks {
            !(tail.is_null() && self.chain.previous().map_or(false, RouteSegment::is_null))
        } else {
            !tail.is_null()
        };
        if !can_create {
            return Ok(false);
        }

        if policies.auto_45_corners && self.add_corner(board, settings, checker) {
            debug!("Inserted 45° corner, route now has {} segments", self.chain.len());
        }

        if let Some(mut next) = self.chain.clone_tail() {
            next.start = next.end;
            next.layer = settings.active_layer;
            if !policies.use_connected_track_width {
                next.width = settings.track_width(self.net);
            }
            self.chain.push_back(next);
        }

        debug!("Segment fixed, route now has {} segments", self.chain.len());
        Ok(true)
    }

    /// Cut the right angle between the two last segments with a 45° leg.
    fn add_corner<B, C>(&mut self, board: &B, settings: &RouteSettings, checker: &C) -> bool
    where
        B: BoardQuery + ?Sized,
        C: ClearanceCheck,
    {
        let (Some(previous), Some(current)) = (self.chain.previous(), self.chain.tail()) else {
            return false;
        };

        let step = settings.corner_step(current.width);
        let v0 = previous.vector();
        let v1 = current.vector();
        let long_enough = |v: Point| v.x.abs().max(v.y.abs()) >= 2 * step;
        if !long_enough(v0) || !long_enough(v1) {
            return false;
        }

        let (start, end) = if v0.x == 0 && v1.y == 0 {
            (
                previous.end - Point::new(0, v0.y.signum() * step),
                current.start + Point::new(v1.x.signum() * step, 0),
            )
        } else if v0.y == 0 && v1.x == 0 {
            (
                previous.end - Point::new(v0.x.signum() * step, 0),
                current.start + Point::new(0, v1.y.signum() * step),
            )
        } else {
            return false;
        };

        let mut corner = current.detached_clone();
        corner.start = start;
        corner.end = end;

        if settings.policies.drc_on
            && checker
                .check(&corner, board, &settings.net_classes)
                .is_err()
        {
            return false;
        }

        let n = self.chain.len();
        if let Some(previous) = self.chain.previous_mut() {
            previous.end = start;
        }
        if let Some(current) = self.chain.tail_mut() {
            current.start = end;
        }
        self.chain.insert_before(n - 1, corner);
        true
    }

    /// Append a segment to the centre of `pad` unless the route already
    /// ends there, and mark the end as on the pad.
    fn ensure_end_on_pad(&mut self, pad: PadId, position: Point) {
        let Some(tail) = self.chain.tail() else {
            return;
        };

        if tail.end != position && !tail.is_null() {
            if let Some(mut next) = self.chain.clone_tail() {
                next.start = next.end;
                self.chain.push_back(next);
            }
        }

        if let Some(tail) = self.chain.tail_mut() {
            tail.end = position;
            tail.end_link = Link::Pad(pad);
            tail.end_on_pad = true;
        }
    }

    /// Finish the route and splice it into the board.
    ///
    /// On a clearance violation the board and the session are unchanged
    /// and the route can continue. On success the chain has been consumed
    /// and the session should be dropped.
    pub fn end<B, C>(
        &mut self,
        board: &mut B,
        settings: &RouteSettings,
        checker: &C,
    ) -> Result<CommitOutcome, RouteError>
    where
        B: BoardQuery + ?Sized,
        C: ClearanceCheck,
    {
        let policies = settings.policies;
        let layer = settings.active_layer;

        if policies.drc_on {
            if let Some(tail) = self.chain.tail() {
                checker.check(tail, &*board, &settings.net_classes)?;
            }
        }
        self.commit_segment(&*board, settings, checker)?;

        let Some(position) = self.chain.tail().map(|tail| tail.end) else {
            return Ok(self.empty_outcome());
        };

        let mut end_lock = None;
        match board.find_lock_point(position, LayerSet::single(layer)) {
            Some(LockPoint::Pad(id)) => {
                if let Some(pad_position) = board.pad(id).map(|pad| pad.position) {
                    self.ensure_end_on_pad(id, pad_position);
                }
            }
            Some(LockPoint::Track(id)) => {
                if let Some(lock) = board.lock_point_position(position, id) {
                    if let Some(tail) = self.chain.tail_mut() {
                        tail.end = lock;
                    }
                    end_lock = Some(lock);
                }
            }
            None => {}
        }

        let start_link = self
            .chain
            .head()
            .map_or(Link::Unattached, |head| head.start_link);
        let stripped = self
            .chain
            .strip_null_segments(start_link, |p, l| board.find_pad(p, l));
        if stripped > 0 {
            debug!("Dropped {stripped} null segments");
        }

        if self.chain.is_empty() {
            info!("Route on {} ended with no copper", self.net);
            return Ok(self.empty_outcome());
        }

        if let StartAnchor::Track { track, at } = self.start {
            if board.create_lock_point(at, track).is_none() {
                warn!("Start track {track} is gone, leaving route start unattached");
                if let Some(head) = self.chain.head_mut() {
                    head.start_link = Link::Unattached;
                }
            }
        }

        if let Some(lock) = end_lock {
            let target = match board.find_lock_point(lock, LayerSet::single(layer)) {
                Some(LockPoint::Track(id)) => board.create_lock_point(lock, id),
                _ => None,
            };
            match (target, self.chain.tail_mut()) {
                (Some(id), Some(tail)) if tail.end == lock => tail.end_link = Link::Track(id),
                _ => warn!("No track left to lock the route end at {lock}"),
            }
        }

        let segments = std::mem::take(&mut self.chain).into_segments();
        let outcome = self.splice(board, settings, &segments);
        info!(
            "Committed route on {}: {} tracks inserted, {} removed",
            outcome.net,
            outcome.inserted.len(),
            outcome.removed.len()
        );
        Ok(outcome)
    }

    /// Insert the route into the board's track list, resolve its links and
    /// delete the old path it replaces.
    fn splice<B: BoardQuery + ?Sized>(
        &self,
        board: &mut B,
        settings: &RouteSettings,
        segments: &[RouteSegment],
    ) -> CommitOutcome {
        let before = board.best_insert_point(self.net);
        let inserted: Vec<TrackId> = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let mut track = Track::new(
                    segment.start,
                    segment.end,
                    segment.layer,
                    segment.width,
                    segment.net,
                );
                track.state = TrackState {
                    begin_on_pad: segment.begin_on_pad,
                    end_on_pad: segment.end_on_pad,
                    ..TrackState::default()
                };
                board.insert_track(track, before + i)
            })
            .collect();

        let resolve = |link: Link| match link {
            Link::Unattached => Anchor::None,
            Link::Pad(id) => Anchor::Pad(id),
            Link::Track(id) => Anchor::Track(id),
            Link::Segment(i) => inserted.get(i).map_or(Anchor::None, |&id| Anchor::Track(id)),
        };
        for (segment, &id) in segments.iter().zip(&inserted) {
            if let Some(track) = board.track_mut(id) {
                track.start_anchor = resolve(segment.start_link);
                track.end_anchor = resolve(segment.end_link);
            }
        }

        let removed = if settings.policies.auto_delete_old_track {
            self.delete_redundant(board, segments, &inserted)
        } else {
            Vec::new()
        };

        CommitOutcome {
            net: self.net,
            inserted,
            removed,
        }
    }

    fn delete_redundant<B: BoardQuery + ?Sized>(
        &self,
        board: &mut B,
        segments: &[RouteSegment],
        inserted: &[TrackId],
    ) -> Vec<TrackId> {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Vec::new();
        };
        if first.start_link == Link::Unattached || last.end_link == Link::Unattached {
            return Vec::new();
        }

        let layer: LayerId = first.layer;
        let Some(path) = board.redundant_path(self.net, layer, first.start, last.end, inserted)
        else {
            return Vec::new();
        };

        path.into_iter()
            .filter(|&id| board.remove_track(id).is_some())
            .inspect(|id| debug!("Deleted redundant track {id}"))
            .collect()
    }

    fn empty_outcome(&self) -> CommitOutcome {
        CommitOutcome {
            net: self.net,
            ..CommitOutcome::default()
        }
    }

    /// Drop the route. The board was never touched.
    pub fn abort(self) {
        debug!(
            "Route on {} aborted with {} segments",
            self.net,
            self.chain.len()
        );
    }
}
