//! The ordered segment chain of a route in progress.
//!
//! Segments live in a vector in physical order. Neighbours refer to each
//! other through [`Link::Segment`] indices rather than pointers, and the
//! last segment is the one that follows the cursor.

use copperpath_board::{LayerId, NetCode, PadId, TrackId};
use copperpath_geom::Point;
use itertools::Itertools;

use crate::error::ChainError;

/// What an endpoint of a [`RouteSegment`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Link {
    #[default]
    Unattached,
    Pad(PadId),
    /// A committed board track.
    Track(TrackId),
    /// Another segment of the same chain, by index.
    Segment(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSegment {
    pub start: Point,
    pub end: Point,
    pub layer: LayerId,
    pub width: i32,
    pub net: NetCode,
    pub start_link: Link,
    pub end_link: Link,
    pub begin_on_pad: bool,
    pub end_on_pad: bool,
}

impl RouteSegment {
    /// A zero-length, unattached segment at `at`.
    pub fn new(at: Point, layer: LayerId, width: i32, net: NetCode) -> Self {
        Self {
            start: at,
            end: at,
            layer,
            width,
            net,
            start_link: Link::Unattached,
            end_link: Link::Unattached,
            begin_on_pad: false,
            end_on_pad: false,
        }
    }

    pub fn is_null(&self) -> bool {
        self.start == self.end
    }

    pub fn vector(&self) -> Point {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    /// Copy of the geometry and design parameters, without links or pad
    /// flags.
    pub fn detached_clone(&self) -> Self {
        Self {
            start_link: Link::Unattached,
            end_link: Link::Unattached,
            begin_on_pad: false,
            end_on_pad: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentChain {
    segments: Vec<RouteSegment>,
}

impl SegmentChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head(head: RouteSegment) -> Self {
        Self {
            segments: vec![head],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteSegment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&RouteSegment> {
        self.segments.get(index)
    }

    /// Geometry edits through this accessor are not checked until the next
    /// structural mutation or [`SegmentChain::verify_integrity`].
    pub fn get_mut(&mut self, index: usize) -> Option<&mut RouteSegment> {
        self.segments.get_mut(index)
    }

    pub fn head(&self) -> Option<&RouteSegment> {
        self.segments.first()
    }

    pub fn head_mut(&mut self) -> Option<&mut RouteSegment> {
        self.segments.first_mut()
    }

    /// The current segment.
    pub fn tail(&self) -> Option<&RouteSegment> {
        self.segments.last()
    }

    pub fn tail_mut(&mut self) -> Option<&mut RouteSegment> {
        self.segments.last_mut()
    }

    /// The segment before the tail.
    pub fn previous(&self) -> Option<&RouteSegment> {
        let n = self.segments.len();
        if n < 2 {
            return None;
        }
        self.segments.get(n - 2)
    }

    pub fn previous_mut(&mut self) -> Option<&mut RouteSegment> {
        let n = self.segments.len();
        if n < 2 {
            return None;
        }
        self.segments.get_mut(n - 2)
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(RouteSegment::length).sum()
    }

    /// Append `segment` as the new tail, linked to the old one. Returns its
    /// index.
    pub fn push_back(&mut self, mut segment: RouteSegment) -> usize {
        let index = self.segments.len();
        if let Some(last) = self.segments.last_mut() {
            last.end_link = Link::Segment(index);
            segment.start_link = Link::Segment(index - 1);
        }
        self.segments.push(segment);
        self.debug_verify();
        index
    }

    /// Insert `segment` in front of the segment at `index`.
    pub fn insert_before(&mut self, index: usize, segment: RouteSegment) -> usize {
        if index >= self.segments.len() {
            return self.push_back(segment);
        }
        self.segments.insert(index, segment);
        self.relink();
        self.debug_verify();
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<RouteSegment> {
        if index >= self.segments.len() {
            return None;
        }
        let removed = self.segments.remove(index);
        self.relink();
        self.debug_verify();
        Some(removed)
    }

    /// Detached copy of the tail, ready to be pushed as a new segment.
    pub fn clone_tail(&self) -> Option<RouteSegment> {
        self.tail().map(RouteSegment::detached_clone)
    }

    /// Drop every null segment.
    ///
    /// Pad flags and links are rebuilt from scratch: the head starts from
    /// `start_link` and every segment end that `pad_at` reports on a pad is
    /// attached to it, on both sides of the boundary. Returns the number of
    /// segments removed.
    pub fn strip_null_segments<F>(&mut self, start_link: Link, pad_at: F) -> usize
    where
        F: Fn(Point, LayerId) -> Option<PadId>,
    {
        let before = self.segments.len();
        self.segments.retain(|segment| !segment.is_null());
        let removed = before - self.segments.len();

        if self.segments.is_empty() {
            return removed;
        }

        for segment in &mut self.segments {
            segment.start_link = Link::Unattached;
            segment.end_link = Link::Unattached;
            segment.begin_on_pad = false;
            segment.end_on_pad = false;
        }
        self.relink();

        if let Some(head) = self.segments.first_mut() {
            head.start_link = start_link;
            head.begin_on_pad = matches!(start_link, Link::Pad(_));
        }

        for index in 0..self.segments.len() {
            let (end, layer) = (self.segments[index].end, self.segments[index].layer);
            let Some(pad) = pad_at(end, layer) else {
                continue;
            };
            self.segments[index].end_link = Link::Pad(pad);
            self.segments[index].end_on_pad = true;
            if let Some(next) = self.segments.get_mut(index + 1) {
                next.start_link = Link::Pad(pad);
                next.begin_on_pad = true;
            }
        }

        self.debug_verify();
        removed
    }

    /// Check that the chain is geometrically continuous and that segment
    /// links only point at direct neighbours.
    pub fn verify_integrity(&self) -> Result<(), ChainError> {
        for (index, (prev, segment)) in self.segments.iter().tuple_windows().enumerate() {
            if segment.start != prev.end {
                return Err(ChainError::Disconnected {
                    index: index + 1,
                    start: segment.start,
                    previous_end: prev.end,
                });
            }
        }

        for (index, segment) in self.segments.iter().enumerate() {
            if let Link::Segment(target) = segment.start_link {
                if target + 1 != index {
                    return Err(ChainError::BadLink { index, target });
                }
            }
            if let Link::Segment(target) = segment.end_link {
                if target != index + 1 || target >= self.segments.len() {
                    return Err(ChainError::BadLink { index, target });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn debug_verify(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.verify_integrity() {
                panic!("route chain corrupted: {err}");
            }
        }
    }

    pub fn into_segments(self) -> Vec<RouteSegment> {
        self.segments
    }

    /// Every boundary between two segments is a segment-to-segment link.
    fn relink(&mut self) {
        for index in 1..self.segments.len() {
            self.segments[index - 1].end_link = Link::Segment(index);
            self.segments[index].start_link = Link::Segment(index - 1);
        }
        if let Some(last) = self.segments.last_mut() {
            if matches!(last.end_link, Link::Segment(_)) {
                last.end_link = Link::Unattached;
            }
        }
        if let Some(first) = self.segments.first_mut() {
            if matches!(first.start_link, Link::Segment(_)) {
                first.start_link = Link::Unattached;
            }
        }
    }
}

impl<'a> IntoIterator for &'a SegmentChain {
    type Item = &'a RouteSegment;
    type IntoIter = std::slice::Iter<'a, RouteSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: (i32, i32), end: (i32, i32)) -> RouteSegment {
        RouteSegment {
            end: end.into(),
            ..RouteSegment::new(start.into(), LayerId::F_CU, 10, NetCode(1))
        }
    }

    fn links(chain: &SegmentChain) -> Vec<(Link, Link)> {
        chain.iter().map(|s| (s.start_link, s.end_link)).collect()
    }

    #[test]
    fn push_back_links_neighbours() {
        let mut chain = SegmentChain::with_head(seg((0, 0), (10, 0)));
        assert_eq!(chain.push_back(seg((10, 0), (10, 10))), 1);
        assert_eq!(chain.push_back(seg((10, 10), (10, 10))), 2);

        assert_eq!(
            links(&chain),
            vec![
                (Link::Unattached, Link::Segment(1)),
                (Link::Segment(0), Link::Segment(2)),
                (Link::Segment(1), Link::Unattached),
            ]
        );
        assert_eq!(chain.previous().map(|s| s.end), Some(Point::new(10, 10)));
        assert_eq!(chain.total_length(), 20.0);
    }

    #[test]
    fn insert_before_and_remove_keep_indices_adjacent() {
        let mut chain = SegmentChain::with_head(seg((0, 0), (10, 0)));
        chain.push_back(seg((10, 0), (20, 0)));
        chain.insert_before(1, seg((10, 0), (10, 0)));

        assert_eq!(chain.len(), 3);
        assert!(chain.verify_integrity().is_ok());
        assert_eq!(chain.get(2).map(|s| s.start_link), Some(Link::Segment(1)));

        chain.remove(1);
        assert_eq!(
            links(&chain),
            vec![
                (Link::Unattached, Link::Segment(1)),
                (Link::Segment(0), Link::Unattached),
            ]
        );
    }

    #[test]
    fn clone_tail_drops_links_and_flags() {
        let mut head = seg((0, 0), (10, 0));
        head.start_link = Link::Pad(PadId(3));
        head.begin_on_pad = true;
        let chain = SegmentChain::with_head(head);

        let clone = chain.clone_tail().unwrap();
        assert_eq!(clone.start_link, Link::Unattached);
        assert!(!clone.begin_on_pad);
        assert_eq!((clone.start, clone.end), (Point::new(0, 0), Point::new(10, 0)));
    }

    #[test]
    fn detects_disconnected_segments() {
        let mut chain = SegmentChain::with_head(seg((0, 0), (10, 0)));
        chain.push_back(seg((10, 0), (20, 0)));
        chain.get_mut(1).unwrap().start = Point::new(11, 0);

        assert_eq!(
            chain.verify_integrity(),
            Err(ChainError::Disconnected {
                index: 1,
                start: Point::new(11, 0),
                previous_end: Point::new(10, 0),
            })
        );
    }

    #[test]
    fn detects_links_to_non_neighbours() {
        let mut chain = SegmentChain::with_head(seg((0, 0), (10, 0)));
        chain.push_back(seg((10, 0), (20, 0)));
        chain.push_back(seg((20, 0), (30, 0)));
        chain.get_mut(0).unwrap().end_link = Link::Segment(2);

        assert_eq!(
            chain.verify_integrity(),
            Err(ChainError::BadLink {
                index: 0,
                target: 2
            })
        );
    }

    #[test]
    fn strip_null_segments_rederives_pads() {
        let mut chain = SegmentChain::with_head(seg((0, 0), (0, 0)));
        chain.push_back(seg((0, 0), (50, 0)));
        chain.push_back(seg((50, 0), (50, 50)));
        chain.push_back(seg((50, 50), (50, 50)));

        let pad_at = |p: Point, _layer: LayerId| (p == Point::new(50, 0)).then_some(PadId(9));
        let removed = chain.strip_null_segments(Link::Pad(PadId(1)), pad_at);

        assert_eq!(removed, 2);
        assert_eq!(
            links(&chain),
            vec![
                (Link::Pad(PadId(1)), Link::Pad(PadId(9))),
                (Link::Pad(PadId(9)), Link::Unattached),
            ]
        );
        let head = chain.head().unwrap();
        assert!(head.begin_on_pad && head.end_on_pad);
        assert!(chain.tail().unwrap().begin_on_pad);
        assert!(!chain.tail().unwrap().end_on_pad);
    }

    #[test]
    fn strip_null_segments_can_empty_the_chain() {
        let mut chain = SegmentChain::with_head(seg((5, 5), (5, 5)));
        chain.push_back(seg((5, 5), (5, 5)));
        assert_eq!(chain.strip_null_segments(Link::Unattached, |_, _| None), 2);
        assert!(chain.is_empty());
    }
}
