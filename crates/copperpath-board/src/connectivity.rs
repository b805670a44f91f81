//! Track-to-track connectivity queries used when replacing an old route.

use std::collections::{HashMap, HashSet, VecDeque};

use copperpath_geom::Point;

use crate::{Board, LayerId, LayerSet, NetCode, TrackId};

impl Board {
    /// Find an existing chain of `net` tracks on `layer` that joins `from` to
    /// `to` end-to-end, ignoring the tracks listed in `exclude`.
    ///
    /// The search never passes through a pad: a path that reaches a pad
    /// before `to` serves another connection and is not redundant. The
    /// shortest path (in segments) is returned, in order from `from`.
    pub fn redundant_path(
        &self,
        net: NetCode,
        layer: LayerId,
        from: Point,
        to: Point,
        exclude: &[TrackId],
    ) -> Option<Vec<TrackId>> {
        if from == to {
            return None;
        }

        let candidates: Vec<_> = self
            .tracks()
            .iter()
            .filter(|t| {
                t.is_live()
                    && t.net == net
                    && t.layer == layer
                    && !t.is_null()
                    && !exclude.contains(&t.id)
            })
            .collect();

        let layers = LayerSet::single(layer);
        let mut came_from: HashMap<Point, (Point, TrackId)> = HashMap::new();
        let mut visited: HashSet<Point> = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = Vec::new();
                let mut at = current;
                while let Some(&(prev, id)) = came_from.get(&at) {
                    path.push(id);
                    at = prev;
                }
                path.reverse();
                return Some(path);
            }

            if current != from && self.pad_at(current, layers).is_some() {
                continue;
            }

            for track in &candidates {
                let next = if track.start == current {
                    track.end
                } else if track.end == current {
                    track.start
                } else {
                    continue;
                };

                if visited.insert(next) {
                    came_from.insert(next, (current, track.id));
                    queue.push_back(next);
                }
            }
        }

        None
    }
}
