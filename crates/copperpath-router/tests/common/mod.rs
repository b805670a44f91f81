#![allow(dead_code)]

use copperpath_board::{Anchor, Board, Track};
use copperpath_geom::Point;
use copperpath_router::{RouteEffect, RouteEvent, RouteSettings, Router, RouteError};
use itertools::Itertools;

pub fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

/// Small-unit settings: 10 wide tracks, 5 clearance and a corner step of 20.
pub fn settings() -> RouteSettings {
    let mut settings = RouteSettings {
        current_track_width: Some(10),
        current_via_size: Some(40),
        grid_size: 20,
        ..RouteSettings::default()
    };
    settings.net_classes.default.clearance = 5;
    settings.policies.auto_45_corners = false;
    settings
}

/// Feed every event, failing the test on the first error.
pub fn feed(router: &mut Router, board: &mut Board, events: &[RouteEvent]) -> Vec<RouteEffect> {
    events
        .iter()
        .flat_map(|&event| {
            router
                .feed_event(event, board)
                .unwrap_or_else(|err| panic!("{event:?} failed: {err}"))
        })
        .collect()
}

pub fn try_feed(
    router: &mut Router,
    board: &mut Board,
    events: &[RouteEvent],
) -> Result<Vec<RouteEffect>, RouteError> {
    let mut effects = Vec::new();
    for &event in events {
        effects.extend(router.feed_event(event, board)?);
    }
    Ok(effects)
}

fn anchor(anchor: Anchor) -> String {
    match anchor {
        Anchor::None => "-".to_string(),
        Anchor::Pad(id) => id.to_string(),
        Anchor::Track(id) => id.to_string(),
    }
}

pub fn describe(track: &Track) -> String {
    let mut line = format!(
        "{} {} -> {} [{} | {}]",
        track.id,
        track.start,
        track.end,
        anchor(track.start_anchor),
        anchor(track.end_anchor)
    );
    if track.state.begin_on_pad {
        line.push_str(" begin_on_pad");
    }
    if track.state.end_on_pad {
        line.push_str(" end_on_pad");
    }
    line
}

/// One line per board track, in list order.
pub fn summarize(board: &Board) -> String {
    board.tracks().iter().map(describe).join("\n")
}

