use copperpath_board::NetCode;
use copperpath_geom::Point;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::BoardQuery;
use crate::drc::{ClearanceCheck, SegmentClearance};
use crate::error::RouteError;
use crate::preview::RoutePreview;
use crate::session::{CommitOutcome, RouteSession, StartAnchor};
use crate::settings::RouteSettings;

/// Input from the host editor.
///
/// Serialized with an `event` tag, e.g. `{"event": "click", "x": 0, "y": 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RouteEvent {
    /// Start a route, or fix the current segment.
    Click(Point),
    Motion(Point),
    /// Move to the point and finish the route.
    End(Point),
    Abort,
    /// Swap which of the two moving segments takes the 45° leg.
    TogglePosture,
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum RouteEffect {
    Redraw,
    HighlightNet { net: NetCode },
    ClearHighlight,
    /// The route started on nothing connectable.
    Floating,
    Committed(CommitOutcome),
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Idle,
    Routing,
}

/// Drives at most one [`RouteSession`] from a stream of [`RouteEvent`]s.
#[derive(Debug)]
pub struct Router<C = SegmentClearance> {
    settings: RouteSettings,
    checker: C,
    session: Option<RouteSession>,
    alternate_posture: bool,
}

impl Router<SegmentClearance> {
    pub fn new(settings: RouteSettings) -> Self {
        Self::with_checker(settings, SegmentClearance)
    }
}

impl<C: ClearanceCheck> Router<C> {
    pub fn with_checker(settings: RouteSettings, checker: C) -> Self {
        Self {
            settings,
            checker,
            session: None,
            alternate_posture: false,
        }
    }

    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// Settings are re-read on every event, so changes apply to the route
    /// in progress.
    pub fn settings_mut(&mut self) -> &mut RouteSettings {
        &mut self.settings
    }

    pub fn state(&self) -> RouteState {
        if self.session.is_some() {
            RouteState::Routing
        } else {
            RouteState::Idle
        }
    }

    pub fn session(&self) -> Option<&RouteSession> {
        self.session.as_ref()
    }

    pub fn preview(&self) -> Option<RoutePreview> {
        self.session
            .as_ref()
            .map(|session| RoutePreview::of(session, &self.settings))
    }

    /// Apply one event. Events that mean nothing in the current state are
    /// ignored and produce no effects. An error leaves the route as it was.
    pub fn feed_event<B: BoardQuery + ?Sized>(
        &mut self,
        event: RouteEvent,
        board: &mut B,
    ) -> Result<Vec<RouteEffect>, RouteError> {
        debug!("{:?}: {event:?}", self.state());

        match event {
            RouteEvent::Click(at) => match self.session.as_mut() {
                None => {
                    let mut session =
                        RouteSession::begin(&*board, &self.settings, at, self.alternate_posture);
                    session.update(&*board, &self.settings, at);

                    let mut effects = match session.start_anchor() {
                        StartAnchor::Floating => vec![RouteEffect::Floating],
                        _ => vec![RouteEffect::HighlightNet { net: session.net() }],
                    };
                    effects.push(RouteEffect::Redraw);
                    self.session = Some(session);
                    Ok(effects)
                }
                Some(session) => {
                    session.update(&*board, &self.settings, at);
                    session.commit_segment(&*board, &self.settings, &self.checker)?;
                    Ok(vec![RouteEffect::Redraw])
                }
            },

            RouteEvent::Motion(at) => match self.session.as_mut() {
                Some(session) => {
                    session.update(&*board, &self.settings, at);
                    Ok(vec![RouteEffect::Redraw])
                }
                None => Ok(Vec::new()),
            },

            RouteEvent::End(at) => {
                let Some(session) = self.session.as_mut() else {
                    return Ok(Vec::new());
                };
                session.update(&*board, &self.settings, at);
                let outcome = session.end(board, &self.settings, &self.checker)?;
                self.session = None;
                Ok(vec![
                    RouteEffect::ClearHighlight,
                    RouteEffect::Committed(outcome),
                    RouteEffect::Redraw,
                ])
            }

            RouteEvent::Abort => match self.session.take() {
                Some(session) => {
                    session.abort();
                    Ok(vec![
                        RouteEffect::ClearHighlight,
                        RouteEffect::Aborted,
                        RouteEffect::Redraw,
                    ])
                }
                None => Ok(Vec::new()),
            },

            RouteEvent::TogglePosture => {
                self.alternate_posture = !self.alternate_posture;
                match self.session.as_mut() {
                    Some(session) => {
                        session.set_alternate_posture(self.alternate_posture);
                        let cursor = session.cursor();
                        session.update(&*board, &self.settings, cursor);
                        Ok(vec![RouteEffect::Redraw])
                    }
                    None => Ok(Vec::new()),
                }
            }
        }
    }
}
