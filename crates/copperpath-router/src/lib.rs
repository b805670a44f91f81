//! Interactive track routing.
//!
//! A [`Router`] turns host events (clicks, cursor motion, end, abort) into
//! a multi-segment copper track. While routing it keeps segments on 0°,
//! 45° and 90° directions, cuts right-angle bends with 45° corners, pushes
//! the cursor out of other nets' clearance areas and attaches both ends of
//! the route to pads or existing tracks.
//!
//! ```no_run
//! use copperpath_board::Board;
//! use copperpath_geom::Point;
//! use copperpath_router::{RouteEvent, RouteSettings, Router};
//!
//! let mut board = Board::new();
//! let mut router = Router::new(RouteSettings::default());
//! router.feed_event(RouteEvent::Click(Point::new(0, 0)), &mut board)?;
//! router.feed_event(RouteEvent::End(Point::new(5_000_000, 0)), &mut board)?;
//! # Ok::<(), copperpath_router::RouteError>(())
//! ```

pub mod board;
pub mod chain;
pub mod drc;
pub mod error;
pub mod intrusion;
pub mod preview;
pub mod router;
pub mod session;
pub mod settings;

pub use board::BoardQuery;
pub use chain::{Link, RouteSegment, SegmentChain};
pub use drc::{ClearanceCheck, ClearanceViolation, Obstacle, SegmentClearance};
pub use error::{ChainError, RouteError, SettingsError};
pub use intrusion::{find_intrusion, push_out_of_intrusion};
pub use preview::{PreviewSegment, RoutePreview};
pub use router::{RouteEffect, RouteEvent, RouteState, Router};
pub use session::{CommitOutcome, RouteSession, StartAnchor};
pub use settings::{NetClass, NetClasses, RoutePolicies, RouteSettings};
