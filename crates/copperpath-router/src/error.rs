use std::path::PathBuf;

use copperpath_geom::Point;
use thiserror::Error;

use crate::drc::ClearanceViolation;

/// Errors reported to the host while driving a route.
///
/// Every variant leaves the route session untouched: the host may keep
/// moving the cursor and try again, or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("Route rejected: {0}")]
    Drc(#[from] ClearanceViolation),
}

/// Structural corruption of an in-progress segment chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Segment {index} starts at {start} but its predecessor ends at {previous_end}")]
    Disconnected {
        index: usize,
        start: Point,
        previous_end: Point,
    },

    #[error("Segment {index} links to segment {target}, which is not its neighbour")]
    BadLink { index: usize, target: usize },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}
