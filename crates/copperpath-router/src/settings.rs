//! Design settings consulted while routing.
//!
//! Settings are plain data loaded from TOML. Every field has a default, so
//! an empty document yields a usable configuration:
//!
//! ```toml
//! active_layer = 0
//! current_track_width = 300000
//! grid_size = 1270000
//!
//! [policies]
//! use_two_segment_tracks = true
//!
//! [net_classes.default]
//! track_width = 250000
//! clearance = 200000
//!
//! [net_classes.classes.power]
//! track_width = 500000
//! clearance = 300000
//! nets = [1, 2]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use copperpath_board::{LayerId, NetCode};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Track, clearance and via rules shared by a group of nets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetClass {
    pub track_width: i32,
    pub clearance: i32,
    pub via_diameter: i32,
    /// Nets assigned to this class.
    pub nets: Vec<NetCode>,
}

impl Default for NetClass {
    fn default() -> Self {
        Self {
            track_width: 250_000,
            clearance: 200_000,
            via_diameter: 800_000,
            nets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetClasses {
    /// Rules for every net not listed in a named class.
    pub default: NetClass,
    pub classes: BTreeMap<String, NetClass>,
}

impl NetClasses {
    pub fn class_of(&self, net: NetCode) -> &NetClass {
        self.classes
            .values()
            .find(|class| class.nets.contains(&net))
            .unwrap_or(&self.default)
    }

    /// Required gap between copper of `a` and copper of `b`: the larger of
    /// the two class clearances.
    pub fn clearance(&self, a: NetCode, b: NetCode) -> i32 {
        self.class_of(a).clearance.max(self.class_of(b).clearance)
    }
}

/// Behaviour switches of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePolicies {
    /// Keep the width of the track a route starts from.
    pub use_connected_track_width: bool,
    /// Route with a pair of segments whose corner follows the cursor.
    pub use_two_segment_tracks: bool,
    pub use_45_degree_tracks: bool,
    pub auto_45_corners: bool,
    /// Remove the old path between the endpoints of a new route.
    pub auto_delete_old_track: bool,
    /// Enforce clearances and push the cursor out of other nets' copper.
    pub drc_on: bool,
}

impl Default for RoutePolicies {
    fn default() -> Self {
        Self {
            use_connected_track_width: false,
            use_two_segment_tracks: false,
            use_45_degree_tracks: true,
            auto_45_corners: true,
            auto_delete_old_track: true,
            drc_on: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    pub active_layer: LayerId,
    /// Overrides the net class track width when set.
    pub current_track_width: Option<i32>,
    /// Overrides the net class via diameter when set.
    pub current_via_size: Option<i32>,
    pub grid_size: i32,
    pub policies: RoutePolicies,
    pub net_classes: NetClasses,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            active_layer: LayerId::F_CU,
            current_track_width: None,
            current_via_size: None,
            grid_size: 1_270_000,
            policies: RoutePolicies::default(),
            net_classes: NetClasses::default(),
        }
    }
}

impl RouteSettings {
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn track_width(&self, net: NetCode) -> i32 {
        self.current_track_width
            .unwrap_or_else(|| self.net_classes.class_of(net).track_width)
    }

    pub fn via_size(&self, net: NetCode) -> i32 {
        self.current_via_size
            .unwrap_or_else(|| self.net_classes.class_of(net).via_diameter)
    }

    pub fn clearance(&self, a: NetCode, b: NetCode) -> i32 {
        self.net_classes.clearance(a, b)
    }

    /// Leg length cut from each side of a right-angle bend when a 45°
    /// corner is inserted for a track of `width`.
    pub fn corner_step(&self, width: i32) -> i32 {
        let half_grid = (self.grid_size as f64 / 2.0).round() as i32;
        half_grid.max(width.saturating_mul(2))
    }
}
