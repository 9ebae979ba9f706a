use serde::{Deserialize, Serialize};

pub const DEFAULT_LANDMARK_CONNECTION_RADIUS_M: f64 = 50.0;
pub const DEFAULT_VERTICAL_TRANSITION_PENALTY_M: f64 = 25.0;
pub const DEFAULT_NEAREST_RADIUS_M: f64 = 100.0;
pub const DEFAULT_MAX_EXPANSIONS: u64 = 100_000;
pub const DEFAULT_STAIRS_BIAS_MULTIPLIER: f64 = 3.0;

/// Tunables for graph construction. Passed explicitly, never read from
/// globals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Maximum distance at which a landmark is linked to the nearest road or
    /// intersection node. Landmarks farther than this stay isolated and are
    /// flagged by the validator.
    pub landmark_connection_radius_m: f64,
    /// Fixed meters-equivalent cost of one elevator/stairs floor change.
    pub vertical_transition_penalty_m: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            landmark_connection_radius_m: DEFAULT_LANDMARK_CONNECTION_RADIUS_M,
            vertical_transition_penalty_m: DEFAULT_VERTICAL_TRANSITION_PENALTY_M,
        }
    }
}

/// Restricts endpoint resolution to one building and/or floor. Expansion is
/// not scoped; a route may still leave the floor through a transition edge.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchScope {
    pub building_id: Option<String>,
    pub floor_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Bias vertical routing toward elevators where both an elevator and a
    /// stairs edge lead to the same floor.
    pub prefer_elevator: bool,
    /// Multiplier applied to a stairs edge when `prefer_elevator` is set and
    /// an elevator alternative exists at the same node. Stairs without an
    /// elevator alternative keep their true weight, so stairs-only buildings
    /// stay routable.
    pub stairs_bias_multiplier: f64,
    /// Radius for resolving the start/goal coordinates to graph nodes.
    pub nearest_radius_m: f64,
    /// Hard cap on frontier pops; bounds runtime on pathological graphs.
    pub max_expansions: u64,
    pub scope: Option<SearchScope>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            prefer_elevator: false,
            stairs_bias_multiplier: DEFAULT_STAIRS_BIAS_MULTIPLIER,
            nearest_radius_m: DEFAULT_NEAREST_RADIUS_M,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            scope: None,
        }
    }
}
