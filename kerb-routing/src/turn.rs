//! Turn restrictions and intersection traversal costs.

use crate::edge::StreetEdge;
use crate::graph::{EdgeId, Vertex};
use crate::mode::{TraverseMode, TraverseModeSet};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRestrictionKind {
    /// The turn onto `to` is forbidden.
    NoTurn,
    /// Every turn except the one onto `to` is forbidden.
    OnlyTurn,
}

/// A restriction on turns out of the edge it is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRestriction {
    pub kind: TurnRestrictionKind,
    pub to: EdgeId,
    pub modes: TraverseModeSet,
    /// Active windows as `(start, end)` seconds of day, end exclusive.
    /// An empty list means always active.
    pub time_windows: Vec<(u32, u32)>,
}

impl TurnRestriction {
    pub fn new(kind: TurnRestrictionKind, to: EdgeId, modes: TraverseModeSet) -> Self {
        TurnRestriction {
            kind,
            to,
            modes,
            time_windows: Vec::new(),
        }
    }

    pub fn with_time_windows(mut self, windows: Vec<(u32, u32)>) -> Self {
        self.time_windows = windows;
        self
    }

    /// Whether the restriction applies at the given epoch time.
    pub fn active(&self, time_seconds: i64) -> bool {
        if self.time_windows.is_empty() {
            return true;
        }
        let second_of_day = time_seconds.rem_euclid(SECONDS_PER_DAY) as u32;
        self.time_windows
            .iter()
            .any(|&(start, end)| second_of_day >= start && second_of_day < end)
    }
}

/// Turn angle in degrees in `[0, 360)` when leaving `from` onto `to` at
/// their shared vertex, built from the brads-derived azimuth accessors.
pub fn turn_angle(from: &StreetEdge, to: &StreetEdge) -> i32 {
    let mut angle = to.out_angle() - from.in_angle();
    if angle < 0 {
        angle += 360;
    }
    angle
}

/// How much crossing an intersection costs, in seconds. Selected per
/// request; every model must return 0 at non-intersection (temporary)
/// vertices, which the cost kernel already guarantees by not calling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostModel {
    /// Angle-banded expectation costs.
    #[default]
    Simple,
    /// Intersections are free. Useful for calibration and tests.
    Free,
}

impl CostModel {
    const RIGHT_TURN_SECONDS: f64 = 8.0;
    const LEFT_TURN_SECONDS: f64 = 15.0;

    pub fn traversal_cost(
        self,
        _vertex: &Vertex,
        from: &StreetEdge,
        to: &StreetEdge,
        mode: TraverseMode,
        _from_speed: f64,
        to_speed: f64,
    ) -> f64 {
        match self {
            CostModel::Free => 0.0,
            CostModel::Simple => {
                // Inside a roundabout the geometry already encodes the turn.
                if from.is_roundabout() || to.is_roundabout() {
                    return 0.0;
                }
                let angle = turn_angle(from, to);
                if mode.is_driving() {
                    match angle {
                        45..=135 => Self::RIGHT_TURN_SECONDS,
                        225..=315 => Self::LEFT_TURN_SECONDS,
                        _ => 0.0,
                    }
                } else {
                    let folded = if angle > 180 { 360 - angle } else { angle };
                    (f64::from(folded) / 20.0) / to_speed
                }
            }
        }
    }
}
