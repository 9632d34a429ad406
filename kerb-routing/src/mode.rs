//! Traversal modes and per-edge permissions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// One concrete way of moving along an edge.
///
/// TRANSIT never traverses street edges directly; it participates in mode
/// sets so that requests like `TRANSIT,WALK` round-trip through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraverseMode {
    Walk,
    Bicycle,
    Car,
    Transit,
}

impl TraverseMode {
    pub fn is_driving(self) -> bool {
        matches!(self, TraverseMode::Car)
    }

    pub fn name(self) -> &'static str {
        match self {
            TraverseMode::Walk => "WALK",
            TraverseMode::Bicycle => "BICYCLE",
            TraverseMode::Car => "CAR",
            TraverseMode::Transit => "TRANSIT",
        }
    }
}

bitflags! {
    /// The set of modes a request wants to route with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TraverseModeSet: u8 {
        const WALK = 1 << 0;
        const BICYCLE = 1 << 1;
        const CAR = 1 << 2;
        const TRANSIT = 1 << 3;
    }
}

impl TraverseModeSet {
    pub fn contains_mode(self, mode: TraverseMode) -> bool {
        match mode {
            TraverseMode::Walk => self.contains(TraverseModeSet::WALK),
            TraverseMode::Bicycle => self.contains(TraverseModeSet::BICYCLE),
            TraverseMode::Car => self.contains(TraverseModeSet::CAR),
            TraverseMode::Transit => self.contains(TraverseModeSet::TRANSIT),
        }
    }

    /// The street mode a fresh state travels in: CAR wins over BICYCLE wins
    /// over WALK.
    pub fn best_street_mode(self) -> TraverseMode {
        if self.contains(TraverseModeSet::CAR) {
            TraverseMode::Car
        } else if self.contains(TraverseModeSet::BICYCLE) {
            TraverseMode::Bicycle
        } else {
            TraverseMode::Walk
        }
    }
}

bitflags! {
    /// Which modes an edge admits at all. Assigned by the graph builder from
    /// map tagging; the traversal core only ever asks `allows`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TraversalPermission: u8 {
        const PEDESTRIAN = 1 << 0;
        const BICYCLE = 1 << 1;
        const CAR = 1 << 2;
    }
}

impl TraversalPermission {
    pub const ALL: TraversalPermission = TraversalPermission::all();

    pub const PEDESTRIAN_AND_BICYCLE: TraversalPermission = TraversalPermission::PEDESTRIAN
        .union(TraversalPermission::BICYCLE);

    pub fn allows(self, mode: TraverseMode) -> bool {
        match mode {
            TraverseMode::Walk => self.contains(TraversalPermission::PEDESTRIAN),
            TraverseMode::Bicycle => self.contains(TraversalPermission::BICYCLE),
            TraverseMode::Car => self.contains(TraversalPermission::CAR),
            TraverseMode::Transit => false,
        }
    }
}
