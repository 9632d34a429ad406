//! kerb-routing: accessibility-aware street edge traversal.
//!
//! The crate models the street half of a multi-modal trip planner's cost
//! function:
//!
//! - a compact street edge (fixed-point length, brads angles, packed
//!   obstacle flags, elevation-adjusted effective lengths);
//! - search states and the editor that commits successor states;
//! - the traversal kernel: admissibility, per-mode base weight, the
//!   accessibility preference multiplier, turn restrictions and costs,
//!   soft/hard walking limits, and the kiss-and-ride mode switch;
//! - the immutable `RoutingRequest` those decisions read from.
//!
//! The shortest-path search itself lives elsewhere; it only ever calls
//! [`StreetEdge::traverse`](edge::StreetEdge) per candidate edge and treats
//! an absent successor as a dead branch.

pub mod edge;
pub mod flags;
pub mod graph;
pub mod mode;
pub mod request;
pub mod state;
pub mod traverse;
pub mod turn;

pub use edge::{CompactGeometry, StreetClass, StreetEdge};
pub use flags::EdgeFlags;
pub use graph::{EdgeId, StreetGraph, Vertex, VertexId};
pub use mode::{TraversalPermission, TraverseMode, TraverseModeSet};
pub use request::{
    AccessibilityPreferences, BannedStops, FeedScopedId, Optimize, RequestLocale, RoutingRequest,
};
pub use state::{State, StateEditor};
pub use traverse::{RoutingContext, GREENWAY_SAFETY_FACTOR};
pub use turn::{CostModel, TurnRestriction, TurnRestrictionKind};
