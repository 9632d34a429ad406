//! Search states and the editor that builds their successors.
//!
//! A `State` is one node of the search tree: accumulated time, weight and
//! walk distance plus the flags that change what future traversals may do.
//! Successor states are never written directly; a traversal opens a
//! `StateEditor`, applies its increments, and commits with `make_state`,
//! which refuses to produce a state when an edit broke an invariant.

use std::sync::Arc;

use tracing::warn;

use crate::edge::StreetEdge;
use crate::graph::{EdgeId, VertexId};
use crate::mode::{TraverseMode, TraverseModeSet};
use crate::request::RoutingRequest;

#[derive(Debug, Clone)]
pub struct State {
    vertex: VertexId,
    time_seconds: i64,
    weight: f64,
    walk_distance: f64,
    pre_transit_time: u32,
    car_parked: bool,
    ever_boarded: bool,
    entered_no_thru_area: bool,
    back_edge: Option<EdgeId>,
    back_mode: Option<TraverseMode>,
    back_walking_bike: bool,
    start_time_seconds: i64,
    /// Chain of predecessors, for path reconstruction.
    back_state: Option<Arc<State>>,
    /// Alternate successors produced by the same traversal (mode-switch
    /// forks). Part of the result, not of the path.
    next_result: Option<Box<State>>,
}

impl State {
    /// The state a search starts from.
    pub fn initial(vertex: VertexId, request: &RoutingRequest) -> Self {
        State {
            vertex,
            time_seconds: request.date_time,
            weight: 0.0,
            walk_distance: 0.0,
            pre_transit_time: 0,
            // Searching backwards, the car has already been dropped off.
            car_parked: request.arrive_by && (request.park_and_ride || request.kiss_and_ride),
            ever_boarded: false,
            entered_no_thru_area: false,
            back_edge: None,
            back_mode: None,
            back_walking_bike: false,
            start_time_seconds: request.date_time,
            back_state: None,
            next_result: None,
        }
    }

    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    pub fn time_seconds(&self) -> i64 {
        self.time_seconds
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn walk_distance(&self) -> f64 {
        self.walk_distance
    }

    pub fn pre_transit_time(&self) -> u32 {
        self.pre_transit_time
    }

    pub fn is_car_parked(&self) -> bool {
        self.car_parked
    }

    pub fn is_ever_boarded(&self) -> bool {
        self.ever_boarded
    }

    pub fn has_entered_no_thru_area(&self) -> bool {
        self.entered_no_thru_area
    }

    pub fn back_edge(&self) -> Option<EdgeId> {
        self.back_edge
    }

    pub fn back_mode(&self) -> Option<TraverseMode> {
        self.back_mode
    }

    pub fn is_back_walking_bike(&self) -> bool {
        self.back_walking_bike
    }

    pub fn start_time_seconds(&self) -> i64 {
        self.start_time_seconds
    }

    pub fn back_state(&self) -> Option<&State> {
        self.back_state.as_deref()
    }

    /// Elapsed seconds since the search started, independent of direction.
    pub fn elapsed_seconds(&self) -> i64 {
        (self.time_seconds - self.start_time_seconds).abs()
    }

    /// The street mode this state currently travels in.
    pub fn non_transit_mode(&self, request: &RoutingRequest) -> TraverseMode {
        if (request.kiss_and_ride || request.park_and_ride)
            && request.modes.contains(TraverseModeSet::CAR)
        {
            if self.car_parked {
                TraverseMode::Walk
            } else {
                TraverseMode::Car
            }
        } else {
            request.modes.best_street_mode()
        }
    }

    /// Open an editor for traversing `edge` out of this state.
    pub fn edit(&self, edge: &StreetEdge, arrive_by: bool) -> StateEditor {
        let vertex = if arrive_by {
            edge.from_vertex()
        } else {
            edge.to_vertex()
        };
        let child = State {
            vertex,
            back_edge: Some(edge.id()),
            back_mode: None,
            back_walking_bike: false,
            back_state: Some(Arc::new(self.clone())),
            next_result: None,
            ..self.clone()
        };
        StateEditor {
            child,
            arrive_by,
            defective: false,
        }
    }

    /// Append an alternate successor to this result's chain.
    pub fn attach_result(&mut self, other: State) {
        let mut cursor = &mut self.next_result;
        while let Some(next) = cursor {
            cursor = &mut next.next_result;
        }
        *cursor = Some(Box::new(other));
    }

    /// This state followed by its alternate successors.
    pub fn result_chain(&self) -> ResultChain<'_> {
        ResultChain { next: Some(self) }
    }
}

/// States compare by their search-relevant values; the back chain and the
/// result chain do not participate.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex
            && self.time_seconds == other.time_seconds
            && self.weight == other.weight
            && self.walk_distance == other.walk_distance
            && self.pre_transit_time == other.pre_transit_time
            && self.car_parked == other.car_parked
            && self.ever_boarded == other.ever_boarded
            && self.entered_no_thru_area == other.entered_no_thru_area
            && self.back_mode == other.back_mode
            && self.back_walking_bike == other.back_walking_bike
    }
}

pub struct ResultChain<'a> {
    next: Option<&'a State>,
}

impl<'a> Iterator for ResultChain<'a> {
    type Item = &'a State;

    fn next(&mut self) -> Option<&'a State> {
        let current = self.next?;
        self.next = current.next_result.as_deref();
        Some(current)
    }
}

/// Mutation buffer for one edge transition.
pub struct StateEditor {
    child: State,
    arrive_by: bool,
    defective: bool,
}

impl StateEditor {
    pub fn increment_time_seconds(&mut self, seconds: u32) {
        if self.arrive_by {
            self.child.time_seconds -= i64::from(seconds);
        } else {
            self.child.time_seconds += i64::from(seconds);
        }
    }

    pub fn increment_weight(&mut self, weight: f64) {
        if !weight.is_finite() || weight < 0.0 {
            warn!(weight, "refusing a negative or non-finite weight increment");
            self.defective = true;
            return;
        }
        self.child.weight += weight;
    }

    pub fn increment_walk_distance(&mut self, distance: f64) {
        if !distance.is_finite() || distance < 0.0 {
            warn!(distance, "refusing a negative or non-finite walk distance increment");
            self.defective = true;
            return;
        }
        self.child.walk_distance += distance;
    }

    pub fn increment_pre_transit_time(&mut self, seconds: u32) {
        self.child.pre_transit_time += seconds;
    }

    pub fn set_back_mode(&mut self, mode: TraverseMode) {
        self.child.back_mode = Some(mode);
    }

    pub fn set_back_walking_bike(&mut self, walking_bike: bool) {
        self.child.back_walking_bike = walking_bike;
    }

    pub fn set_car_parked(&mut self, parked: bool) {
        self.child.car_parked = parked;
    }

    pub fn set_ever_boarded(&mut self, boarded: bool) {
        self.child.ever_boarded = boarded;
    }

    pub fn set_entered_no_thru_area(&mut self) {
        self.child.entered_no_thru_area = true;
    }

    pub fn walk_distance(&self) -> f64 {
        self.child.walk_distance
    }

    pub fn pre_transit_time(&self) -> u32 {
        self.child.pre_transit_time
    }

    /// Commit the buffered edits. Produces nothing when an edit was
    /// defective.
    pub fn make_state(self) -> Option<State> {
        if self.defective {
            return None;
        }
        Some(self.child)
    }
}
