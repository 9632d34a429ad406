//! Edge traversal: admissibility, cost, and mode switching.
//!
//! `StreetEdge::traverse` is the per-edge contract the search engine calls
//! while expanding its frontier. An inadmissible traversal produces no
//! successor; it is never an error. A kiss-and-ride traversal may produce a
//! chain of successors (see `State::result_chain`).

use tracing::debug;

use crate::edge::StreetEdge;
use crate::graph::StreetGraph;
use crate::mode::TraverseMode;
use crate::request::{AccessibilityPreferences, Optimize, RoutingRequest};
use crate::state::{State, StateEditor};

/// Streets at or below this safety factor count as greenways.
pub const GREENWAY_SAFETY_FACTOR: f32 = 0.1;

/// The walking speed the slope cost table is normalized to (4.8 km/h).
pub const REFERENCE_WALK_SPEED: f64 = 4.0 / 3.0;

/// Everything a traversal reads besides the state itself.
#[derive(Clone, Copy)]
pub struct RoutingContext<'a> {
    pub graph: &'a StreetGraph,
    pub request: &'a RoutingRequest,
}

/// Seconds of walking effort for a sloped edge at the reference speed.
/// Flat ground costs exactly its traversal time; the penalty grows with the
/// square of the grade. The kernel rescales the result to the user's speed.
pub fn walk_cost_for_slope(distance: f64, max_slope: f64) -> f64 {
    let slope = max_slope.abs();
    (distance / REFERENCE_WALK_SPEED) * (1.0 + 9.27 * slope * slope)
}

/// Penalty weight for exceeding a soft limit.
///
/// Crossing the limit on this traversal pays for the part beyond the limit
/// plus the one-time penalty; a traversal already past it pays for its whole
/// increment.
fn overage_weight(prev: f64, next: f64, max: f64, penalty: f64, rate: f64) -> f64 {
    if prev <= max && max < next {
        (next - max) * rate + penalty
    } else {
        (next - prev) * rate
    }
}

impl StreetEdge {
    /// The speed this traversal moves at. Cars follow the edge; everyone
    /// else follows the request.
    pub fn calculate_speed(&self, options: &RoutingRequest, mode: TraverseMode) -> f64 {
        if mode.is_driving() {
            f64::from(self.car_speed())
        } else {
            options.speed(mode)
        }
    }

    /// Whether this edge may be traversed at all under the request.
    pub fn can_traverse(&self, options: &RoutingRequest, mode: TraverseMode) -> bool {
        if options.wheelchair_accessible {
            if !self.is_wheelchair_accessible() {
                return false;
            }
            if f64::from(self.max_slope()) > options.max_slope {
                return false;
            }
        }
        if !options.permit_footway && self.is_footway() {
            return false;
        }
        let prefs = &options.accessibility;
        if self.is_crossing() && AccessibilityPreferences::forbids(prefs.crossing) {
            return false;
        }
        if self.contains_bollard() && AccessibilityPreferences::forbids(prefs.bollard) {
            return false;
        }
        if self.contains_cycle_barrier() && AccessibilityPreferences::forbids(prefs.cycle_barrier) {
            return false;
        }
        if self.contains_turnstile() && AccessibilityPreferences::forbids(prefs.turnstile) {
            return false;
        }
        if self.has_traffic_light_sound()
            && AccessibilityPreferences::forbids(prefs.traffic_light_sound)
        {
            return false;
        }
        if self.has_traffic_light_vibration()
            && AccessibilityPreferences::forbids(prefs.traffic_light_vibration)
        {
            return false;
        }
        if self.has_traffic_light_floor_vibration()
            && AccessibilityPreferences::forbids(prefs.traffic_light_floor_vibration)
        {
            return false;
        }
        self.permission().allows(mode)
    }

    /// Combined weight multiplier for the accessibility features present on
    /// this edge. The crossing group only applies on crossing edges;
    /// physical barriers apply anywhere.
    pub fn accessibility_multiplier(&self, prefs: &AccessibilityPreferences) -> f64 {
        let mut multiplier = 1.0;
        if self.is_crossing() {
            multiplier *= AccessibilityPreferences::factor(prefs.crossing);
            if self.has_traffic_light_sound() {
                multiplier *= AccessibilityPreferences::factor(prefs.traffic_light_sound);
            }
            if self.has_traffic_light_vibration() {
                multiplier *= AccessibilityPreferences::factor(prefs.traffic_light_vibration);
            }
            if self.has_traffic_light_floor_vibration() {
                multiplier *=
                    AccessibilityPreferences::factor(prefs.traffic_light_floor_vibration);
            }
        }
        if self.contains_bollard() {
            multiplier *= AccessibilityPreferences::factor(prefs.bollard);
        }
        if self.contains_turnstile() {
            multiplier *= AccessibilityPreferences::factor(prefs.turnstile);
        }
        if self.contains_cycle_barrier() {
            multiplier *= AccessibilityPreferences::factor(prefs.cycle_barrier);
        }
        multiplier
    }

    /// Whether leaving this edge onto `onto` is allowed by the turn
    /// restrictions attached to it. Equivalence is decided by the edge being
    /// turned onto, so temporary split edges match their parent.
    pub fn can_turn_onto(
        &self,
        onto: &StreetEdge,
        state: &State,
        mode: TraverseMode,
        graph: &StreetGraph,
    ) -> bool {
        for restriction in graph.turn_restrictions(self.id()) {
            if !restriction.modes.contains_mode(mode)
                || !restriction.active(state.time_seconds())
            {
                continue;
            }
            let matches_target = onto.is_equivalent_to(graph.edge(restriction.to));
            let forbidden = match restriction.kind {
                crate::turn::TurnRestrictionKind::OnlyTurn => !matches_target,
                crate::turn::TurnRestrictionKind::NoTurn => matches_target,
            };
            if forbidden {
                return false;
            }
        }
        true
    }

    /// Traverse this edge out of `s0`, applying the kiss-and-ride mode
    /// switch policy on top of the plain traversal.
    pub fn traverse(&self, s0: &State, ctx: &RoutingContext<'_>) -> Option<State> {
        let request = ctx.request;
        let current_mode = s0.non_transit_mode(request);
        let state = self
            .do_traverse(s0, ctx, request, current_mode)
            .and_then(StateEditor::make_state);

        if request.kiss_and_ride {
            if request.arrive_by {
                // Fork an "unparked" car branch as soon as transit has been
                // used. The WALK check prevents the fork from forking.
                if s0.is_car_parked()
                    && s0.is_ever_boarded()
                    && current_mode == TraverseMode::Walk
                {
                    if let Some(mut editor) = self.do_traverse(s0, ctx, request, TraverseMode::Car)
                    {
                        editor.set_car_parked(false);
                        if let Some(unparked) = editor.make_state() {
                            return match state {
                                Some(mut walking) => {
                                    walking.attach_result(unparked);
                                    Some(walking)
                                }
                                None => Some(unparked),
                            };
                        }
                    }
                }
            } else if !s0.is_car_parked()
                && !self.permission().allows(TraverseMode::Car)
                && current_mode == TraverseMode::Car
            {
                // The driver drops the traveler here: an irrevocable switch
                // to walking. The CAR check prevents recursion.
                if let Some(mut editor) = self.do_traverse(s0, ctx, request, TraverseMode::Walk) {
                    editor.set_car_parked(true);
                    if let Some(dropped_off) = editor.make_state() {
                        return Some(dropped_off);
                    }
                }
            }
        }
        state
    }

    fn do_traverse(
        &self,
        s0: &State,
        ctx: &RoutingContext<'_>,
        options: &RoutingRequest,
        mode: TraverseMode,
    ) -> Option<StateEditor> {
        let graph = ctx.graph;
        let back_edge = s0.back_edge().map(|id| graph.edge(id));

        // U-turns die immediately.
        if let Some(back) = back_edge {
            if self.is_reverse_of(back) || back.is_reverse_of(self) {
                return None;
            }
        }

        // "Walking a bike" only means anything while actually walking.
        let walking_bike = options.walking_bike && mode == TraverseMode::Walk;
        let back_walking_bike =
            s0.is_back_walking_bike() && s0.back_mode() == Some(TraverseMode::Walk);

        if !self.can_traverse(options, mode) {
            if mode == TraverseMode::Bicycle {
                // Dismount and push the bike instead.
                return self.do_traverse(s0, ctx, options.walking_options(), TraverseMode::Walk);
            }
            debug!(edge = self.id().0, mode = mode.name(), "traversal not admitted");
            return None;
        }

        let speed = self.calculate_speed(options, mode);
        let distance = self.distance_m();
        let mut time = distance / speed;
        let mut weight;

        if options.wheelchair_accessible {
            weight = self.slope_speed_effective_length() / speed;
        } else if mode == TraverseMode::Bicycle {
            time = self.slope_speed_effective_length() / speed;
            weight = match options.optimize {
                Optimize::Safe => {
                    f64::from(self.bicycle_safety_factor()) * distance / speed
                }
                Optimize::Greenways => {
                    let mut w = f64::from(self.bicycle_safety_factor()) * distance / speed;
                    if self.bicycle_safety_factor() <= GREENWAY_SAFETY_FACTOR {
                        w *= 0.66;
                    }
                    w
                }
                Optimize::Flat => distance / speed + self.slope_work_cost_effective_length(),
                Optimize::Quick => self.slope_speed_effective_length() / speed,
                Optimize::Triangle => {
                    let quick = self.slope_speed_effective_length();
                    let safety = f64::from(self.bicycle_safety_factor()) * distance;
                    let slope = self.slope_work_cost_effective_length();
                    (quick * options.triangle_time_factor
                        + slope * options.triangle_slope_factor
                        + safety * options.triangle_safety_factor)
                        / speed
                }
                // Rewritten to QUICK during assembly; kept total here.
                Optimize::Transfers => distance / speed,
            };
        } else {
            if walking_bike {
                time = self.slope_speed_effective_length() / speed;
            }
            weight = time;
            if mode == TraverseMode::Walk {
                let slope_cost = walk_cost_for_slope(distance, f64::from(self.max_slope()));
                // The slope table assumes the reference speed; rescale to
                // the requested one. At zero slope this is plain time.
                weight = slope_cost * (REFERENCE_WALK_SPEED / speed);
                time = weight;
                weight *= self.accessibility_multiplier(&options.accessibility);
            }
        }

        if self.is_stairs() {
            weight *= options.stairs_reluctance;
        } else {
            // NB: this also scales bicycle and car traversals.
            weight *= options.walk_reluctance;
        }

        let mut editor = s0.edit(self, options.arrive_by);
        editor.set_back_mode(mode);
        editor.set_back_walking_bike(walking_bike);

        // A branch that entered a no-through area may not leave it again.
        if self.is_no_thru_traffic() {
            if let Some(back) = back_edge {
                if !back.is_no_thru_traffic() {
                    editor.set_entered_no_thru_area();
                }
            }
        } else if s0.has_entered_no_thru_area() {
            return None;
        }

        if let Some(back) = back_edge {
            let back_mode = s0.back_mode().unwrap_or(mode);
            if !back.can_turn_onto(self, s0, back_mode, graph) {
                return None;
            }

            let back_options = if back_walking_bike {
                options.walking_options()
            } else {
                options
            };
            let back_speed = back.calculate_speed(back_options, back_mode);

            // Arriving-by searches cross the intersection at this edge's far
            // end; departing searches cross at its near end. Temporary
            // (non-intersection) vertices cost nothing.
            let real_turn_cost = if options.arrive_by {
                let vertex = graph.vertex(self.to_vertex());
                if vertex.is_intersection() {
                    options
                        .cost_model
                        .traversal_cost(vertex, self, back, back_mode, speed, back_speed)
                } else {
                    0.0
                }
            } else {
                let vertex = graph.vertex(self.from_vertex());
                if vertex.is_intersection() {
                    options
                        .cost_model
                        .traversal_cost(vertex, back, self, mode, back_speed, speed)
                } else {
                    0.0
                }
            };

            if !mode.is_driving() {
                // Tie-breaker so equal-weight paths prefer fewer turns.
                editor.increment_walk_distance(real_turn_cost / 100.0);
            }
            time += real_turn_cost.ceil();
            weight += options.turn_reluctance * real_turn_cost;
        }

        // Getting on or off the bike costs extra.
        if (walking_bike || mode == TraverseMode::Bicycle)
            && !(back_walking_bike || s0.back_mode() == Some(TraverseMode::Bicycle))
        {
            time += f64::from(options.bike_switch_time);
            weight += f64::from(options.bike_switch_cost);
        }

        if !mode.is_driving() {
            editor.increment_walk_distance(distance);
        }

        let rounded_time = time.ceil() as u32;

        // Limit the leg before transit on kiss/park-and-ride trips.
        if options.kiss_and_ride || options.park_and_ride {
            let before_transit = if options.arrive_by {
                !s0.is_car_parked()
            } else {
                !s0.is_ever_boarded()
            };
            if before_transit {
                editor.increment_pre_transit_time(rounded_time);
            }
            if editor.pre_transit_time() > options.max_pre_transit_time {
                if options.soft_pre_transit_limiting {
                    weight += overage_weight(
                        f64::from(s0.pre_transit_time()),
                        f64::from(editor.pre_transit_time()),
                        f64::from(options.max_pre_transit_time),
                        options.pre_transit_penalty,
                        options.pre_transit_overage_rate,
                    );
                } else {
                    return None;
                }
            }
        }

        if editor.walk_distance() > options.max_walk_distance {
            if options.soft_walk_limiting {
                weight += overage_weight(
                    s0.walk_distance(),
                    editor.walk_distance(),
                    options.max_walk_distance,
                    options.soft_walk_penalty,
                    options.soft_walk_overage_rate,
                );
            } else {
                return None;
            }
        }

        editor.increment_time_seconds(rounded_time);
        editor.increment_weight(weight);
        Some(editor)
    }
}
