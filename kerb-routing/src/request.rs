//! The immutable routing request consumed by the traversal core.
//!
//! A request is cloned from a process-wide prototype, overlaid with user
//! parameters by the API crate, finalized once, and read-only from then on.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::mode::{TraverseMode, TraverseModeSet};
use crate::turn::CostModel;

/// What the bicycle cost branches optimize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Optimize {
    Quick,
    Safe,
    Greenways,
    Flat,
    Triangle,
    /// Accepted on the wire only; assembly rewrites it to QUICK plus a
    /// transfer penalty before the request reaches the search.
    Transfers,
}

/// Tri-valued accessibility preference alphabet.
///
/// `-1` forbid, `0` dislike (x2.0), `1` neutral (x1.0), `2` prefer (x0.5).
/// Values outside the alphabet behave as neutral.
pub const FORBID: i32 = -1;
pub const DISLIKE: i32 = 0;
pub const NEUTRAL: i32 = 1;
pub const PREFER: i32 = 2;

/// Per-feature preferences for the obstacles and aids an edge can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessibilityPreferences {
    pub crossing: i32,
    pub bollard: i32,
    pub cycle_barrier: i32,
    pub turnstile: i32,
    pub traffic_light_sound: i32,
    pub traffic_light_vibration: i32,
    pub traffic_light_floor_vibration: i32,
}

impl Default for AccessibilityPreferences {
    fn default() -> Self {
        AccessibilityPreferences {
            crossing: NEUTRAL,
            bollard: NEUTRAL,
            cycle_barrier: NEUTRAL,
            turnstile: NEUTRAL,
            traffic_light_sound: NEUTRAL,
            traffic_light_vibration: NEUTRAL,
            traffic_light_floor_vibration: NEUTRAL,
        }
    }
}

impl AccessibilityPreferences {
    /// Weight multiplier a single preference contributes.
    pub fn factor(preference: i32) -> f64 {
        match preference {
            DISLIKE => 2.0,
            NEUTRAL => 1.0,
            PREFER => 0.5,
            _ => 1.0,
        }
    }

    pub fn forbids(preference: i32) -> bool {
        preference == FORBID
    }
}

/// A GTFS-scoped identifier, written `agency:id` and parsed from the
/// `agency_id` underscore form used by the query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedScopedId {
    pub agency: String,
    pub id: String,
}

impl FeedScopedId {
    pub fn new(agency: impl Into<String>, id: impl Into<String>) -> Self {
        FeedScopedId {
            agency: agency.into(),
            id: id.into(),
        }
    }

    /// Parse the `agency_id` form, splitting on the first underscore.
    pub fn parse_underscore(input: &str) -> Option<Self> {
        let (agency, id) = input.split_once('_')?;
        if agency.is_empty() || id.is_empty() {
            return None;
        }
        Some(FeedScopedId::new(agency, id))
    }
}

impl fmt::Display for FeedScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.agency, self.id)
    }
}

/// Where boarding a banned trip is forbidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannedStops {
    /// Boarding is banned at every stop of the trip.
    All,
    /// Boarding is banned at these stop indices only.
    Indices(FxHashSet<u32>),
}

impl BannedStops {
    pub fn contains(&self, stop_index: u32) -> bool {
        match self {
            BannedStops::All => true,
            BannedStops::Indices(indices) => indices.contains(&stop_index),
        }
    }
}

/// Locale attached to a request. Only the language component survives
/// parsing; see the API crate for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale {
    pub language: String,
}

impl Default for RequestLocale {
    fn default() -> Self {
        RequestLocale {
            language: "en".to_owned(),
        }
    }
}

impl RequestLocale {
    pub fn new(language: impl Into<String>) -> Self {
        RequestLocale {
            language: language.into(),
        }
    }
}

/// An assembled, immutable routing request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRequest {
    pub from_place: String,
    pub to_place: String,
    /// Departure (or arrival, under `arrive_by`) time as epoch seconds.
    pub date_time: i64,
    pub arrive_by: bool,
    pub modes: TraverseModeSet,
    pub kiss_and_ride: bool,
    pub park_and_ride: bool,
    pub bike_rental: bool,
    /// The state is pushing a bicycle along. Only ever set on the
    /// walking-the-bike sub-request built by `finalize`.
    pub walking_bike: bool,

    pub wheelchair_accessible: bool,
    /// Steepest slope a wheelchair traversal accepts.
    pub max_slope: f64,

    pub walk_speed: f64,
    pub bike_speed: f64,
    pub car_speed: f64,

    pub walk_reluctance: f64,
    pub stairs_reluctance: f64,
    pub turn_reluctance: f64,
    pub wait_reluctance: f64,
    pub wait_at_beginning_factor: f64,

    pub walk_board_cost: i32,
    pub bike_board_cost: i32,
    pub bike_switch_time: i32,
    pub bike_switch_cost: i32,

    pub optimize: Optimize,
    pub triangle_time_factor: f64,
    pub triangle_slope_factor: f64,
    pub triangle_safety_factor: f64,

    pub max_walk_distance: f64,
    pub soft_walk_limiting: bool,
    pub soft_walk_penalty: f64,
    pub soft_walk_overage_rate: f64,

    pub max_pre_transit_time: u32,
    pub soft_pre_transit_limiting: bool,
    pub pre_transit_penalty: f64,
    pub pre_transit_overage_rate: f64,

    pub board_slack: u32,
    pub alight_slack: u32,
    pub transfer_slack: u32,
    pub transfer_penalty: i32,
    pub max_transfers: i32,

    pub batch: bool,
    pub clamp_initial_wait: i64,

    pub preferred_routes: Vec<String>,
    pub unpreferred_routes: Vec<String>,
    pub banned_routes: Vec<String>,
    pub preferred_agencies: Vec<String>,
    pub unpreferred_agencies: Vec<String>,
    pub banned_agencies: Vec<String>,
    pub banned_stops: FxHashSet<FeedScopedId>,
    pub banned_stops_hard: FxHashSet<FeedScopedId>,
    pub banned_trips: FxHashMap<FeedScopedId, BannedStops>,

    pub start_transit_stop_id: Option<FeedScopedId>,
    pub start_transit_trip_id: Option<FeedScopedId>,
    pub use_bike_rental_availability_information: bool,

    pub locale: RequestLocale,
    pub accessibility: AccessibilityPreferences,
    pub permit_footway: bool,

    pub cost_model: CostModel,
    /// Sub-request applied while pushing the bicycle; built by `finalize`.
    pub bike_walking_options: Option<Box<RoutingRequest>>,
}

impl Default for RoutingRequest {
    fn default() -> Self {
        RoutingRequest {
            from_place: String::new(),
            to_place: String::new(),
            date_time: 0,
            arrive_by: false,
            modes: TraverseModeSet::TRANSIT | TraverseModeSet::WALK,
            kiss_and_ride: false,
            park_and_ride: false,
            bike_rental: false,
            walking_bike: false,
            wheelchair_accessible: false,
            max_slope: 0.0833333333333,
            walk_speed: 1.33,
            bike_speed: 5.0,
            car_speed: 40.0,
            walk_reluctance: 2.0,
            stairs_reluctance: 2.0,
            turn_reluctance: 1.0,
            wait_reluctance: 1.0,
            wait_at_beginning_factor: 0.4,
            walk_board_cost: 600,
            bike_board_cost: 1200,
            bike_switch_time: 0,
            bike_switch_cost: 0,
            optimize: Optimize::Quick,
            triangle_time_factor: 0.0,
            triangle_slope_factor: 0.0,
            triangle_safety_factor: 0.0,
            max_walk_distance: f64::MAX,
            soft_walk_limiting: true,
            soft_walk_penalty: 60.0,
            soft_walk_overage_rate: 5.0,
            max_pre_transit_time: 30 * 60,
            soft_pre_transit_limiting: true,
            pre_transit_penalty: 300.0,
            pre_transit_overage_rate: 10.0,
            board_slack: 0,
            alight_slack: 0,
            transfer_slack: 120,
            transfer_penalty: 0,
            max_transfers: 2,
            batch: false,
            clamp_initial_wait: -1,
            preferred_routes: Vec::new(),
            unpreferred_routes: Vec::new(),
            banned_routes: Vec::new(),
            preferred_agencies: Vec::new(),
            unpreferred_agencies: Vec::new(),
            banned_agencies: Vec::new(),
            banned_stops: FxHashSet::default(),
            banned_stops_hard: FxHashSet::default(),
            banned_trips: FxHashMap::default(),
            start_transit_stop_id: None,
            start_transit_trip_id: None,
            use_bike_rental_availability_information: false,
            locale: RequestLocale::default(),
            accessibility: AccessibilityPreferences::default(),
            permit_footway: true,
            cost_model: CostModel::default(),
            bike_walking_options: None,
        }
    }
}

impl RoutingRequest {
    /// Speed for a non-driving mode. Driving speed comes from the edge.
    pub fn speed(&self, mode: TraverseMode) -> f64 {
        match mode {
            TraverseMode::Bicycle => self.bike_speed,
            TraverseMode::Car => self.car_speed,
            TraverseMode::Walk | TraverseMode::Transit => self.walk_speed,
        }
    }

    /// Options used after dismounting: the walking-the-bike sub-request if
    /// one was built, otherwise the request itself.
    pub fn walking_options(&self) -> &RoutingRequest {
        self.bike_walking_options.as_deref().unwrap_or(self)
    }

    /// Derive the walking-the-bike sub-request. Must run once after all
    /// fields are overlaid; running it again produces the same result.
    pub fn finalize(&mut self) {
        if self.modes.contains(TraverseModeSet::BICYCLE) {
            let mut walk = self.clone();
            walk.bike_walking_options = None;
            // Pushing a bike is slower and more annoying than plain walking.
            walk.walk_speed = self.walk_speed * 0.8;
            walk.walk_reluctance = self.walk_reluctance * 2.7;
            walk.modes.remove(TraverseModeSet::BICYCLE);
            walk.walking_bike = true;
            self.bike_walking_options = Some(Box::new(walk));
        } else {
            self.bike_walking_options = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_factors() {
        assert_eq!(AccessibilityPreferences::factor(DISLIKE), 2.0);
        assert_eq!(AccessibilityPreferences::factor(NEUTRAL), 1.0);
        assert_eq!(AccessibilityPreferences::factor(PREFER), 0.5);
        // Out-of-alphabet values fall back to neutral and never forbid.
        assert_eq!(AccessibilityPreferences::factor(7), 1.0);
        assert!(AccessibilityPreferences::forbids(FORBID));
        assert!(!AccessibilityPreferences::forbids(7));
    }

    #[test]
    fn test_feed_scoped_id_parse() {
        let id = FeedScopedId::parse_underscore("HSL_1001").unwrap();
        assert_eq!(id.agency, "HSL");
        assert_eq!(id.id, "1001");
        assert_eq!(id.to_string(), "HSL:1001");
        // The id part may itself contain underscores.
        let nested = FeedScopedId::parse_underscore("HSL_1001_a").unwrap();
        assert_eq!(nested.id, "1001_a");
        assert!(FeedScopedId::parse_underscore("no-separator").is_none());
        assert!(FeedScopedId::parse_underscore("_orphan").is_none());
    }

    #[test]
    fn test_finalize_builds_bike_walking_options() {
        let mut req = RoutingRequest {
            modes: TraverseModeSet::BICYCLE | TraverseModeSet::WALK,
            ..RoutingRequest::default()
        };
        req.finalize();
        let walk = req.bike_walking_options.as_deref().unwrap();
        assert!(walk.walking_bike);
        assert!(!walk.modes.contains(TraverseModeSet::BICYCLE));
        approx::assert_relative_eq!(walk.walk_speed, req.walk_speed * 0.8);
        approx::assert_relative_eq!(walk.walk_reluctance, req.walk_reluctance * 2.7);
        assert!(walk.bike_walking_options.is_none());

        // Finalizing twice changes nothing.
        let once = req.clone();
        req.finalize();
        assert_eq!(once, req);
    }

    #[test]
    fn test_finalize_without_bicycle_clears_sub_request() {
        let mut req = RoutingRequest::default();
        req.finalize();
        assert!(req.bike_walking_options.is_none());
        assert!(std::ptr::eq(req.walking_options(), &req));
    }

    #[test]
    fn test_banned_stops_contains() {
        assert!(BannedStops::All.contains(3));
        let some: FxHashSet<u32> = [0, 4].into_iter().collect();
        let banned = BannedStops::Indices(some);
        assert!(banned.contains(4));
        assert!(!banned.contains(1));
    }
}
