//! The recognized request parameters and the pick rules over them.
//!
//! The HTTP layer binds every query parameter as a list of repeated
//! occurrences. Assembly selects the n-th occurrence (or the last one, when
//! fewer were sent) so that one URL can describe several related requests
//! through parallel lists. Numeric `-1` / `-1.0` act as the "unspecified"
//! sentinel and fall back to the prototype value.

use kerb_routing::Optimize;
use serde::Deserialize;

/// A value that may carry the "unspecified" sentinel.
pub trait ParamValue: Clone {
    fn is_unset(&self) -> bool {
        false
    }
}

impl ParamValue for bool {}
impl ParamValue for String {}
impl ParamValue for Optimize {}

impl ParamValue for i32 {
    fn is_unset(&self) -> bool {
        *self == -1
    }
}

impl ParamValue for i64 {
    fn is_unset(&self) -> bool {
        *self == -1
    }
}

impl ParamValue for f64 {
    fn is_unset(&self) -> bool {
        *self == -1.0
    }
}

/// The n-th occurrence, unless it is absent or the sentinel.
pub fn pick_opt<T: ParamValue>(values: &[T], index: usize) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let value = values[index.min(values.len() - 1)].clone();
    if value.is_unset() {
        None
    } else {
        Some(value)
    }
}

/// Like `pick_opt`, falling back to `default`.
pub fn pick<T: ParamValue>(values: &[T], index: usize, default: T) -> T {
    pick_opt(values, index).unwrap_or(default)
}

/// The n-th occurrence without sentinel handling, for fields whose alphabet
/// includes `-1` as a meaningful value (the accessibility preferences).
pub fn pick_raw<T: Clone>(values: &[T], index: usize, default: T) -> T {
    if values.is_empty() {
        return default;
    }
    values[index.min(values.len() - 1)].clone()
}

/// Every option the assembler recognizes, one list per parameter.
///
/// `#[serde(default)]` lets the HTTP layer deserialize a query string
/// directly: parameters that were not sent are empty lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestParams {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub date: Vec<String>,
    pub time: Vec<String>,
    pub arrive_by: Vec<bool>,
    pub wheelchair: Vec<bool>,
    pub locale: Vec<String>,
    pub mode: Vec<String>,

    pub optimize: Vec<Optimize>,
    pub triangle_safety_factor: Vec<f64>,
    pub triangle_slope_factor: Vec<f64>,
    pub triangle_time_factor: Vec<f64>,

    pub walk_speed: Vec<f64>,
    pub bike_speed: Vec<f64>,
    pub max_walk_distance: Vec<f64>,
    pub walk_reluctance: Vec<f64>,
    pub wait_reluctance: Vec<f64>,
    pub wait_at_beginning_factor: Vec<f64>,
    pub stairs_reluctance: Vec<f64>,
    pub turn_reluctance: Vec<f64>,

    pub walk_board_cost: Vec<i32>,
    pub bike_board_cost: Vec<i32>,
    pub bike_switch_time: Vec<i32>,
    pub bike_switch_cost: Vec<i32>,
    pub transfer_penalty: Vec<i32>,
    pub board_slack: Vec<i32>,
    pub alight_slack: Vec<i32>,
    pub min_transfer_time: Vec<i32>,
    pub max_transfers: Vec<i32>,
    pub max_pre_transit_time: Vec<i32>,
    pub clamp_initial_wait: Vec<i64>,
    pub batch: Vec<bool>,

    pub preferred_routes: Vec<String>,
    pub unpreferred_routes: Vec<String>,
    pub banned_routes: Vec<String>,
    pub preferred_agencies: Vec<String>,
    pub unpreferred_agencies: Vec<String>,
    pub banned_agencies: Vec<String>,
    pub banned_trips: Vec<String>,
    pub banned_stops: Vec<String>,
    pub banned_stops_hard: Vec<String>,
    pub start_transit_stop_id: Vec<String>,
    pub start_transit_trip_id: Vec<String>,

    pub permit_crossing: Vec<i32>,
    pub permit_bollard: Vec<i32>,
    pub permit_cycle_barrier: Vec<i32>,
    pub permit_turnstile: Vec<i32>,
    pub permit_traffic_light_sound: Vec<i32>,
    pub permit_traffic_light_vibration: Vec<i32>,
    pub permit_traffic_light_vibration_floor: Vec<i32>,
    pub permit_footway: Vec<bool>,
}
