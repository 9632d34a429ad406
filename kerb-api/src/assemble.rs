//! Assembly of a `RoutingRequest` from repeated parameter lists.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kerb_routing::{Optimize, RoutingRequest, TraverseModeSet};
use tracing::warn;

use crate::banned::{parse_banned_trips, parse_list, parse_stop_set};
use crate::error::ParameterError;
use crate::locale::parse_locale;
use crate::params::{pick, pick_opt, pick_raw, RequestParams};
use crate::when::resolve_date_time;

/// Speed assumed for rental bikes when the user did not give one.
const RENTAL_BIKE_SPEED: f64 = 4.3;

/// A request is considered "planned for now" within this window, enabling
/// live bike rental availability.
const RENTAL_FRESHNESS_WINDOW_MS: i64 = 15 * 60 * 60 * 1000;

/// Assemble the `index`-th request described by `params` on top of the
/// process-wide prototype.
pub fn assemble(
    params: &RequestParams,
    index: usize,
    prototype: &RoutingRequest,
    time_zone: Tz,
) -> Result<RoutingRequest, ParameterError> {
    assemble_at(params, index, prototype, time_zone, Utc::now())
}

/// `assemble` with an injected wall clock.
pub fn assemble_at(
    params: &RequestParams,
    index: usize,
    prototype: &RoutingRequest,
    time_zone: Tz,
    now: DateTime<Utc>,
) -> Result<RoutingRequest, ParameterError> {
    let n = index;
    let mut request = prototype.clone();

    if let Some(from) = pick_opt(&params.from, n) {
        request.from_place = from;
    }
    if let Some(to) = pick_opt(&params.to, n) {
        request.to_place = to;
    }

    request.arrive_by = pick(&params.arrive_by, n, request.arrive_by);
    request.wheelchair_accessible = pick(&params.wheelchair, n, request.wheelchair_accessible);
    request.batch = pick(&params.batch, n, request.batch);

    let date = pick_opt(&params.date, n);
    let time = pick_opt(&params.time, n);
    request.date_time = resolve_date_time(date.as_deref(), time.as_deref(), time_zone, now)?;

    request.locale = parse_locale(&pick(&params.locale, n, "en_US".to_owned()));

    if let Some(mode) = pick_opt(&params.mode, n) {
        apply_mode_set(&mut request, &mode)?;
    }

    request.walk_speed = pick(&params.walk_speed, n, request.walk_speed);
    match pick_opt(&params.bike_speed, n) {
        Some(speed) => request.bike_speed = speed,
        None if request.bike_rental => request.bike_speed = RENTAL_BIKE_SPEED,
        None => {}
    }

    request.max_walk_distance = pick(&params.max_walk_distance, n, request.max_walk_distance);
    request.walk_reluctance = pick(&params.walk_reluctance, n, request.walk_reluctance);
    request.wait_reluctance = pick(&params.wait_reluctance, n, request.wait_reluctance);
    request.wait_at_beginning_factor = pick(
        &params.wait_at_beginning_factor,
        n,
        request.wait_at_beginning_factor,
    );
    request.stairs_reluctance = pick(&params.stairs_reluctance, n, request.stairs_reluctance);
    request.turn_reluctance = pick(&params.turn_reluctance, n, request.turn_reluctance);

    request.walk_board_cost = pick(&params.walk_board_cost, n, request.walk_board_cost);
    request.bike_board_cost = pick(&params.bike_board_cost, n, request.bike_board_cost);
    request.bike_switch_time = pick(&params.bike_switch_time, n, request.bike_switch_time);
    request.bike_switch_cost = pick(&params.bike_switch_cost, n, request.bike_switch_cost);
    request.transfer_penalty = pick(&params.transfer_penalty, n, request.transfer_penalty);
    request.max_transfers = pick(&params.max_transfers, n, request.max_transfers);
    request.clamp_initial_wait = pick(&params.clamp_initial_wait, n, request.clamp_initial_wait);
    request.max_pre_transit_time = pick(
        &params.max_pre_transit_time,
        n,
        request.max_pre_transit_time as i32,
    )
    .max(0) as u32;

    request.board_slack = pick(&params.board_slack, n, request.board_slack as i32).max(0) as u32;
    request.alight_slack =
        pick(&params.alight_slack, n, request.alight_slack as i32).max(0) as u32;
    request.transfer_slack =
        pick(&params.min_transfer_time, n, request.transfer_slack as i32).max(0) as u32;
    if request.board_slack + request.alight_slack > request.transfer_slack {
        return Err(ParameterError::SlackInvariant {
            board: request.board_slack,
            alight: request.alight_slack,
            transfer: request.transfer_slack,
        });
    }

    apply_optimize(&mut request, params, n)?;

    if let Some(routes) = pick_opt(&params.preferred_routes, n) {
        request.preferred_routes = parse_list(&routes);
    }
    if let Some(routes) = pick_opt(&params.unpreferred_routes, n) {
        request.unpreferred_routes = parse_list(&routes);
    }
    if let Some(routes) = pick_opt(&params.banned_routes, n) {
        request.banned_routes = parse_list(&routes);
    }
    if let Some(agencies) = pick_opt(&params.preferred_agencies, n) {
        request.preferred_agencies = parse_list(&agencies);
    }
    if let Some(agencies) = pick_opt(&params.unpreferred_agencies, n) {
        request.unpreferred_agencies = parse_list(&agencies);
    }
    if let Some(agencies) = pick_opt(&params.banned_agencies, n) {
        request.banned_agencies = parse_list(&agencies);
    }
    if let Some(trips) = pick_opt(&params.banned_trips, n) {
        request.banned_trips = parse_banned_trips(&trips);
    }
    if let Some(stops) = pick_opt(&params.banned_stops, n) {
        request.banned_stops = parse_stop_set(&stops);
    }
    if let Some(stops) = pick_opt(&params.banned_stops_hard, n) {
        request.banned_stops_hard = parse_stop_set(&stops);
    }

    if let Some(stop) = pick_opt(&params.start_transit_stop_id, n) {
        request.start_transit_stop_id = kerb_routing::FeedScopedId::parse_underscore(&stop);
        if request.start_transit_stop_id.is_none() {
            warn!(stop, "ignoring malformed starting stop identifier");
        }
    }
    if let Some(trip) = pick_opt(&params.start_transit_trip_id, n) {
        request.start_transit_trip_id = kerb_routing::FeedScopedId::parse_underscore(&trip);
        if request.start_transit_trip_id.is_none() {
            warn!(trip, "ignoring malformed starting trip identifier");
        }
    }

    // The accessibility alphabet includes -1 as a meaningful value
    // (forbid), so these fields bypass the sentinel rule.
    let prefs = &mut request.accessibility;
    prefs.crossing = pick_raw(&params.permit_crossing, n, prefs.crossing);
    prefs.bollard = pick_raw(&params.permit_bollard, n, prefs.bollard);
    prefs.cycle_barrier = pick_raw(&params.permit_cycle_barrier, n, prefs.cycle_barrier);
    prefs.turnstile = pick_raw(&params.permit_turnstile, n, prefs.turnstile);
    prefs.traffic_light_sound =
        pick_raw(&params.permit_traffic_light_sound, n, prefs.traffic_light_sound);
    prefs.traffic_light_vibration = pick_raw(
        &params.permit_traffic_light_vibration,
        n,
        prefs.traffic_light_vibration,
    );
    prefs.traffic_light_floor_vibration = pick_raw(
        &params.permit_traffic_light_vibration_floor,
        n,
        prefs.traffic_light_floor_vibration,
    );
    request.permit_footway = pick(&params.permit_footway, n, request.permit_footway);

    request.use_bike_rental_availability_information =
        (request.date_time * 1000 - now.timestamp_millis()).abs() < RENTAL_FRESHNESS_WINDOW_MS;

    request.finalize();
    Ok(request)
}

/// Apply the qualified mode set, e.g. `CAR_KISS,TRANSIT,WALK`.
fn apply_mode_set(request: &mut RoutingRequest, input: &str) -> Result<(), ParameterError> {
    let mut modes = TraverseModeSet::empty();
    let mut bike_rental = false;
    let mut park_and_ride = false;
    let mut kiss_and_ride = false;

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let (mode, qualifier) = match token.split_once('_') {
            Some((mode, qualifier)) => (mode, Some(qualifier)),
            None => (token, None),
        };
        let bit = match mode {
            "WALK" => TraverseModeSet::WALK,
            "BICYCLE" => TraverseModeSet::BICYCLE,
            "CAR" => TraverseModeSet::CAR,
            "TRANSIT" | "BUS" | "RAIL" | "TRAM" | "SUBWAY" | "FERRY" | "GONDOLA"
            | "FUNICULAR" => TraverseModeSet::TRANSIT,
            _ => return Err(ParameterError::UnknownMode(token.to_owned())),
        };
        modes |= bit;
        match qualifier {
            None => {}
            Some("RENT") if bit == TraverseModeSet::BICYCLE => bike_rental = true,
            Some("PARK") if bit == TraverseModeSet::CAR => park_and_ride = true,
            Some("KISS") if bit == TraverseModeSet::CAR => kiss_and_ride = true,
            Some(_) => return Err(ParameterError::UnknownMode(token.to_owned())),
        }
    }

    request.modes = modes;
    request.bike_rental = bike_rental;
    request.park_and_ride = park_and_ride;
    request.kiss_and_ride = kiss_and_ride;
    Ok(())
}

/// Validate and apply the optimize type and the bicycle triangle.
fn apply_optimize(
    request: &mut RoutingRequest,
    params: &RequestParams,
    n: usize,
) -> Result<(), ParameterError> {
    let safety = pick_opt(&params.triangle_safety_factor, n);
    let slope = pick_opt(&params.triangle_slope_factor, n);
    let time = pick_opt(&params.triangle_time_factor, n);
    let optimize = pick_opt(&params.optimize, n);

    match (safety, slope, time) {
        (None, None, None) => {
            if optimize == Some(Optimize::Triangle) {
                return Err(ParameterError::TriangleValuesNotSet);
            }
            if let Some(optimize) = optimize {
                request.optimize = optimize;
            }
        }
        (Some(safety), Some(slope), Some(time)) => {
            match optimize {
                // An unset optimize type defaults to TRIANGLE here.
                None | Some(Optimize::Triangle) => {}
                Some(_) => return Err(ParameterError::TriangleOptimizeTypeNotSet),
            }
            if (safety + slope + time - 1.0).abs() > 3.0 * f64::EPSILON {
                return Err(ParameterError::TriangleNotAffine);
            }
            request.optimize = Optimize::Triangle;
            request.triangle_safety_factor = safety;
            request.triangle_slope_factor = slope;
            request.triangle_time_factor = time;
        }
        _ => return Err(ParameterError::UnderspecifiedTriangle),
    }

    // TRANSFERS is not a real optimize type; minimize transfers by making
    // them expensive on an otherwise QUICK search.
    if request.optimize == Optimize::Transfers {
        request.optimize = Optimize::Quick;
        request.transfer_penalty += 1800;
    }
    Ok(())
}
