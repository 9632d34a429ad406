//! Assembly behavior: sentinel defaulting, cross-field validation and the
//! prototype overlay.

use approx::assert_relative_eq;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Helsinki;
use kerb_api::{assemble_at, ParameterError, RequestParams};
use kerb_routing::{FeedScopedId, Optimize, RoutingRequest, TraverseModeSet};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()
}

fn build(params: &RequestParams) -> Result<RoutingRequest, ParameterError> {
    assemble_at(params, 0, &RoutingRequest::default(), Helsinki, fixed_now())
}

#[test]
fn test_empty_params_keep_prototype_values() {
    let request = build(&RequestParams::default()).unwrap();
    let prototype = RoutingRequest::default();
    assert_eq!(request.modes, prototype.modes);
    assert_eq!(request.walk_board_cost, prototype.walk_board_cost);
    assert_relative_eq!(request.walk_speed, prototype.walk_speed);
    assert_eq!(request.optimize, Optimize::Quick);
    // No date/time parameters: the request departs now.
    assert_eq!(request.date_time, fixed_now().timestamp());
    // A now-ish request gets live rental availability.
    assert!(request.use_bike_rental_availability_information);
}

#[test]
fn test_sentinel_leaves_prototype_value() {
    let params = RequestParams {
        walk_board_cost: vec![-1],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!(request.walk_board_cost, RoutingRequest::default().walk_board_cost);

    let params = RequestParams {
        walk_board_cost: vec![300],
        ..RequestParams::default()
    };
    assert_eq!(build(&params).unwrap().walk_board_cost, 300);
}

#[test]
fn test_parallel_lists_select_by_index() {
    let params = RequestParams {
        from: vec!["Kamppi".to_owned(), "Pasila".to_owned()],
        to: vec!["Airport".to_owned(), "Harbour".to_owned()],
        walk_reluctance: vec![2.0, 3.0],
        ..RequestParams::default()
    };
    let prototype = RoutingRequest::default();
    let second = assemble_at(&params, 1, &prototype, Helsinki, fixed_now()).unwrap();
    assert_eq!(second.from_place, "Pasila");
    assert_eq!(second.to_place, "Harbour");
    assert_relative_eq!(second.walk_reluctance, 3.0);

    // An index past the end selects the last occurrence.
    let clamped = assemble_at(&params, 7, &prototype, Helsinki, fixed_now()).unwrap();
    assert_eq!(clamped.from_place, "Pasila");
}

#[test]
fn test_underspecified_triangle() {
    let params = RequestParams {
        triangle_safety_factor: vec![0.5],
        ..RequestParams::default()
    };
    assert_eq!(build(&params), Err(ParameterError::UnderspecifiedTriangle));
}

#[test]
fn test_triangle_requires_triangle_optimize() {
    let params = RequestParams {
        optimize: vec![Optimize::Safe],
        triangle_safety_factor: vec![0.4],
        triangle_slope_factor: vec![0.4],
        triangle_time_factor: vec![0.2],
        ..RequestParams::default()
    };
    assert_eq!(build(&params), Err(ParameterError::TriangleOptimizeTypeNotSet));
}

#[test]
fn test_triangle_must_be_affine() {
    let params = RequestParams {
        triangle_safety_factor: vec![0.5],
        triangle_slope_factor: vec![0.4],
        triangle_time_factor: vec![0.2],
        ..RequestParams::default()
    };
    assert_eq!(build(&params), Err(ParameterError::TriangleNotAffine));
}

#[test]
fn test_triangle_optimize_without_values() {
    let params = RequestParams {
        optimize: vec![Optimize::Triangle],
        ..RequestParams::default()
    };
    assert_eq!(build(&params), Err(ParameterError::TriangleValuesNotSet));
}

#[test]
fn test_affine_triangle_defaults_optimize_to_triangle() {
    let params = RequestParams {
        triangle_safety_factor: vec![0.4],
        triangle_slope_factor: vec![0.4],
        triangle_time_factor: vec![0.2],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!(request.optimize, Optimize::Triangle);
    assert_relative_eq!(request.triangle_safety_factor, 0.4);
    assert_relative_eq!(request.triangle_slope_factor, 0.4);
    assert_relative_eq!(request.triangle_time_factor, 0.2);
}

#[test]
fn test_transfers_is_rewritten_to_quick() {
    let params = RequestParams {
        optimize: vec![Optimize::Transfers],
        transfer_penalty: vec![100],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!(request.optimize, Optimize::Quick);
    assert_eq!(request.transfer_penalty, 1900);
}

#[test]
fn test_slack_invariant() {
    let params = RequestParams {
        board_slack: vec![120],
        alight_slack: vec![120],
        min_transfer_time: vec![180],
        ..RequestParams::default()
    };
    assert_eq!(
        build(&params),
        Err(ParameterError::SlackInvariant {
            board: 120,
            alight: 120,
            transfer: 180
        })
    );

    let params = RequestParams {
        board_slack: vec![60],
        alight_slack: vec![60],
        min_transfer_time: vec![120],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!((request.board_slack, request.alight_slack, request.transfer_slack), (60, 60, 120));
}

#[test]
fn test_locale_keeps_language_only() {
    let params = RequestParams {
        locale: vec!["it_IT".to_owned()],
        ..RequestParams::default()
    };
    assert_eq!(build(&params).unwrap().locale.language, "it");

    let params = RequestParams {
        locale: vec!["123".to_owned()],
        ..RequestParams::default()
    };
    assert_eq!(build(&params).unwrap().locale.language, "en");
}

#[test]
fn test_qualified_mode_set() {
    let params = RequestParams {
        mode: vec!["CAR_KISS,TRANSIT,WALK".to_owned()],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert!(request.kiss_and_ride);
    assert!(!request.park_and_ride);
    assert_eq!(
        request.modes,
        TraverseModeSet::CAR | TraverseModeSet::TRANSIT | TraverseModeSet::WALK
    );

    let params = RequestParams {
        mode: vec!["CAR_PARK,BUS,WALK".to_owned()],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert!(request.park_and_ride);
    assert!(request.modes.contains(TraverseModeSet::TRANSIT));

    let params = RequestParams {
        mode: vec!["JETPACK".to_owned()],
        ..RequestParams::default()
    };
    assert_eq!(build(&params), Err(ParameterError::UnknownMode("JETPACK".to_owned())));
}

#[test]
fn test_rental_bikes_get_default_speed() {
    let params = RequestParams {
        mode: vec!["BICYCLE_RENT,WALK".to_owned()],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert!(request.bike_rental);
    assert_relative_eq!(request.bike_speed, 4.3);
    // The bicycle mode also means the dismounted sub-request exists.
    assert!(request.bike_walking_options.is_some());

    let params = RequestParams {
        mode: vec!["BICYCLE_RENT,WALK".to_owned()],
        bike_speed: vec![6.0],
        ..RequestParams::default()
    };
    assert_relative_eq!(build(&params).unwrap().bike_speed, 6.0);
}

#[test]
fn test_banned_trips_and_stops_are_wired_in() {
    let params = RequestParams {
        banned_trips: vec!["HSL:1001:0:5,HSL:2002".to_owned()],
        banned_stops: vec!["HSL_123".to_owned()],
        banned_stops_hard: vec!["HSL_456,HSL_789".to_owned()],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!(request.banned_trips.len(), 2);
    assert!(request.banned_trips[&FeedScopedId::new("HSL", "1001")].contains(5));
    assert!(request.banned_trips[&FeedScopedId::new("HSL", "2002")].contains(17));
    assert!(request.banned_stops.contains(&FeedScopedId::new("HSL", "123")));
    assert_eq!(request.banned_stops_hard.len(), 2);
}

#[test]
fn test_starting_stop_and_trip_ids() {
    let params = RequestParams {
        start_transit_stop_id: vec!["HSL_1030423".to_owned()],
        start_transit_trip_id: vec!["HSL_1055_20260801".to_owned()],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!(
        request.start_transit_stop_id,
        Some(FeedScopedId::new("HSL", "1030423"))
    );
    assert_eq!(
        request.start_transit_trip_id,
        Some(FeedScopedId::new("HSL", "1055_20260801"))
    );
}

#[test]
fn test_forbid_preference_survives_the_sentinel_rule() {
    let params = RequestParams {
        permit_bollard: vec![-1],
        permit_crossing: vec![0],
        permit_turnstile: vec![2],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    assert_eq!(request.accessibility.bollard, -1);
    assert_eq!(request.accessibility.crossing, 0);
    assert_eq!(request.accessibility.turnstile, 2);
    // Untouched fields keep the neutral prototype value.
    assert_eq!(request.accessibility.cycle_barrier, 1);
}

#[test]
fn test_date_time_resolution_in_home_zone() {
    let params = RequestParams {
        date: vec!["2026-08-01".to_owned()],
        time: vec!["08:30".to_owned()],
        ..RequestParams::default()
    };
    let request = build(&params).unwrap();
    let expected = Helsinki
        .with_ymd_and_hms(2026, 8, 1, 8, 30, 0)
        .unwrap()
        .timestamp();
    assert_eq!(request.date_time, expected);

    // Far-future requests are not "planned for now".
    let params = RequestParams {
        date: vec!["2026-12-24".to_owned()],
        time: vec!["08:30".to_owned()],
        ..RequestParams::default()
    };
    assert!(!build(&params).unwrap().use_bike_rental_availability_information);
}

#[test]
fn test_assembly_is_repeatable_and_clone_equivalent() {
    let params = RequestParams {
        mode: vec!["BICYCLE,WALK".to_owned()],
        walk_reluctance: vec![3.0],
        wheelchair: vec![true],
        permit_crossing: vec![2],
        banned_trips: vec!["HSL:1001".to_owned()],
        ..RequestParams::default()
    };
    let first = build(&params).unwrap();
    let second = build(&params).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.clone(), second);
}

#[test]
fn test_params_deserialize_from_camel_case() {
    let params: RequestParams = serde_json::from_str(
        r#"{
            "from": ["Kamppi"],
            "arriveBy": [true],
            "walkReluctance": [2.5],
            "permitTrafficLightVibrationFloor": [-1],
            "minTransferTime": [180],
            "mode": ["WALK,TRANSIT"]
        }"#,
    )
    .unwrap();
    assert_eq!(params.from, vec!["Kamppi".to_owned()]);
    assert_eq!(params.arrive_by, vec![true]);
    assert_eq!(params.walk_reluctance, vec![2.5]);
    assert_eq!(params.permit_traffic_light_vibration_floor, vec![-1]);
    assert_eq!(params.min_transfer_time, vec![180]);
}
