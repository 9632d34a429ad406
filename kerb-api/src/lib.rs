//! kerb-api: routing request assembly.
//!
//! The HTTP layer binds each query parameter as a list of repeated
//! occurrences and hands them over as a [`RequestParams`]. This crate turns
//! that bundle into one immutable [`kerb_routing::RoutingRequest`]: pick the
//! n-th occurrence per field with sentinel-aware defaulting, resolve times
//! against the graph's home timezone, parse the qualified mode set and the
//! ban lists, and cross-validate (bicycle triangle, transfer slacks) before
//! the search ever sees the request.

pub mod assemble;
pub mod banned;
pub mod error;
pub mod locale;
pub mod params;
pub mod when;

pub use assemble::{assemble, assemble_at};
pub use banned::{parse_banned_trips, parse_list, parse_stop_set};
pub use error::ParameterError;
pub use locale::parse_locale;
pub use params::{pick, pick_opt, pick_raw, RequestParams};
pub use when::resolve_date_time;
