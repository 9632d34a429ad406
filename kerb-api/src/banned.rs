//! Parsers for the ban and preference list parameters.

use kerb_routing::{BannedStops, FeedScopedId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

/// Parse a banned-trips list: `agency:trip[:stopIndex...]` entries joined
/// by commas.
///
/// An entry with fewer than two colon-parts is silently skipped. Without
/// stop indices the whole trip is banned; with them only boarding at those
/// stop positions is. Unparseable indices are dropped with a warning.
pub fn parse_banned_trips(input: &str) -> FxHashMap<FeedScopedId, BannedStops> {
    let mut banned = FxHashMap::default();
    for entry in input.split(',') {
        let mut parts = entry.split(':');
        let (Some(agency), Some(trip)) = (parts.next(), parts.next()) else {
            continue;
        };
        if agency.is_empty() || trip.is_empty() {
            continue;
        }
        let trip_id = FeedScopedId::new(agency, trip);
        let indices: FxHashSet<u32> = parts
            .filter_map(|part| match part.parse() {
                Ok(index) => Some(index),
                Err(_) => {
                    warn!(entry, part, "ignoring unparseable banned stop index");
                    None
                }
            })
            .collect();
        let stops = if indices.is_empty() {
            BannedStops::All
        } else {
            BannedStops::Indices(indices)
        };
        banned.insert(trip_id, stops);
    }
    banned
}

/// Parse a comma-separated set of `agency_stop` identifiers. Malformed
/// entries are dropped with a warning.
pub fn parse_stop_set(input: &str) -> FxHashSet<FeedScopedId> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = FeedScopedId::parse_underscore(entry);
            if parsed.is_none() {
                warn!(entry, "ignoring malformed stop identifier");
            }
            parsed
        })
        .collect()
}

/// Split a comma-separated route or agency list into trimmed entries.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}
