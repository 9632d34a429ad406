//! Packed per-edge boolean attributes.
//!
//! Every street edge carries one 16-bit word of flags. The low bits describe
//! the edge itself (direction, stairs, footway...), the high bits mark
//! obstacles and accessibility aids found on it (bollards, turnstiles,
//! accessible traffic lights). Bit positions are part of the serialized graph
//! format and must not be reordered.

use bitflags::bitflags;

bitflags! {
    /// Edge attribute bits. Set once while the graph is loaded, read-only
    /// during the search.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EdgeFlags: u16 {
        /// Reverse edge of a two-way street pair.
        const BACK = 1 << 0;
        const ROUNDABOUT = 1 << 1;
        /// The name was generated, not mapped.
        const BOGUS_NAME = 1 << 2;
        const NO_THRU_TRAFFIC = 1 << 3;
        const STAIRS = 1 << 4;
        /// Elevation data must not overwrite the mapped slope.
        const SLOPE_OVERRIDE = 1 << 5;
        const WHEELCHAIR_ACCESSIBLE = 1 << 6;
        const FOOTWAY = 1 << 7;
        const CROSSING = 1 << 8;
        const BOLLARD = 1 << 9;
        const TURNSTILE = 1 << 10;
        const CYCLE_BARRIER = 1 << 11;
        const TRAFFIC_LIGHT_SOUND = 1 << 12;
        const TRAFFIC_LIGHT_VIBRATION = 1 << 13;
        const TRAFFIC_LIGHT_FLOOR_VIBRATION = 1 << 14;
    }
}
