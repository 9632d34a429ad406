//! The street edge model.
//!
//! Edges are built once by the graph loader, tagged through the flag and
//! elevation setters while loading, and shared read-only between concurrent
//! searches afterwards. Storage is deliberately compact: lengths are
//! fixed-point millimeters, entry/exit azimuths are single signed bytes in
//! brads, geometry is a boxed slice of fixed-point E6 coordinates.

use std::f64::consts::PI;

use geo_types::Coord;
use tracing::warn;

use crate::flags::EdgeFlags;
use crate::graph::{EdgeId, VertexId};
use crate::mode::TraversalPermission;

/// Coarse functional classification of a street edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreetClass {
    #[default]
    Street,
    Crossing,
    OtherPath,
    Platform,
    TrainPlatform,
}

/// Fixed-point E6 line string: interleaved `(lon, lat)` pairs scaled by 1e6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactGeometry(Box<[i32]>);

impl CompactGeometry {
    const SCALE: f64 = 1e6;

    pub fn from_coords(coords: &[Coord]) -> Self {
        let mut packed = Vec::with_capacity(coords.len() * 2);
        for c in coords {
            packed.push((c.x * Self::SCALE).round() as i32);
            packed.push((c.y * Self::SCALE).round() as i32);
        }
        CompactGeometry(packed.into_boxed_slice())
    }

    pub fn decode(&self) -> Vec<Coord> {
        self.0
            .chunks_exact(2)
            .map(|pair| Coord {
                x: f64::from(pair[0]) / Self::SCALE,
                y: f64::from(pair[1]) / Self::SCALE,
            })
            .collect()
    }

    pub fn point_count(&self) -> usize {
        self.0.len() / 2
    }
}

/// Azimuth of the segment `a -> b`, in radians in `(-pi, pi]`.
/// Returns `None` for a degenerate (zero-length or non-finite) segment.
fn segment_azimuth(a: Coord, b: Coord) -> Option<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
        return None;
    }
    Some(dy.atan2(dx))
}

/// Encode an azimuth in radians into a signed-byte brad.
///
/// `byte = round(radians * 128/pi) + 128`, wrapped through `u8`. The wrap
/// makes 180 degrees come back out negative from the accessor; graphs are
/// serialized with this encoding, so the quirk stays.
fn encode_angle(radians: f64) -> i8 {
    let brads = (radians * 128.0 / PI).round() as i32 + 128;
    brads as u8 as i8
}

/// One directed street segment.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetEdge {
    id: EdgeId,
    from: VertexId,
    to: VertexId,
    name: String,
    /// Fixed-point length; supports edges up to roughly 2 100 km.
    length_mm: i32,
    bicycle_safety_factor: f32,
    permission: TraversalPermission,
    car_speed: f32,
    in_angle: i8,
    out_angle: i8,
    street_class: StreetClass,
    geometry: Option<CompactGeometry>,
    flags: EdgeFlags,
    /// Graph edge this temporary edge was split from, if any.
    parent: Option<EdgeId>,
    max_slope: f32,
    slope_speed_effective_length: f64,
    slope_work_cost_effective_length: f64,
}

impl StreetEdge {
    pub fn new(
        id: EdgeId,
        from: VertexId,
        to: VertexId,
        name: impl Into<String>,
        length_mm: i32,
        permission: TraversalPermission,
        back: bool,
    ) -> Self {
        let length_mm = length_mm.max(0);
        let distance = f64::from(length_mm) / 1000.0;
        let mut flags = EdgeFlags::default();
        flags.set(EdgeFlags::BACK, back);
        StreetEdge {
            id,
            from,
            to,
            name: name.into(),
            length_mm,
            bicycle_safety_factor: 1.0,
            permission,
            car_speed: 11.2,
            in_angle: 0,
            out_angle: 0,
            street_class: StreetClass::Street,
            geometry: None,
            flags,
            parent: None,
            max_slope: 0.0,
            slope_speed_effective_length: distance,
            slope_work_cost_effective_length: distance,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn from_vertex(&self) -> VertexId {
        self.from
    }

    pub fn to_vertex(&self) -> VertexId {
        self.to
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in meters, converted out of the fixed-point store.
    pub fn distance_m(&self) -> f64 {
        f64::from(self.length_mm) / 1000.0
    }

    pub fn length_mm(&self) -> i32 {
        self.length_mm
    }

    pub fn permission(&self) -> TraversalPermission {
        self.permission
    }

    pub fn bicycle_safety_factor(&self) -> f32 {
        self.bicycle_safety_factor
    }

    pub fn car_speed(&self) -> f32 {
        self.car_speed
    }

    pub fn street_class(&self) -> StreetClass {
        self.street_class
    }

    pub fn geometry(&self) -> Option<&CompactGeometry> {
        self.geometry.as_ref()
    }

    pub fn parent(&self) -> Option<EdgeId> {
        self.parent
    }

    /// Azimuth at the end of the edge, in integer degrees in `[-180, 180)`.
    pub fn in_angle(&self) -> i32 {
        i32::from(self.in_angle) * 180 / 128
    }

    /// Azimuth at the start of the edge, in integer degrees in `[-180, 180)`.
    pub fn out_angle(&self) -> i32 {
        i32::from(self.out_angle) * 180 / 128
    }

    pub fn max_slope(&self) -> f32 {
        self.max_slope
    }

    pub fn slope_speed_effective_length(&self) -> f64 {
        self.slope_speed_effective_length
    }

    pub fn slope_work_cost_effective_length(&self) -> f64 {
        self.slope_work_cost_effective_length
    }

    // Flag accessors.

    pub fn is_back(&self) -> bool {
        self.flags.contains(EdgeFlags::BACK)
    }

    pub fn is_roundabout(&self) -> bool {
        self.flags.contains(EdgeFlags::ROUNDABOUT)
    }

    pub fn has_bogus_name(&self) -> bool {
        self.flags.contains(EdgeFlags::BOGUS_NAME)
    }

    pub fn is_no_thru_traffic(&self) -> bool {
        self.flags.contains(EdgeFlags::NO_THRU_TRAFFIC)
    }

    pub fn is_stairs(&self) -> bool {
        self.flags.contains(EdgeFlags::STAIRS)
    }

    pub fn has_slope_override(&self) -> bool {
        self.flags.contains(EdgeFlags::SLOPE_OVERRIDE)
    }

    pub fn is_wheelchair_accessible(&self) -> bool {
        self.flags.contains(EdgeFlags::WHEELCHAIR_ACCESSIBLE)
    }

    pub fn is_footway(&self) -> bool {
        self.flags.contains(EdgeFlags::FOOTWAY)
    }

    pub fn is_crossing(&self) -> bool {
        self.flags.contains(EdgeFlags::CROSSING)
    }

    pub fn contains_bollard(&self) -> bool {
        self.flags.contains(EdgeFlags::BOLLARD)
    }

    pub fn contains_turnstile(&self) -> bool {
        self.flags.contains(EdgeFlags::TURNSTILE)
    }

    pub fn contains_cycle_barrier(&self) -> bool {
        self.flags.contains(EdgeFlags::CYCLE_BARRIER)
    }

    pub fn has_traffic_light_sound(&self) -> bool {
        self.flags.contains(EdgeFlags::TRAFFIC_LIGHT_SOUND)
    }

    pub fn has_traffic_light_vibration(&self) -> bool {
        self.flags.contains(EdgeFlags::TRAFFIC_LIGHT_VIBRATION)
    }

    pub fn has_traffic_light_floor_vibration(&self) -> bool {
        self.flags.contains(EdgeFlags::TRAFFIC_LIGHT_FLOOR_VIBRATION)
    }

    pub fn flags(&self) -> EdgeFlags {
        self.flags
    }

    // Load-time setters. The graph builder calls these while tagging;
    // nothing mutates an edge once the search starts.

    pub fn set_flag(&mut self, flag: EdgeFlags, value: bool) {
        self.flags.set(flag, value);
    }

    pub fn set_bicycle_safety_factor(&mut self, factor: f32) {
        self.bicycle_safety_factor = factor;
    }

    pub fn set_car_speed(&mut self, speed: f32) {
        self.car_speed = speed;
    }

    pub fn set_street_class(&mut self, class: StreetClass) {
        self.street_class = class;
    }

    pub fn set_parent(&mut self, parent: EdgeId) {
        self.parent = Some(parent);
    }

    /// Attach geometry and derive the entry/exit azimuths from its first and
    /// last segments. A degenerate line string keeps the geometry but logs
    /// and zeroes both angles.
    pub fn set_geometry(&mut self, geometry: CompactGeometry) {
        let coords = geometry.decode();
        let first = coords
            .first()
            .zip(coords.get(1))
            .and_then(|(a, b)| segment_azimuth(*a, *b));
        let last = (coords.len() >= 2)
            .then(|| (coords[coords.len() - 2], coords[coords.len() - 1]))
            .and_then(|(a, b)| segment_azimuth(a, b));
        match (first, last) {
            (Some(first), Some(last)) => {
                self.out_angle = encode_angle(first);
                self.in_angle = encode_angle(last);
            }
            _ => {
                warn!(
                    edge = self.id.0,
                    name = %self.name,
                    "could not derive azimuths from edge geometry, zeroing angles"
                );
                self.out_angle = 0;
                self.in_angle = 0;
            }
        }
        self.geometry = Some(geometry);
    }

    /// Record the elevation profile computed for this edge. Ignored when the
    /// edge carries a slope override.
    pub fn set_elevation_profile(
        &mut self,
        max_slope: f32,
        slope_speed_effective_length: f64,
        slope_work_cost_effective_length: f64,
    ) {
        if self.has_slope_override() {
            return;
        }
        self.max_slope = max_slope;
        self.slope_speed_effective_length = slope_speed_effective_length;
        self.slope_work_cost_effective_length = slope_work_cost_effective_length;
    }

    /// True when `other` runs between the same vertices in the opposite
    /// direction and has the same length.
    pub fn is_reverse_of(&self, other: &StreetEdge) -> bool {
        self.from == other.to && self.to == other.from && self.length_mm == other.length_mm
    }

    /// Equivalence for turn restriction matching. A temporary edge split
    /// from a graph edge carries that edge as its parent and counts as
    /// equivalent to it.
    pub fn is_equivalent_to(&self, other: &StreetEdge) -> bool {
        self.id == other.id
            || self.parent == Some(other.id)
            || other.parent == Some(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: u32, from: u32, to: u32, length_mm: i32) -> StreetEdge {
        StreetEdge::new(
            EdgeId(id),
            VertexId(from),
            VertexId(to),
            "Test street",
            length_mm,
            TraversalPermission::ALL,
            false,
        )
    }

    #[test]
    fn test_fixed_point_length() {
        let e = edge(1, 0, 1, 12_345);
        assert_eq!(e.distance_m(), 12.345);
        assert_eq!(edge(2, 0, 1, -5).length_mm(), 0);
    }

    #[test]
    fn test_angle_encoding_east_and_north() {
        // Heading east: azimuth 0 -> brad 128 -> -128 as i8 -> -180 degrees.
        assert_eq!(i32::from(encode_angle(0.0)) * 180 / 128, -180);
        // Heading north: azimuth pi/2 -> brad 192 -> -64 -> -90 degrees.
        assert_eq!(i32::from(encode_angle(PI / 2.0)) * 180 / 128, -90);
        // Heading west: azimuth pi wraps to byte 0 -> 0 degrees.
        assert_eq!(i32::from(encode_angle(PI)) * 180 / 128, 0);
    }

    #[test]
    fn test_geometry_derives_angles() {
        let mut e = edge(1, 0, 1, 100_000);
        let geometry = CompactGeometry::from_coords(&[
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.001, y: 0.0 },
            Coord { x: 0.001, y: 0.001 },
        ]);
        e.set_geometry(geometry);
        // First segment heads east, last segment heads north.
        assert_eq!(e.out_angle(), -180);
        assert_eq!(e.in_angle(), -90);
    }

    #[test]
    fn test_degenerate_geometry_zeroes_angles() {
        let mut e = edge(1, 0, 1, 100_000);
        e.set_geometry(CompactGeometry::from_coords(&[Coord { x: 1.0, y: 2.0 }]));
        assert_eq!(e.out_angle(), 0);
        assert_eq!(e.in_angle(), 0);
        assert!(e.geometry().is_some());
    }

    #[test]
    fn test_slope_override_suppresses_elevation() {
        let mut e = edge(1, 0, 1, 50_000);
        e.set_flag(EdgeFlags::SLOPE_OVERRIDE, true);
        e.set_elevation_profile(0.2, 75.0, 90.0);
        assert_eq!(e.max_slope(), 0.0);
        assert_eq!(e.slope_speed_effective_length(), 50.0);

        let mut plain = edge(2, 0, 1, 50_000);
        plain.set_elevation_profile(0.2, 75.0, 90.0);
        assert_eq!(plain.max_slope(), 0.2);
        assert_eq!(plain.slope_work_cost_effective_length(), 90.0);
    }

    #[test]
    fn test_reverse_and_equivalence() {
        let ab = edge(1, 0, 1, 10_000);
        let ba = edge(2, 1, 0, 10_000);
        let other = edge(3, 1, 0, 20_000);
        assert!(ab.is_reverse_of(&ba));
        assert!(ba.is_reverse_of(&ab));
        assert!(!ab.is_reverse_of(&other));

        let mut split = edge(9, 0, 5, 4_000);
        split.set_parent(EdgeId(1));
        assert!(split.is_equivalent_to(&ab));
        assert!(ab.is_equivalent_to(&split));
        assert!(!split.is_equivalent_to(&ba));
    }

    #[test]
    fn test_geometry_round_trip() {
        let coords = [
            Coord { x: 13.404954, y: 52.520008 },
            Coord { x: 13.405537, y: 52.520375 },
        ];
        let packed = CompactGeometry::from_coords(&coords);
        let decoded = packed.decode();
        assert_eq!(decoded.len(), 2);
        assert!((decoded[0].x - coords[0].x).abs() < 1e-6);
        assert!((decoded[1].y - coords[1].y).abs() < 1e-6);
    }
}
