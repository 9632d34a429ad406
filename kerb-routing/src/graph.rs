//! The slice of the street graph the traversal core consumes.
//!
//! The real graph is produced by the loader; this module only models the
//! surface the cost kernel reads: index-addressed vertex and edge tables,
//! per-edge turn restriction lists and the home timezone. Everything is
//! mutable while loading and shared read-only between searches afterwards.

use chrono_tz::Tz;
use rustc_hash::FxHashMap;

use crate::edge::StreetEdge;
use crate::turn::TurnRestriction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

/// A graph vertex. Intersection vertices are where turn costs apply;
/// temporary vertices created by request-time edge splitting are not
/// intersections.
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    intersection: bool,
}

impl Vertex {
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn is_intersection(&self) -> bool {
        self.intersection
    }
}

#[cfg(test)]
impl Vertex {
    pub(crate) fn test_intersection() -> Self {
        Vertex {
            id: VertexId(0),
            intersection: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreetGraph {
    vertices: Vec<Vertex>,
    edges: Vec<StreetEdge>,
    turn_restrictions: FxHashMap<EdgeId, Vec<TurnRestriction>>,
    time_zone: Tz,
}

impl StreetGraph {
    pub fn new(time_zone: Tz) -> Self {
        StreetGraph {
            vertices: Vec::new(),
            edges: Vec::new(),
            turn_restrictions: FxHashMap::default(),
            time_zone,
        }
    }

    /// The timezone all request-local times resolve in.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn add_vertex(&mut self, intersection: bool) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex { id, intersection });
        id
    }

    /// Id the next `add_edge` call will store under.
    pub fn next_edge_id(&self) -> EdgeId {
        EdgeId(self.edges.len() as u32)
    }

    pub fn add_edge(&mut self, edge: StreetEdge) -> EdgeId {
        debug_assert_eq!(edge.id(), self.next_edge_id());
        let id = edge.id();
        self.edges.push(edge);
        id
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0 as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &StreetEdge {
        &self.edges[id.0 as usize]
    }

    /// Load-time access for flag and elevation tagging.
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut StreetEdge {
        &mut self.edges[id.0 as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Attach a restriction to the edge the restricted turn starts from.
    pub fn add_turn_restriction(&mut self, from: EdgeId, restriction: TurnRestriction) {
        self.turn_restrictions.entry(from).or_default().push(restriction);
    }

    /// Restrictions on turns out of `from`. Expected to be a short list.
    pub fn turn_restrictions(&self, from: EdgeId) -> &[TurnRestriction] {
        self.turn_restrictions
            .get(&from)
            .map_or(&[], Vec::as_slice)
    }
}
