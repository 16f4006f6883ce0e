//! Keyframe graph edges for line rendering.
//!
//! Three relations overlap on the same keyframes: covisibility, the
//! spanning tree and loop closures. Covisibility and loop links are
//! symmetric, so each is seen from both endpoints; an edge is emitted only
//! from the endpoint with the smaller id (`neighbor >= node`). Spanning-tree
//! links point child to parent and are emitted once per child.

use std::collections::HashSet;

use slamview_core::math::Vec3;

use crate::map::{KeyFrameGraph, KeyFrameId};

/// Default minimum shared-observation weight for a covisibility edge.
pub const DEFAULT_COVISIBILITY_MIN_WEIGHT: u32 = 100;

/// Which relation produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Covisibility,
    SpanningTree,
    Loop,
}

/// An undirected edge between two keyframe camera centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    /// Keyframe whose pass emitted the edge.
    pub from: KeyFrameId,
    pub to: KeyFrameId,
    pub start: [f32; 3],
    pub end: [f32; 3],
}

impl GraphEdge {
    /// The edge as a line segment.
    pub fn segment(&self) -> [[f32; 3]; 2] {
        [self.start, self.end]
    }
}

fn valid_center<G: KeyFrameGraph + ?Sized>(graph: &G, id: KeyFrameId) -> Option<Vec3> {
    if graph.is_bad(id) {
        return None;
    }
    graph.camera_center(id)
}

/// Build the draw edges of the keyframe graph.
///
/// For each keyframe, in the graph's iteration order:
/// 1. covisible neighbors with weight `>= min_weight` and id `>=` the
///    keyframe's id;
/// 2. the spanning-tree parent, if any;
/// 3. loop partners with id `>=` the keyframe's id, unless the same pair
///    was already emitted as a covisibility edge.
///
/// Bad keyframes and ids that no longer resolve are skipped.
pub fn build_graph_edges<G: KeyFrameGraph + ?Sized>(graph: &G, min_weight: u32) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    let mut covisible_pairs: HashSet<(KeyFrameId, KeyFrameId)> = HashSet::new();

    for id in graph.keyframe_ids() {
        let Some(center) = valid_center(graph, id) else {
            continue;
        };

        for neighbor in graph.covisibles_by_weight(id, min_weight) {
            if neighbor < id {
                continue;
            }
            let Some(other) = valid_center(graph, neighbor) else {
                continue;
            };
            covisible_pairs.insert((id, neighbor));
            edges.push(GraphEdge {
                kind: EdgeKind::Covisibility,
                from: id,
                to: neighbor,
                start: center.into(),
                end: other.into(),
            });
        }

        if let Some(parent) = graph.parent(id) {
            if let Some(parent_center) = valid_center(graph, parent) {
                edges.push(GraphEdge {
                    kind: EdgeKind::SpanningTree,
                    from: id,
                    to: parent,
                    start: center.into(),
                    end: parent_center.into(),
                });
            }
        }

        for partner in graph.loop_edges(id) {
            if partner < id || covisible_pairs.contains(&(id, partner)) {
                continue;
            }
            let Some(other) = valid_center(graph, partner) else {
                continue;
            };
            edges.push(GraphEdge {
                kind: EdgeKind::Loop,
                from: id,
                to: partner,
                start: center.into(),
                end: other.into(),
            });
        }
    }

    log::trace!("Built {} graph edges", edges.len());
    edges
}
