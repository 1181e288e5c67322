//! Layered layout engine.
//!
//! A Sugiyama pipeline applied with compound collapse/expand: each group is laid
//! out as its own layered graph first, then collapses into a single sized vertex
//! of the root graph, and finally its members are expanded back inside it.
//!
//! Phases per graph:
//!   1. Cycle removal (greedy feedback arc set, edges reversed)
//!   2. Longest-path layering
//!   3. Dummy vertex insertion for long edges
//!   4. Crossing minimisation (barycenter sweeps)
//!   5. Cross-axis coordinate assignment (packing + median relaxation)
//!   6. Flow-axis placement

use std::collections::{HashMap, HashSet};

use futures::{
    FutureExt,
    future::{self, BoxFuture},
};
use indexmap::IndexSet;
use log::{debug, info, trace, warn};
use petgraph::{
    algo,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use stratus_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{Connection, Group, SERVICE_SIZE, Service},
};

use crate::{
    layout::{
        LayoutEngine, LayoutOptions, LayoutResult,
        positioning::{self, CANVAS_MARGIN, FALLBACK_GROUP_SIZE},
    },
    structure::{ArchitectureGraph, Vertex},
};

/// Number of down/up barycenter sweep pairs.
const ORDERING_SWEEPS: usize = 8;

/// Number of median relaxation sweeps during coordinate assignment.
const RELAXATION_SWEEPS: usize = 8;

/// The layered layout engine.
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    fn calculate_layout(
        &self,
        graph: &ArchitectureGraph<'_>,
        options: &LayoutOptions,
    ) -> LayoutResult {
        let padding = options.group_padding();
        let mut service_positions = vec![Point::default(); graph.services().len()];
        let mut group_positions = vec![Point::default(); graph.groups().len()];
        let mut group_sizes = vec![FALLBACK_GROUP_SIZE; graph.groups().len()];

        // Group scopes come before the root scope, so every compound size is
        // known by the time the root graph is laid out.
        for scope in graph.containment_scopes() {
            if scope.vertices().is_empty() {
                if let Some(group) = scope.container() {
                    debug!(group_id = graph.groups()[group].id(); "Empty group, using fallback box");
                }
                continue;
            }

            let sizes: Vec<Size> = scope
                .vertices()
                .iter()
                .map(|vertex| match vertex {
                    Vertex::Service(_) => SERVICE_SIZE,
                    Vertex::Group(group) => group_sizes[*group],
                })
                .collect();
            let local: HashMap<Vertex, usize> = scope
                .vertices()
                .iter()
                .enumerate()
                .map(|(idx, vertex)| (*vertex, idx))
                .collect();
            let edges: Vec<(usize, usize)> = scope
                .relations()
                .iter()
                .filter_map(|(source, target)| Some((*local.get(source)?, *local.get(target)?)))
                .collect();

            debug!(
                scope = scope.container().map_or("root", |group| graph.vertex_key(Vertex::Group(group))),
                vertices = sizes.len(),
                edges = edges.len();
                "Laying out scope"
            );
            let layout = layout_scope(&sizes, &edges, options);

            let origin = match scope.container() {
                Some(_) => Point::new(padding, padding),
                None => Point::new(CANVAS_MARGIN, CANVAS_MARGIN),
            };
            for (vertex, position) in scope.vertices().iter().zip(&layout.positions) {
                let position = origin.add_point(*position);
                match vertex {
                    Vertex::Service(idx) => service_positions[*idx] = position,
                    Vertex::Group(idx) => group_positions[*idx] = position,
                }
            }

            if let Some(group) = scope.container() {
                group_sizes[group] = layout.size.add_padding(Insets::uniform(padding));
            }
        }

        // Expand: members were placed relative to their group's top-left corner.
        for (idx, position) in service_positions.iter_mut().enumerate() {
            if let Some(group) = graph.parent(idx) {
                *position = group_positions[group].add_point(*position);
            }
        }

        let group_bounds: Vec<Bounds> = group_positions
            .iter()
            .zip(&group_sizes)
            .map(|(position, size)| position.to_bounds(*size))
            .collect();

        positioning::finalize(graph, &service_positions, &group_bounds)
    }
}

impl LayoutEngine for Engine {
    fn layout<'a>(
        &'a self,
        services: &'a [Service],
        connections: &'a [Connection],
        groups: &'a [Group],
        options: &'a LayoutOptions,
    ) -> BoxFuture<'a, LayoutResult> {
        info!(
            services = services.len(),
            connections = connections.len(),
            groups = groups.len(),
            direction:? = options.direction();
            "Running layered layout"
        );
        let graph = ArchitectureGraph::new(services, connections, groups);
        let result = self.calculate_layout(&graph, options);
        info!(
            services = result.services().len(),
            groups = result.groups().len(),
            edges = graph.edges().len();
            "Layered layout finished"
        );
        trace!(result:?; "Layered layout result");

        future::ready(result).boxed()
    }
}

/// Top-left vertex positions of one laid-out graph, with its content size.
#[derive(Debug)]
struct ScopeLayout {
    positions: Vec<Point>,
    size: Size,
}

/// Runs the full pipeline over one graph of sized vertices.
///
/// Returned positions are relative to the content's top-left corner.
fn layout_scope(sizes: &[Size], edges: &[(usize, usize)], options: &LayoutOptions) -> ScopeLayout {
    if sizes.is_empty() {
        return ScopeLayout {
            positions: Vec::new(),
            size: Size::default(),
        };
    }

    let direction = options.direction();
    let acyclic = acyclic_edges(sizes.len(), edges);
    let ranks = longest_path_ranks(sizes.len(), &acyclic);
    let layered = LayeredGraph::new(ranks, &acyclic);
    let layers = order_layers(&layered);
    debug!(
        vertices = sizes.len(),
        dummies = layered.len() - layered.real,
        layers = layers.len();
        "Layers ordered"
    );

    let cross_extents: Vec<f32> = (0..layered.len())
        .map(|v| {
            if layered.is_dummy(v) {
                0.0
            } else {
                direction.cross_extent(sizes[v])
            }
        })
        .collect();
    let centers = assign_cross(&layered, &layers, &cross_extents, options.node_spacing());

    let flow_extents: Vec<f32> = sizes.iter().map(|size| direction.flow_extent(*size)).collect();
    let flows = positioning::flow_offsets(
        &layered.rank[..layered.real],
        &flow_extents,
        options.rank_spacing(),
        direction.is_reversed(),
    );

    let boxes: Vec<Bounds> = sizes
        .iter()
        .enumerate()
        .map(|(v, size)| {
            let cross = centers[v] - cross_extents[v] / 2.0;
            direction.to_point(flows[v], cross).to_bounds(*size)
        })
        .collect();

    let (positions, size) = positioning::normalize(&boxes);
    ScopeLayout { positions, size }
}

/// Orients every edge so the graph becomes acyclic.
///
/// Edges of a greedy feedback arc set are reversed rather than dropped, then
/// parallel duplicates created by the reversal are merged.
fn acyclic_edges(count: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let graph = build_graph(count, edges);
    let feedback: HashSet<_> = algo::greedy_feedback_arc_set(&graph)
        .map(|edge| edge.id())
        .collect();
    if !feedback.is_empty() {
        debug!(reversed = feedback.len(); "Reversing feedback edges");
    }

    let mut acyclic = IndexSet::with_capacity(edges.len());
    for edge in graph.edge_references() {
        let (source, target) = (edge.source().index(), edge.target().index());
        if feedback.contains(&edge.id()) {
            acyclic.insert((target, source));
        } else {
            acyclic.insert((source, target));
        }
    }
    acyclic.into_iter().collect()
}

/// Assigns each vertex the length of the longest path reaching it.
fn longest_path_ranks(count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let graph = build_graph(count, edges);
    let order: Vec<usize> = match algo::toposort(&graph, None) {
        Ok(order) => order.into_iter().map(NodeIndex::index).collect(),
        Err(cycle) => {
            warn!(
                vertex = cycle.node_id().index();
                "Cycle left after feedback arc removal, ranking in input order"
            );
            (0..count).collect()
        }
    };

    let mut ranks = vec![0; count];
    for v in order {
        for succ in graph.neighbors(NodeIndex::new(v)) {
            let succ = succ.index();
            ranks[succ] = ranks[succ].max(ranks[v] + 1);
        }
    }
    ranks
}

fn build_graph(count: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(count, edges.len());
    for _ in 0..count {
        graph.add_node(());
    }
    for &(source, target) in edges {
        graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }
    graph
}

/// Ranked graph in which every edge joins adjacent layers.
///
/// Vertices `0..real` are the input vertices, the rest are dummies.
#[derive(Debug)]
struct LayeredGraph {
    rank: Vec<usize>,
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    real: usize,
}

impl LayeredGraph {
    fn new(ranks: Vec<usize>, edges: &[(usize, usize)]) -> Self {
        let real = ranks.len();
        let mut graph = Self {
            rank: ranks,
            succs: vec![Vec::new(); real],
            preds: vec![Vec::new(); real],
            real,
        };

        for &(source, target) in edges {
            let (source_rank, target_rank) = (graph.rank[source], graph.rank[target]);
            if target_rank <= source_rank {
                // Only possible when ranking fell back to input order.
                continue;
            }
            let mut prev = source;
            for rank in (source_rank + 1)..target_rank {
                let dummy = graph.add_dummy(rank);
                graph.link(prev, dummy);
                prev = dummy;
            }
            graph.link(prev, target);
        }
        graph
    }

    fn add_dummy(&mut self, rank: usize) -> usize {
        self.rank.push(rank);
        self.succs.push(Vec::new());
        self.preds.push(Vec::new());
        self.rank.len() - 1
    }

    fn link(&mut self, source: usize, target: usize) {
        self.succs[source].push(target);
        self.preds[target].push(source);
    }

    fn len(&self) -> usize {
        self.rank.len()
    }

    fn is_dummy(&self, v: usize) -> bool {
        v >= self.real
    }

    fn layer_count(&self) -> usize {
        self.rank.iter().max().map_or(0, |max| max + 1)
    }
}

/// Orders every layer to reduce edge crossings.
///
/// Layers start in vertex order. Each iteration sorts layers top-down by the
/// barycenter of predecessors, then bottom-up by the barycenter of successors;
/// the ordering with the fewest crossings seen is kept.
fn order_layers(graph: &LayeredGraph) -> Vec<Vec<usize>> {
    let mut layers = vec![Vec::new(); graph.layer_count()];
    for v in 0..graph.len() {
        layers[graph.rank[v]].push(v);
    }

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(graph, &layers);
    for _ in 0..ORDERING_SWEEPS {
        if best_crossings == 0 {
            break;
        }
        for layer in 1..layers.len() {
            sort_by_barycenter(&mut layers, layer, layer - 1, &graph.preds);
        }
        for layer in (0..layers.len().saturating_sub(1)).rev() {
            sort_by_barycenter(&mut layers, layer, layer + 1, &graph.succs);
        }

        let crossings = count_crossings(graph, &layers);
        if crossings < best_crossings {
            best = layers.clone();
            best_crossings = crossings;
        }
    }

    debug!(crossings = best_crossings; "Crossing minimisation finished");
    best
}

fn sort_by_barycenter(
    layers: &mut [Vec<usize>],
    layer: usize,
    fixed: usize,
    neighbours: &[Vec<usize>],
) {
    let fixed_positions: HashMap<usize, f32> = layers[fixed]
        .iter()
        .enumerate()
        .map(|(idx, v)| (*v, idx as f32))
        .collect();

    let mut keyed: Vec<(f32, usize)> = layers[layer]
        .iter()
        .enumerate()
        .map(|(idx, &v)| {
            let positions: Vec<f32> = neighbours[v]
                .iter()
                .filter_map(|u| fixed_positions.get(u).copied())
                .collect();
            let key = if positions.is_empty() {
                idx as f32
            } else {
                positions.iter().sum::<f32>() / positions.len() as f32
            };
            (key, v)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    layers[layer] = keyed.into_iter().map(|(_, v)| v).collect();
}

fn count_crossings(graph: &LayeredGraph, layers: &[Vec<usize>]) -> usize {
    let mut position = vec![0usize; graph.len()];
    for layer in layers {
        for (idx, &v) in layer.iter().enumerate() {
            position[v] = idx;
        }
    }

    let mut total = 0;
    for layer in layers {
        let mut edges = Vec::new();
        for &v in layer {
            for &w in &graph.succs[v] {
                edges.push((position[v], position[w]));
            }
        }
        for (i, &(a_top, a_bottom)) in edges.iter().enumerate() {
            for &(b_top, b_bottom) in &edges[i + 1..] {
                if (a_top < b_top && a_bottom > b_bottom) || (a_top > b_top && a_bottom < b_bottom)
                {
                    total += 1;
                }
            }
        }
    }
    total
}

/// Computes cross-axis centers for every vertex, dummies included.
fn assign_cross(
    graph: &LayeredGraph,
    layers: &[Vec<usize>],
    extents: &[f32],
    spacing: f32,
) -> Vec<f32> {
    let separation = |u: usize, v: usize| {
        let gap = if graph.is_dummy(u) || graph.is_dummy(v) {
            spacing / 2.0
        } else {
            spacing
        };
        extents[u] / 2.0 + extents[v] / 2.0 + gap
    };

    let mut centers = vec![0.0f32; graph.len()];
    for layer in layers {
        let mut prev: Option<usize> = None;
        for &v in layer {
            centers[v] = match prev {
                Some(u) => centers[u] + separation(u, v),
                None => extents[v] / 2.0,
            };
            prev = Some(v);
        }
    }

    for sweep in 0..RELAXATION_SWEEPS {
        if sweep % 2 == 0 {
            for layer in layers.iter().skip(1) {
                relax_layer(layer, &graph.preds, &mut centers, &separation);
            }
        } else {
            for layer in layers.iter().rev().skip(1) {
                relax_layer(layer, &graph.succs, &mut centers, &separation);
            }
        }
    }

    centers
}

/// Moves a layer toward the median of its neighbours without breaking separation.
///
/// A forward pass pushes positions right to satisfy separation, a backward pass
/// pushes them left; both are feasible, so their average is as well.
fn relax_layer(
    layer: &[usize],
    neighbours: &[Vec<usize>],
    centers: &mut [f32],
    separation: &impl Fn(usize, usize) -> f32,
) {
    if layer.is_empty() {
        return;
    }

    let desired: Vec<f32> = layer
        .iter()
        .map(|&v| {
            let positions: Vec<f32> = neighbours[v].iter().map(|&u| centers[u]).collect();
            median(positions).unwrap_or(centers[v])
        })
        .collect();

    let mut forward = desired.clone();
    for i in 1..layer.len() {
        forward[i] = forward[i].max(forward[i - 1] + separation(layer[i - 1], layer[i]));
    }
    let mut backward = desired;
    for i in (0..layer.len() - 1).rev() {
        backward[i] = backward[i].min(backward[i + 1] - separation(layer[i], layer[i + 1]));
    }

    for (i, &v) in layer.iter().enumerate() {
        centers[v] = (forward[i] + backward[i]) / 2.0;
    }
}

fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use futures::executor::block_on;

    use super::*;
    use crate::layout::FlowDirection;

    fn services(ids: &[&str]) -> Vec<Service> {
        ids.iter().map(|id| Service::new(*id, id.to_uppercase())).collect()
    }

    #[test]
    fn test_cycle_is_broken_by_reversal() {
        let acyclic = acyclic_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(acyclic.len(), 3);

        let ranks = longest_path_ranks(3, &acyclic);
        for (source, target) in acyclic {
            assert!(ranks[target] > ranks[source]);
        }
    }

    #[test]
    fn test_long_edges_get_dummies() {
        let ranks = longest_path_ranks(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(ranks, vec![0, 1, 2]);

        let layered = LayeredGraph::new(ranks, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(layered.len(), 4);
        assert!(layered.is_dummy(3));
        assert_eq!(layered.rank[3], 1);
        assert_eq!(layered.succs[0], vec![1, 3]);
        assert_eq!(layered.preds[2], vec![1, 3]);
    }

    #[test]
    fn test_barycenter_sweeps_remove_crossing() {
        // 0 -> 3 and 1 -> 2 cross in the initial vertex order.
        let edges = [(0, 3), (1, 2)];
        let layered = LayeredGraph::new(vec![0, 0, 1, 1], &edges);
        let initial = vec![vec![0, 1], vec![2, 3]];
        assert_eq!(count_crossings(&layered, &initial), 1);

        let ordered = order_layers(&layered);
        assert_eq!(count_crossings(&layered, &ordered), 0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), None);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0]), Some(2.5));
    }

    #[test]
    fn test_chain_flows_left_to_right_on_one_line() {
        let services = services(&["s1", "s2", "s3"]);
        let connections = vec![Connection::new("s1", "s2"), Connection::new("s2", "s3")];
        let options = LayoutOptions::default();

        let result = block_on(Engine::new().layout(&services, &connections, &[], &options));
        let positions: Vec<Point> = result.services().iter().map(|s| s.position()).collect();

        assert!(positions[0].x() < positions[1].x());
        assert!(positions[1].x() < positions[2].x());
        assert_approx_eq!(f32, positions[0].y(), positions[1].y());
        assert_approx_eq!(f32, positions[1].y(), positions[2].y());
        assert_approx_eq!(f32, positions[0].x(), CANVAS_MARGIN);
        assert_approx_eq!(
            f32,
            positions[1].x() - positions[0].x(),
            SERVICE_SIZE.width() + options.rank_spacing()
        );
    }

    #[test]
    fn test_reversed_directions_mirror_the_flow() {
        let services = services(&["a", "b"]);
        let connections = vec![Connection::new("a", "b")];

        let options = LayoutOptions::default().with_direction(FlowDirection::RightToLeft);
        let result = block_on(Engine::new().layout(&services, &connections, &[], &options));
        assert!(result.services()[0].position().x() > result.services()[1].position().x());

        let options = LayoutOptions::default().with_direction(FlowDirection::BottomToTop);
        let result = block_on(Engine::new().layout(&services, &connections, &[], &options));
        assert!(result.services()[0].position().y() > result.services()[1].position().y());
    }

    #[test]
    fn test_group_box_wraps_members_with_padding() {
        let services = vec![
            Service::new("web", "Web").with_group("app"),
            Service::new("api", "API").with_group("app"),
            Service::new("db", "DB"),
        ];
        let connections = vec![Connection::new("web", "api"), Connection::new("api", "db")];
        let groups = vec![Group::new("app", "App")];
        let options = LayoutOptions::default();

        let result = block_on(Engine::new().layout(&services, &connections, &groups, &options));
        let group = result.group("app").expect("group laid out");

        // Two members side by side on the flow axis, padded on every side.
        let expected_width =
            2.0 * SERVICE_SIZE.width() + options.rank_spacing() + 2.0 * options.group_padding();
        let expected_height = SERVICE_SIZE.height() + 2.0 * options.group_padding();
        assert_approx_eq!(f32, group.size().width(), expected_width);
        assert_approx_eq!(f32, group.size().height(), expected_height);

        let web = result.service("web").expect("web");
        assert_eq!(
            web.position(),
            Point::new(options.group_padding(), options.group_padding())
        );

        let db = result.service("db").expect("db");
        assert!(db.position().x() > group.bounds().max_x());
    }

    #[test]
    fn test_empty_group_gets_fallback_box() {
        let groups = vec![Group::new("empty", "Empty")];
        let result = block_on(Engine::new().layout(&[], &[], &groups, &LayoutOptions::default()));

        let group = result.group("empty").expect("group");
        assert_eq!(group.size(), FALLBACK_GROUP_SIZE);
        assert_eq!(group.position(), Point::new(CANVAS_MARGIN, CANVAS_MARGIN));
    }
}
