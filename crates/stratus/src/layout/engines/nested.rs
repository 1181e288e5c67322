//! Nested layout engine for architectures with groups.
//!
//! Each group is a nested graph of its own: members and their internal
//! connections are laid out first, giving the group its content size, and the
//! root graph then treats each group as one sized vertex. Layering and ordering
//! come from the rust-sugiyama implementation; this engine maps its abstract
//! coordinates back onto ranks and cross-axis slots and applies true vertex sizes.

use std::collections::{BTreeSet, HashMap};

use futures::{FutureExt, future::BoxFuture};
use log::{debug, info, trace, warn};
use rust_sugiyama::configure::Config;

use stratus_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{Connection, Group, SERVICE_SIZE, Service},
};

use crate::{
    error::StratusError,
    layout::{
        LayoutEngine, LayoutOptions, LayoutResult,
        positioning::{self, CANVAS_MARGIN, FALLBACK_GROUP_SIZE},
    },
    structure::{ArchitectureGraph, Vertex},
};

/// Height of the label band reserved at the top of every group.
const HEADER_BAND: f32 = 40.0;

/// Vertex spacing handed to rust-sugiyama; abstract x coordinates are divided by
/// it to obtain slot numbers.
const VERTEX_SPACING: f64 = 3.0;

/// Tolerance used when grouping y coordinates into ranks.
const LEVEL_EPSILON: f64 = 1e-6;

/// The nested layout engine.
pub struct Engine {
    header_band: f32,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            header_band: HEADER_BAND,
        }
    }

    /// Padding between a group's border and its content.
    fn group_insets(&self, padding: f32) -> Insets {
        Insets::uniform(padding).with_top(padding + self.header_band)
    }

    fn calculate_layout(
        &self,
        graph: &ArchitectureGraph<'_>,
        options: &LayoutOptions,
    ) -> LayoutResult {
        let insets = self.group_insets(options.group_padding());
        let mut relative = vec![Point::default(); graph.services().len()];
        let mut group_sizes = vec![FALLBACK_GROUP_SIZE; graph.groups().len()];
        let mut service_positions = vec![Point::default(); graph.services().len()];
        let mut group_positions = vec![Point::default(); graph.groups().len()];

        for scope in graph.containment_scopes() {
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

            match scope.container() {
                Some(group) => {
                    if sizes.is_empty() {
                        warn!(
                            group_id = graph.groups()[group].id();
                            "Group has no members, substituting fallback box"
                        );
                        continue;
                    }
                    let layout = self.layout_scope(&sizes, &edges, options);
                    let origin = Point::new(insets.left(), insets.top());
                    for (vertex, position) in scope.vertices().iter().zip(&layout.positions) {
                        if let Vertex::Service(idx) = vertex {
                            relative[*idx] = origin.add_point(*position);
                        }
                    }
                    group_sizes[group] = layout.size.add_padding(insets);
                    debug!(
                        group = graph.vertex_key(Vertex::Group(group)),
                        width = group_sizes[group].width(),
                        height = group_sizes[group].height();
                        "Group content laid out"
                    );
                }
                None => {
                    let layout = self.layout_scope(&sizes, &edges, options);
                    let origin = Point::new(CANVAS_MARGIN, CANVAS_MARGIN);
                    for (vertex, position) in scope.vertices().iter().zip(&layout.positions) {
                        let position = origin.add_point(*position);
                        match vertex {
                            Vertex::Service(idx) => service_positions[*idx] = position,
                            Vertex::Group(idx) => group_positions[*idx] = position,
                        }
                    }
                }
            }
        }

        for (idx, position) in service_positions.iter_mut().enumerate() {
            if let Some(group) = graph.parent(idx) {
                *position = group_positions[group].add_point(relative[idx]);
            }
        }

        let group_bounds: Vec<Bounds> = group_positions
            .iter()
            .zip(&group_sizes)
            .map(|(position, size)| position.to_bounds(*size))
            .collect();

        positioning::finalize(graph, &service_positions, &group_bounds)
    }

    /// Lays out one nested graph and returns positions relative to its content origin.
    fn layout_scope(
        &self,
        sizes: &[Size],
        edges: &[(usize, usize)],
        options: &LayoutOptions,
    ) -> ScopeLayout {
        if sizes.is_empty() {
            return ScopeLayout::default();
        }

        let placement = match sugiyama_placement(sizes.len(), edges) {
            Ok(placement) => placement,
            Err(err) => {
                warn!(err:%; "Nested layout failed, falling back to a single row");
                Placement::row(sizes.len())
            }
        };

        let direction = options.direction();
        let cross_extents: Vec<f32> = sizes
            .iter()
            .map(|size| direction.cross_extent(*size))
            .collect();
        let flow_extents: Vec<f32> = sizes
            .iter()
            .map(|size| direction.flow_extent(*size))
            .collect();

        let centers = placement.cross_centers(&cross_extents, options.node_spacing());
        let flows = positioning::flow_offsets(
            &placement.rank,
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
}

impl LayoutEngine for Engine {
    fn layout<'a>(
        &'a self,
        services: &'a [Service],
        connections: &'a [Connection],
        groups: &'a [Group],
        options: &'a LayoutOptions,
    ) -> BoxFuture<'a, LayoutResult> {
        async move {
            info!(
                services = services.len(),
                connections = connections.len(),
                groups = groups.len(),
                direction:? = options.direction();
                "Running nested layout"
            );
            let graph = ArchitectureGraph::new(services, connections, groups);
            let result = self.calculate_layout(&graph, options);
            info!(
                services = result.services().len(),
                groups = result.groups().len(),
                edges = graph.edges().len();
                "Nested layout finished"
            );
            trace!(result:?; "Nested layout result");
            result
        }
        .boxed()
    }
}

#[derive(Debug, Default)]
struct ScopeLayout {
    positions: Vec<Point>,
    size: Size,
}

/// Abstract placement of the vertices of one graph.
///
/// Vertices are grouped into components laid side by side on the cross axis.
/// Within a component, `rank` selects the position along the flow axis and
/// `slot` orders vertices across it.
#[derive(Debug, PartialEq)]
struct Placement {
    rank: Vec<usize>,
    component: Vec<usize>,
    slot: Vec<f64>,
}

impl Placement {
    /// Every vertex on its own rank, in input order.
    fn row(count: usize) -> Self {
        Self {
            rank: (0..count).collect(),
            component: vec![0; count],
            slot: vec![0.0; count],
        }
    }

    fn component_count(&self) -> usize {
        self.component.iter().max().map_or(0, |max| max + 1)
    }

    /// Cross-axis centers honouring slot order and true vertex extents.
    ///
    /// Slots are scaled by the widest vertex plus `spacing`, then every rank is
    /// swept once to enforce minimum separation. Components are packed one after
    /// another with `spacing` between them.
    fn cross_centers(&self, extents: &[f32], spacing: f32) -> Vec<f32> {
        let widest = extents.iter().copied().fold(0.0f32, f32::max);
        let slot_width = widest + spacing;
        let mut centers = vec![0.0f32; extents.len()];
        let mut cursor = 0.0f32;

        for component in 0..self.component_count() {
            let mut members: Vec<usize> = (0..extents.len())
                .filter(|v| self.component[*v] == component)
                .collect();
            if members.is_empty() {
                continue;
            }
            members.sort_by(|a, b| {
                self.rank[*a]
                    .cmp(&self.rank[*b])
                    .then(self.slot[*a].total_cmp(&self.slot[*b]))
                    .then(a.cmp(b))
            });

            let mut prev: Option<usize> = None;
            for &v in &members {
                let mut center = self.slot[v] as f32 * slot_width;
                if let Some(u) = prev.filter(|u| self.rank[*u] == self.rank[v]) {
                    center = center.max(centers[u] + extents[u] / 2.0 + extents[v] / 2.0 + spacing);
                }
                centers[v] = center;
                prev = Some(v);
            }

            let min = members
                .iter()
                .map(|v| centers[*v] - extents[*v] / 2.0)
                .fold(f32::INFINITY, f32::min);
            let max = members
                .iter()
                .map(|v| centers[*v] + extents[*v] / 2.0)
                .fold(f32::NEG_INFINITY, f32::max);
            for &v in &members {
                centers[v] += cursor - min;
            }
            cursor += max - min + spacing;
        }

        centers
    }
}

/// Runs rust-sugiyama over the connected vertices and appends isolated ones.
///
/// # Errors
///
/// Returns `StratusError::Layout` when the algorithm panics, returns no layout,
/// produces non-finite coordinates, or drops a connected vertex.
fn sugiyama_placement(count: usize, edges: &[(usize, usize)]) -> Result<Placement, StratusError> {
    let mut placement = Placement {
        rank: vec![0; count],
        component: vec![usize::MAX; count],
        slot: vec![0.0; count],
    };

    let mut next_component = 0;
    if !edges.is_empty() {
        let connected: Vec<usize> = edges
            .iter()
            .flat_map(|&(source, target)| [source, target])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let sequential: HashMap<usize, u32> = connected
            .iter()
            .enumerate()
            .map(|(id, &v)| (v, id as u32))
            .collect();
        let sugiyama_edges: Vec<(u32, u32)> = edges
            .iter()
            .map(|(source, target)| (sequential[source], sequential[target]))
            .collect();

        debug!(
            vertices = connected.len(),
            edges = sugiyama_edges.len();
            "Applying Sugiyama algorithm"
        );

        let layouts = std::panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: VERTEX_SPACING,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&sugiyama_edges, &config)
        })
        .map_err(|err| {
            let message = if let Some(panic_msg) = err.downcast_ref::<String>() {
                format!("Rust-sugiyama layout engine panicked: {panic_msg}")
            } else {
                "Rust-sugiyama layout engine panicked with unknown error".to_string()
            };
            StratusError::Layout(message)
        })?;

        if layouts.is_empty() {
            return Err(StratusError::Layout(
                "Rust-sugiyama returned empty layout results".to_string(),
            ));
        }

        for (coords, _, _) in &layouts {
            let mut levels: Vec<f64> = Vec::with_capacity(coords.len());
            let mut members = Vec::with_capacity(coords.len());
            for &(id, (x, y)) in coords {
                if !x.is_finite() || !y.is_finite() {
                    return Err(StratusError::Layout(format!(
                        "Rust-sugiyama produced non-finite coordinates for vertex {id}"
                    )));
                }
                let Some(&v) = connected.get(id) else {
                    debug!(id; "Ignoring vertex outside the input graph");
                    continue;
                };
                levels.push(y);
                members.push((v, x, y));
            }
            if members.is_empty() {
                continue;
            }

            levels.sort_by(f64::total_cmp);
            levels.dedup_by(|a, b| (*a - *b).abs() < LEVEL_EPSILON);
            for (v, x, y) in members {
                placement.rank[v] = levels.partition_point(|level| *level < y - LEVEL_EPSILON);
                placement.component[v] = next_component;
                placement.slot[v] = x / VERTEX_SPACING;
            }
            next_component += 1;
        }

        if let Some(&missing) = connected
            .iter()
            .find(|v| placement.component[**v] == usize::MAX)
        {
            return Err(StratusError::Layout(format!(
                "Rust-sugiyama did not place vertex {missing}"
            )));
        }

        orient_components(&mut placement, edges);
    }

    for v in 0..count {
        if placement.component[v] == usize::MAX {
            placement.component[v] = next_component;
            next_component += 1;
        }
    }

    Ok(placement)
}

/// Flips the ranks of every component whose edges mostly point toward rank 0.
///
/// Rank order derived from screen-space y coordinates depends on the sign
/// convention of the algorithm; edges must run from lower to higher ranks.
fn orient_components(placement: &mut Placement, edges: &[(usize, usize)]) {
    let components = placement.component_count();
    let mut balance = vec![0i64; components];
    for &(source, target) in edges {
        let component = placement.component[source];
        match placement.rank[source].cmp(&placement.rank[target]) {
            std::cmp::Ordering::Less => balance[component] += 1,
            std::cmp::Ordering::Greater => balance[component] -= 1,
            std::cmp::Ordering::Equal => {}
        }
    }

    for (component, balance) in balance.into_iter().enumerate() {
        if balance >= 0 {
            continue;
        }
        let max_rank = (0..placement.rank.len())
            .filter(|v| placement.component[*v] == component)
            .map(|v| placement.rank[v])
            .max()
            .unwrap_or(0);
        for v in 0..placement.rank.len() {
            if placement.component[v] == component {
                placement.rank[v] = max_rank - placement.rank[v];
            }
        }
    }
}
