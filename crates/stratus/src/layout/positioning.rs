//! Positioning helpers shared by the layout engines.

use log::warn;

use stratus_core::{
    geometry::{Bounds, Point, Size},
    model::{PositionedGroup, PositionedService, SERVICE_SIZE},
};

use crate::{
    layout::{LayoutResult, overlap},
    structure::ArchitectureGraph,
};

/// Distance between the canvas origin and the top-left of the laid-out content.
pub const CANVAS_MARGIN: f32 = 50.0;

/// Box substituted for groups with no members or degenerate geometry.
pub const FALLBACK_GROUP_SIZE: Size = Size::new(300.0, 200.0);

/// Smallest bounds containing every item, or `None` for an empty iterator.
pub fn union_bounds(items: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
    items.into_iter().reduce(|acc, bounds| acc.merge(&bounds))
}

/// Offsets along the flow axis for vertices of the given ranks.
///
/// Each rank is as deep as its deepest vertex and ranks are separated by
/// `rank_spacing`. Vertices are centered in their rank. With `reversed` the
/// ranks are mirrored so that rank 0 ends up furthest along the axis.
pub fn flow_offsets(ranks: &[usize], extents: &[f32], rank_spacing: f32, reversed: bool) -> Vec<f32> {
    let rank_count = ranks.iter().max().map_or(0, |max| max + 1);
    let mut depths = vec![0.0f32; rank_count];
    for (rank, extent) in ranks.iter().zip(extents) {
        depths[*rank] = depths[*rank].max(*extent);
    }

    let mut starts = Vec::with_capacity(rank_count);
    let mut cursor = 0.0;
    for depth in &depths {
        starts.push(cursor);
        cursor += depth + rank_spacing;
    }
    let total = cursor - rank_spacing;

    ranks
        .iter()
        .zip(extents)
        .map(|(rank, extent)| {
            let offset = starts[*rank] + (depths[*rank] - extent) / 2.0;
            if reversed {
                total - offset - extent
            } else {
                offset
            }
        })
        .collect()
}

/// Moves boxes so their union starts at the origin.
///
/// Returns the moved top-left corners and the size of the union.
pub fn normalize(boxes: &[Bounds]) -> (Vec<Point>, Size) {
    let content = union_bounds(boxes.iter().copied()).unwrap_or_default();
    let offset = content.min_point().scale(-1.0);
    let positions = boxes
        .iter()
        .map(|bounds| bounds.min_point().add_point(offset))
        .collect();
    (positions, content.to_size())
}

/// Builds the final [`LayoutResult`] from absolute engine output.
///
/// `service_positions` and `group_bounds` are indexed like the graph's services
/// and groups. Non-finite service positions collapse to the origin and degenerate
/// group boxes become a [`FALLBACK_GROUP_SIZE`] box at the origin, both with a
/// warning. Members are then re-based onto their group and kept inside it, and the
/// overlap resolver runs over the groups.
pub fn finalize(
    graph: &ArchitectureGraph<'_>,
    service_positions: &[Point],
    group_bounds: &[Bounds],
) -> LayoutResult {
    let groups: Vec<PositionedGroup> = graph
        .groups()
        .iter()
        .zip(group_bounds)
        .map(|(group, bounds)| {
            let (position, size) = sanitize_group(group.id(), *bounds);
            PositionedGroup::new((*group).clone(), position, size)
        })
        .collect();

    let services = graph
        .services()
        .iter()
        .zip(service_positions)
        .enumerate()
        .map(|(idx, (service, position))| {
            let absolute = sanitize_point(service.id(), *position);
            let position = match graph.parent(idx) {
                Some(group) => clamp_into(
                    absolute.sub_point(groups[group].position()),
                    groups[group].size(),
                ),
                None => absolute,
            };
            PositionedService::new(graph.resolved_service(idx), position)
        })
        .collect();

    LayoutResult::new(services, overlap::resolve_group_overlaps(groups))
}

/// Replaces degenerate group boxes with a [`FALLBACK_GROUP_SIZE`] box at the origin.
///
/// Used where groups pass through a preset without being laid out.
pub fn sanitize_groups(groups: &[PositionedGroup]) -> Vec<PositionedGroup> {
    groups
        .iter()
        .map(|group| {
            let (position, size) = sanitize_group(group.id(), group.bounds());
            group.clone().with_position(position).with_size(size)
        })
        .collect()
}

fn sanitize_point(id: &str, point: Point) -> Point {
    if point.is_finite() {
        point
    } else {
        warn!(service_id = id; "Non-finite service position, placing at origin");
        Point::default()
    }
}

fn sanitize_group(id: &str, bounds: Bounds) -> (Point, Size) {
    let position = bounds.min_point();
    let size = bounds.to_size();
    if position.is_finite() && size.is_positive() {
        (position, size)
    } else {
        warn!(
            group_id = id,
            width = size.width(),
            height = size.height();
            "Degenerate group geometry, substituting fallback box"
        );
        (Point::default(), FALLBACK_GROUP_SIZE)
    }
}

/// Keeps a service footprint inside a container of `size`.
pub fn clamp_into(relative: Point, size: Size) -> Point {
    let max_x = (size.width() - SERVICE_SIZE.width()).max(0.0);
    let max_y = (size.height() - SERVICE_SIZE.height()).max(0.0);
    Point::new(
        relative.x().clamp(0.0, max_x),
        relative.y().clamp(0.0, max_y),
    )
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stratus_core::model::{Group, Service};

    use super::*;

    #[test]
    fn test_union_bounds() {
        let a = Point::new(0.0, 0.0).to_bounds(Size::new(10.0, 10.0));
        let b = Point::new(20.0, 5.0).to_bounds(Size::new(10.0, 10.0));

        let union = union_bounds([a, b]).expect("non-empty");
        assert_approx_eq!(f32, union.width(), 30.0);
        assert_approx_eq!(f32, union.height(), 15.0);
        assert!(union_bounds(std::iter::empty()).is_none());
    }

    #[test]
    fn test_flow_offsets_center_vertices_in_ranks() {
        let offsets = flow_offsets(&[0, 1, 1], &[100.0, 50.0, 100.0], 20.0, false);
        assert_eq!(offsets, vec![0.0, 145.0, 120.0]);

        let mirrored = flow_offsets(&[0, 1, 1], &[100.0, 50.0, 100.0], 20.0, true);
        assert_eq!(mirrored, vec![120.0, 25.0, 0.0]);
    }

    #[test]
    fn test_normalize_moves_union_to_origin() {
        let boxes = [
            Point::new(-10.0, 5.0).to_bounds(Size::new(10.0, 10.0)),
            Point::new(20.0, 30.0).to_bounds(Size::new(10.0, 10.0)),
        ];
        let (positions, size) = normalize(&boxes);

        assert_eq!(positions, vec![Point::new(0.0, 0.0), Point::new(30.0, 25.0)]);
        assert_eq!(size, Size::new(40.0, 35.0));
    }

    #[test]
    fn test_clamp_into_keeps_footprint_inside() {
        let size = Size::new(300.0, 200.0);
        assert_eq!(clamp_into(Point::new(-5.0, 500.0), size), Point::new(0.0, 100.0));
        assert_eq!(clamp_into(Point::new(10.0, 10.0), size), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_finalize_rebases_members_and_replaces_degenerate_geometry() {
        let services = vec![
            Service::new("a", "A").with_group("g"),
            Service::new("b", "B"),
        ];
        let groups = vec![Group::new("g", "G"), Group::new("h", "H")];
        let graph = ArchitectureGraph::new(&services, &[], &groups);

        let result = finalize(
            &graph,
            &[Point::new(130.0, 130.0), Point::new(f32::NAN, 0.0)],
            &[
                Point::new(50.0, 50.0).to_bounds(Size::new(340.0, 260.0)),
                Point::new(900.0, 50.0).to_bounds(Size::new(0.0, 0.0)),
            ],
        );

        assert!(result.is_finite());
        assert_eq!(result.services()[0].position(), Point::new(80.0, 80.0));
        assert_eq!(result.services()[1].position(), Point::default());
        let fallback = result.group("h").expect("group h");
        assert_eq!(fallback.size(), FALLBACK_GROUP_SIZE);
    }
}
