//! Primary-path emphasis for the directional flow presets.

use std::collections::HashSet;

use log::debug;

use stratus_core::{
    geometry::Point,
    model::{Edge, PositionedGroup, PositionedService, SERVICE_SIZE},
};

use super::adjacency::DirectedAdjacency;
use crate::layout::FlowDirection;

/// Chains shorter than this are not worth straightening.
const MIN_CHAIN: usize = 3;

/// Snaps the primary chain onto one line across the flow and tags its edges.
///
/// Every chain member's coordinate perpendicular to `direction` is set to the
/// median of the members' absolute coordinates. Members inside a group are
/// clamped so their footprint stays within the group. Edges joining two
/// consecutive chain members, in either orientation, are tagged primary and all
/// other edges are tagged non-primary. Short chains leave everything untouched.
pub fn emphasize(
    mut services: Vec<PositionedService>,
    groups: &[PositionedGroup],
    edges: Vec<Edge>,
    direction: FlowDirection,
) -> (Vec<PositionedService>, Vec<Edge>) {
    let chain: Vec<String> = {
        let adjacency = DirectedAdjacency::new(
            services.iter().map(PositionedService::id),
            edges.iter().map(Edge::connection),
        );
        adjacency
            .primary_chain()
            .into_iter()
            .map(|idx| adjacency.id(idx).to_string())
            .collect()
    };
    if chain.len() < MIN_CHAIN {
        debug!(length = chain.len(); "Primary chain too short, leaving layout unchanged");
        return (services, edges);
    }
    debug!(chain:? = chain; "Straightening primary chain");

    let group_of = |service: &PositionedService| {
        service
            .group_id()
            .and_then(|id| groups.iter().find(|group| group.id() == id))
    };
    let across = |point: Point| {
        if direction.is_horizontal() {
            point.y()
        } else {
            point.x()
        }
    };

    // Only the first service with a given id takes part, matching the adjacency.
    let members: Vec<usize> = chain
        .iter()
        .filter_map(|id| services.iter().position(|service| service.id() == id))
        .collect();

    let mut values: Vec<f32> = members
        .iter()
        .map(|idx| {
            let service = &services[*idx];
            let absolute = match group_of(service) {
                Some(group) => group.position().add_point(service.position()),
                None => service.position(),
            };
            across(absolute)
        })
        .collect();
    values.sort_by(f32::total_cmp);
    let median = values[values.len() / 2];

    for idx in members {
        let service = &services[idx];
        let target = match group_of(service) {
            Some(group) => {
                let extent = across(Point::new(group.size().width(), group.size().height()));
                let footprint = across(Point::new(SERVICE_SIZE.width(), SERVICE_SIZE.height()));
                (median - across(group.position())).clamp(0.0, (extent - footprint).max(0.0))
            }
            None => median,
        };
        let position = if direction.is_horizontal() {
            service.position().with_y(target)
        } else {
            service.position().with_x(target)
        };
        let updated = service.clone().with_position(position);
        services[idx] = updated;
    }

    let pairs: HashSet<(&str, &str)> = chain
        .windows(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();
    let edges = edges
        .into_iter()
        .map(|edge| {
            let (from, to) = (edge.connection().from(), edge.connection().to());
            let primary = pairs.contains(&(from, to)) || pairs.contains(&(to, from));
            edge.with_primary_path(primary)
        })
        .collect();

    (services, edges)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stratus_core::{
        geometry::Size,
        model::{Connection, Group, Service},
    };

    use super::*;

    fn service(id: &str, x: f32, y: f32) -> PositionedService {
        PositionedService::new(Service::new(id, id), Point::new(x, y))
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge::new(format!("{from}-{to}"), Connection::new(from, to))
    }

    #[test]
    fn test_chain_snaps_to_median_across_flow() {
        let services = vec![
            service("a", 0.0, 10.0),
            service("b", 300.0, 200.0),
            service("c", 600.0, 50.0),
            service("side", 300.0, 900.0),
        ];
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("b", "side")];

        let (services, edges) = emphasize(services, &[], edges, FlowDirection::LeftToRight);

        for id in ["a", "b", "c"] {
            let service = services.iter().find(|s| s.id() == id).expect("service");
            assert_approx_eq!(f32, service.position().y(), 50.0);
        }
        assert_approx_eq!(f32, services[0].position().x(), 0.0);
        assert_approx_eq!(f32, services[3].position().y(), 900.0);

        let flags: Vec<Option<bool>> = edges.iter().map(Edge::primary_path).collect();
        assert_eq!(flags, vec![Some(true), Some(true), Some(false)]);
    }

    #[test]
    fn test_short_chain_is_a_no_op() {
        let services = vec![service("a", 0.0, 0.0), service("b", 300.0, 200.0)];
        let edges = vec![edge("a", "b")];

        let (after, edges) = emphasize(services.clone(), &[], edges, FlowDirection::LeftToRight);

        assert_eq!(after, services);
        assert_eq!(edges[0].primary_path(), None);
    }

    #[test]
    fn test_grouped_member_is_clamped_into_its_group() {
        let group = PositionedGroup::new(
            Group::new("g", "G"),
            Point::new(1000.0, 0.0),
            Size::new(340.0, 260.0),
        );
        let services = vec![
            service("a", 0.0, 0.0),
            service("b", 300.0, 0.0),
            PositionedService::new(Service::new("c", "C").with_group("g"), Point::new(80.0, 80.0)),
        ];
        let edges = vec![edge("a", "b"), edge("b", "c")];

        let (services, _) = emphasize(services, &[group], edges, FlowDirection::TopToBottom);

        // Median of absolute x values (0, 300, 1080) is 300, which lies left of the group.
        assert_approx_eq!(f32, services[0].position().x(), 300.0);
        assert_approx_eq!(f32, services[2].position().x(), 0.0);
        assert_approx_eq!(f32, services[2].position().y(), 80.0);
    }
}
