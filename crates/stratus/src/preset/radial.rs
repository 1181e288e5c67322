//! Radial preset: rings of services around a central one.

use std::{collections::VecDeque, f32::consts::TAU};

use log::debug;

use stratus_core::{
    geometry::Point,
    model::{Connection, PositionedService},
};

use super::{SpacingMetrics, adjacency::DirectedAdjacency};

/// Where the central service is placed.
pub const CENTER: Point = Point::new(520.0, 360.0);

/// Places services on concentric rings by graph distance from a center.
///
/// The center is `selected` when it names a service, otherwise the most
/// connected service. Services the center cannot reach share one extra
/// outermost ring. All services become top-level, since their coordinates are
/// absolute; groups are left alone by the caller.
pub fn arrange(
    services: &[PositionedService],
    connections: &[Connection],
    metrics: &SpacingMetrics,
    selected: Option<&str>,
) -> Vec<PositionedService> {
    let adjacency = DirectedAdjacency::new(services.iter().map(PositionedService::id), connections);
    if adjacency.is_empty() {
        debug!("No services to arrange radially");
        return services.to_vec();
    }
    let center = selected
        .and_then(|id| adjacency.index_of(id))
        .or_else(|| adjacency.most_connected())
        .unwrap_or_default();

    let mut ring: Vec<Option<usize>> = vec![None; adjacency.len()];
    let mut discovery = vec![center];
    let mut queue = VecDeque::from([center]);
    ring[center] = Some(0);
    while let Some(current) = queue.pop_front() {
        let distance = ring[current].unwrap_or_default();
        for neighbour in adjacency.neighbours(current) {
            if ring[neighbour].is_none() {
                ring[neighbour] = Some(distance + 1);
                discovery.push(neighbour);
                queue.push_back(neighbour);
            }
        }
    }

    let outermost = ring.iter().flatten().copied().max().unwrap_or_default() + 1;
    let ring: Vec<usize> = ring
        .into_iter()
        .enumerate()
        .map(|(idx, distance)| {
            distance.unwrap_or_else(|| {
                discovery.push(idx);
                outermost
            })
        })
        .collect();

    let mut rings: Vec<Vec<usize>> = vec![Vec::new(); outermost + 1];
    for idx in discovery {
        rings[ring[idx]].push(idx);
    }
    debug!(
        center = adjacency.id(center),
        rings = rings.iter().filter(|members| !members.is_empty()).count();
        "Assigned radial rings"
    );

    let mut positions = vec![CENTER; adjacency.len()];
    for (distance, members) in rings.iter().enumerate().skip(1) {
        let radius = metrics.radial_base_radius() + (distance - 1) as f32 * metrics.radial_ring_step();
        for (slot, idx) in members.iter().enumerate() {
            let angle = slot as f32 / members.len() as f32 * TAU;
            positions[*idx] = CENTER.add_point(Point::new(radius * angle.cos(), radius * angle.sin()));
        }
    }

    services
        .iter()
        .map(|service| {
            let position = adjacency
                .index_of(service.id())
                .map_or(CENTER, |idx| positions[idx]);
            service.clone().without_group().with_position(position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stratus_core::model::Service;

    use super::*;
    use crate::preset::Spacing;

    fn services(ids: &[&str]) -> Vec<PositionedService> {
        ids.iter()
            .map(|id| PositionedService::new(Service::new(*id, *id), Point::default()))
            .collect()
    }

    fn assert_at(service: &PositionedService, x: f32, y: f32) {
        assert_approx_eq!(f32, service.position().x(), x, epsilon = 1e-3);
        assert_approx_eq!(f32, service.position().y(), y, epsilon = 1e-3);
    }

    #[test]
    fn test_hub_is_centered_with_spokes_on_one_ring() {
        let services = services(&["a", "hub", "b", "c", "d"]);
        let connections = vec![
            Connection::new("hub", "a"),
            Connection::new("hub", "b"),
            Connection::new("c", "hub"),
            Connection::new("hub", "d"),
        ];

        let placed = arrange(&services, &connections, &Spacing::Comfortable.metrics(), None);

        assert_at(&placed[1], 520.0, 360.0);
        // Discovery order follows the hub's connections: a, b, c, d.
        assert_at(&placed[0], 740.0, 360.0);
        assert_at(&placed[2], 520.0, 580.0);
        assert_at(&placed[3], 300.0, 360.0);
        assert_at(&placed[4], 520.0, 140.0);
    }

    #[test]
    fn test_selected_service_wins_over_degree() {
        let services = services(&["a", "b", "c"]);
        let connections = vec![Connection::new("a", "b"), Connection::new("b", "c")];

        let placed = arrange(&services, &connections, &Spacing::Compact.metrics(), Some("a"));

        assert_at(&placed[0], 520.0, 360.0);
        assert_at(&placed[1], 520.0 + 170.0, 360.0);
        assert_at(&placed[2], 520.0 + 170.0 + 160.0, 360.0);
    }

    #[test]
    fn test_unknown_selection_falls_back_to_most_connected() {
        let services = services(&["a", "b", "c"]);
        let connections = vec![Connection::new("a", "b"), Connection::new("b", "c")];

        let placed = arrange(&services, &connections, &Spacing::Comfortable.metrics(), Some("zzz"));

        assert_at(&placed[1], 520.0, 360.0);
    }

    #[test]
    fn test_unreachable_services_share_outer_ring() {
        let services = services(&["a", "b", "x", "y"]);
        let connections = vec![Connection::new("a", "b")];

        let placed = arrange(&services, &connections, &Spacing::Comfortable.metrics(), None);

        // b is on ring 1; x and y go to ring 2 with radius 220 + 200.
        assert_at(&placed[1], 740.0, 360.0);
        assert_at(&placed[2], 520.0 + 420.0, 360.0);
        assert_at(&placed[3], 520.0 - 420.0, 360.0);
    }

    #[test]
    fn test_grouped_services_are_detached() {
        let services = vec![PositionedService::new(
            Service::new("a", "A").with_group("g"),
            Point::new(10.0, 10.0),
        )];

        let placed = arrange(&services, &[], &Spacing::Comfortable.metrics(), None);

        assert_eq!(placed[0].group_id(), None);
        assert_at(&placed[0], 520.0, 360.0);
    }

    #[test]
    fn test_no_services_is_a_no_op() {
        assert!(arrange(&[], &[], &Spacing::Comfortable.metrics(), None).is_empty());
    }
}
