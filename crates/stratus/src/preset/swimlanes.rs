//! Swimlane preset: one horizontal lane per group, stacked top to bottom.
//!
//! Each group's members are laid out on their own as a left-to-right flow,
//! ignoring edges that leave the group, and the group box is sized around the
//! result. Groups are stacked in label order; services without a known group
//! form a final lane below all groups.

use std::collections::HashMap;

use log::debug;

use stratus_core::{
    geometry::{Insets, Point, Size},
    model::{Connection, PositionedGroup, PositionedService, SERVICE_SIZE},
};

use super::SpacingMetrics;
use crate::layout::{FlowDirection, LayoutEngine, LayoutOptions};

/// Top-left corner of the first lane.
const LANE_ORIGIN: Point = Point::new(80.0, 80.0);

/// Smallest content area of a populated lane.
const MIN_CONTENT: Size = Size::new(220.0, 160.0);

/// Size given to an empty group that has no usable size of its own.
const EMPTY_LANE_SIZE: Size = Size::new(420.0, 260.0);

/// A lane laid out in its own coordinate space, starting at the origin.
struct Lane {
    positions: Vec<(usize, Point)>,
    extent: Size,
}

/// Arranges services into per-group lanes.
///
/// Returns services and groups in their input order. Grouped services come
/// back relative to their group; ungrouped ones are absolute.
pub async fn arrange(
    services: &[PositionedService],
    groups: &[PositionedGroup],
    connections: &[Connection],
    metrics: &SpacingMetrics,
    engine: &dyn LayoutEngine,
) -> (Vec<PositionedService>, Vec<PositionedGroup>) {
    let options = metrics.layout_options(FlowDirection::LeftToRight);
    let padding = metrics.group_padding();

    let mut group_index: HashMap<&str, usize> = HashMap::new();
    for (idx, group) in groups.iter().enumerate() {
        group_index.entry(group.id()).or_insert(idx);
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); groups.len()];
    let mut ungrouped = Vec::new();
    for (idx, service) in services.iter().enumerate() {
        match service.group_id().and_then(|id| group_index.get(id)) {
            Some(group) => members[*group].push(idx),
            None => ungrouped.push(idx),
        }
    }

    let mut lane_order: Vec<usize> = (0..groups.len()).collect();
    lane_order.sort_by_cached_key(|idx| {
        let group = &groups[*idx];
        let label = group.group().label();
        (label.to_lowercase(), label.to_owned(), group.id().to_owned())
    });

    let mut placed_services: Vec<Option<PositionedService>> = vec![None; services.len()];
    let mut placed_groups: Vec<Option<PositionedGroup>> = vec![None; groups.len()];
    let mut y_cursor = LANE_ORIGIN.y();

    for group_idx in lane_order {
        let group = &groups[group_idx];
        let lane_position = LANE_ORIGIN.with_y(y_cursor);

        if members[group_idx].is_empty() {
            let size = if group.size().is_positive() {
                group.size()
            } else {
                EMPTY_LANE_SIZE
            };
            debug!(group = group.id(), width = size.width(), height = size.height(); "Empty lane keeps its size");
            placed_groups[group_idx] = Some(group.clone().with_position(lane_position).with_size(size));
            y_cursor += size.height() + metrics.lane_gap();
            continue;
        }

        let lane = lay_out_lane(services, &members[group_idx], connections, &options, engine).await;
        let size = lane
            .extent
            .max(MIN_CONTENT)
            .add_padding(Insets::uniform(padding));

        for (service_idx, position) in lane.positions {
            let relative = position.add_point(Point::new(padding, padding));
            placed_services[service_idx] = Some(
                services[service_idx]
                    .clone()
                    .with_group(group.id())
                    .with_position(relative),
            );
        }
        placed_groups[group_idx] = Some(group.clone().with_position(lane_position).with_size(size));
        debug!(
            group = group.id(),
            members = members[group_idx].len(),
            y = y_cursor;
            "Placed lane"
        );
        y_cursor += size.height() + metrics.lane_gap();
    }

    if !ungrouped.is_empty() {
        let lane = lay_out_lane(services, &ungrouped, connections, &options, engine).await;
        let origin = LANE_ORIGIN.with_y(y_cursor);
        for (service_idx, position) in lane.positions {
            placed_services[service_idx] = Some(
                services[service_idx]
                    .clone()
                    .without_group()
                    .with_position(origin.add_point(position)),
            );
        }
        debug!(services = ungrouped.len(), y = y_cursor; "Placed ungrouped lane");
    }

    let services = placed_services
        .into_iter()
        .zip(services)
        .map(|(placed, original)| placed.unwrap_or_else(|| original.clone()))
        .collect();
    let groups = placed_groups
        .into_iter()
        .zip(groups)
        .map(|(placed, original)| placed.unwrap_or_else(|| original.clone()))
        .collect();
    (services, groups)
}

/// Lays out `members` as a standalone flow and moves the result to the origin.
async fn lay_out_lane(
    services: &[PositionedService],
    members: &[usize],
    connections: &[Connection],
    options: &LayoutOptions,
    engine: &dyn LayoutEngine,
) -> Lane {
    let lane_services: Vec<_> = members
        .iter()
        .map(|idx| services[*idx].service().clone().without_group())
        .collect();
    let lane_connections: Vec<Connection> = connections
        .iter()
        .filter(|connection| {
            let inside = |id: &str| lane_services.iter().any(|service| service.id() == id);
            inside(connection.from()) && inside(connection.to())
        })
        .cloned()
        .collect();

    let result = engine
        .layout(&lane_services, &lane_connections, &[], options)
        .await;

    let positions: Vec<(usize, Point)> = members
        .iter()
        .map(|idx| {
            let position = result
                .service(services[*idx].id())
                .map(PositionedService::position)
                .unwrap_or_default();
            (*idx, position)
        })
        .collect();

    let min = positions
        .iter()
        .map(|(_, position)| *position)
        .reduce(|a, b| Point::new(a.x().min(b.x()), a.y().min(b.y())))
        .unwrap_or_default();
    let max = positions
        .iter()
        .map(|(_, position)| {
            position.add_point(Point::new(SERVICE_SIZE.width(), SERVICE_SIZE.height()))
        })
        .reduce(|a, b| Point::new(a.x().max(b.x()), a.y().max(b.y())))
        .unwrap_or_default();

    Lane {
        positions: positions
            .into_iter()
            .map(|(idx, position)| (idx, position.sub_point(min)))
            .collect(),
        extent: Size::new(max.x() - min.x(), max.y() - min.y()),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use futures::executor::block_on;

    use stratus_core::model::{Group, Service};

    use super::*;
    use crate::{
        layout::{EngineBuilder, EngineChoice},
        preset::Spacing,
    };

    fn service(id: &str, group: Option<&str>) -> PositionedService {
        let service = Service::new(id, id);
        let service = match group {
            Some(group) => service.with_group(group),
            None => service,
        };
        PositionedService::new(service, Point::default())
    }

    fn group(id: &str, label: &str) -> PositionedGroup {
        PositionedGroup::new(Group::new(id, label), Point::default(), Size::default())
    }

    fn arrange_with(
        services: &[PositionedService],
        groups: &[PositionedGroup],
        connections: &[Connection],
    ) -> (Vec<PositionedService>, Vec<PositionedGroup>) {
        let mut engines = EngineBuilder::new();
        let engine = engines.engine(EngineChoice::Primary);
        block_on(arrange(
            services,
            groups,
            connections,
            &Spacing::Comfortable.metrics(),
            engine,
        ))
    }

    #[test]
    fn test_lane_order_ignores_label_case() {
        let groups = vec![group("g1", "Zeta"), group("g2", "alpha"), group("g3", "Beta")];
        let services = vec![
            service("a", Some("g1")),
            service("b", Some("g2")),
            service("c", Some("g3")),
        ];

        let (_, groups) = arrange_with(&services, &groups, &[]);

        let alpha = groups[1].position().y();
        let beta = groups[2].position().y();
        let zeta = groups[0].position().y();
        assert_approx_eq!(f32, alpha, 80.0);
        assert!(alpha < beta && beta < zeta, "{alpha} {beta} {zeta}");
    }

    #[test]
    fn test_lanes_stack_in_label_order() {
        let groups = vec![group("g1", "Zeta"), group("g2", "Alpha")];
        let services = vec![
            service("a", Some("g1")),
            service("b", Some("g1")),
            service("c", Some("g2")),
            service("d", Some("g2")),
        ];
        let connections = vec![Connection::new("a", "b"), Connection::new("c", "d")];

        let (services, groups) = arrange_with(&services, &groups, &connections);

        // Alpha comes first, so g2 sits in the top lane.
        assert_approx_eq!(f32, groups[1].position().x(), 80.0);
        assert_approx_eq!(f32, groups[1].position().y(), 80.0);
        let second_lane = 80.0 + groups[1].size().height() + 120.0;
        assert_approx_eq!(f32, groups[0].position().y(), second_lane);

        // Two services in a row: content 180 + 200 + 180 wide, 100 tall (raised to 160).
        assert_approx_eq!(f32, groups[0].size().width(), 560.0 + 160.0);
        assert_approx_eq!(f32, groups[0].size().height(), 160.0 + 160.0);

        for service in &services {
            let group = groups
                .iter()
                .find(|group| Some(group.id()) == service.group_id())
                .expect("member keeps its group");
            assert!(service.position().x() >= 80.0 - 1e-3);
            assert!(service.position().y() >= 80.0 - 1e-3);
            assert!(
                service.position().x() + SERVICE_SIZE.width() <= group.size().width() - 80.0 + 1e-3
            );
        }
    }

    #[test]
    fn test_cross_lane_edges_are_ignored_for_sub_layouts() {
        let groups = vec![group("g", "G")];
        let services = vec![service("a", Some("g")), service("b", Some("g")), service("x", None)];
        let connections = vec![Connection::new("a", "x"), Connection::new("x", "b")];

        let (services, _) = arrange_with(&services, &groups, &connections);

        // Without an internal edge both members share the first rank.
        assert_approx_eq!(f32, services[0].position().x(), services[1].position().x());
    }

    #[test]
    fn test_empty_group_keeps_its_size() {
        let groups = vec![
            group("empty", "A"),
            PositionedGroup::new(Group::new("sized", "B"), Point::default(), Size::new(500.0, 300.0)),
        ];

        let (_, groups) = arrange_with(&[], &groups, &[]);

        assert_eq!(groups[0].size(), EMPTY_LANE_SIZE);
        assert_eq!(groups[1].size(), Size::new(500.0, 300.0));
        assert_approx_eq!(f32, groups[1].position().y(), 80.0 + 260.0 + 120.0);
    }

    #[test]
    fn test_ungrouped_lane_sits_below_groups() {
        let groups = vec![group("g", "G")];
        let services = vec![
            service("a", Some("g")),
            service("loose", None),
            service("orphan", Some("missing")),
        ];

        let (services, groups) = arrange_with(&services, &groups, &[]);

        let lane_top = groups[0].position().y() + groups[0].size().height() + 120.0;
        let loose = &services[1];
        let orphan = &services[2];
        assert_eq!(orphan.group_id(), None);
        assert_approx_eq!(f32, loose.position().x().min(orphan.position().x()), 80.0);
        assert_approx_eq!(f32, loose.position().y().min(orphan.position().y()), lane_top);
    }
}
