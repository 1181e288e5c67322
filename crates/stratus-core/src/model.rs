//! Architecture model consumed and produced by the layout subsystem.
//!
//! The input side is a flat description of an architecture:
//!
//! - [`Service`] - a node with an optional, non-owning reference to a [`Group`]
//! - [`Connection`] - a directed edge between two services
//! - [`Group`] - a container owning the services that point at it
//!
//! The output side carries geometry:
//!
//! - [`PositionedService`] - a service with a top-left position. When the service
//!   belongs to a group the position is **relative to the group's top-left corner**.
//! - [`PositionedGroup`] - a group with an absolute position and a positive size.
//!
//! [`Diagram`] and [`Edge`] are the node/edge view of the rendering layer that the
//! preset orchestrator reads and writes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point, Size};

/// Footprint of every service node on the canvas.
pub const SERVICE_SIZE: Size = Size::new(180.0, 100.0);

/// A service node in the architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_id: Option<String>,
}

impl Service {
    /// Creates an ungrouped service.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group_id: None,
        }
    }

    /// Returns the service with its group reference set (builder style).
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Returns the service with its group reference cleared.
    pub fn without_group(mut self) -> Self {
        self.group_id = None;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id of the owning group, if any.
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }
}

/// How a connection's arrow should be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionDirection {
    /// Data flows from `from` to `to`.
    #[default]
    Forward,
    /// Data flows from `to` to `from`.
    Reverse,
    /// Data flows both ways.
    Bidirectional,
}

/// A directed connection between two services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    from: String,
    to: String,
    #[serde(default)]
    direction: ConnectionDirection,
}

impl Connection {
    /// Creates a forward connection.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            direction: ConnectionDirection::Forward,
        }
    }

    /// Returns the connection with the given direction (builder style).
    pub fn with_direction(mut self, direction: ConnectionDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn direction(&self) -> ConnectionDirection {
        self.direction
    }

    /// Returns the ordered `(source, target)` pairs this connection contributes
    /// once its direction attribute is resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stratus_core::model::{Connection, ConnectionDirection};
    /// let conn = Connection::new("a", "b").with_direction(ConnectionDirection::Reverse);
    /// assert_eq!(conn.resolved_pairs(), vec![("b", "a")]);
    /// ```
    pub fn resolved_pairs(&self) -> Vec<(&str, &str)> {
        match self.direction {
            ConnectionDirection::Forward => vec![(self.from(), self.to())],
            ConnectionDirection::Reverse => vec![(self.to(), self.from())],
            ConnectionDirection::Bidirectional => {
                vec![(self.from(), self.to()), (self.to(), self.from())]
            }
        }
    }
}

/// A logical container for services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: String,
    label: String,
}

impl Group {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A service together with its computed top-left position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedService {
    #[serde(flatten)]
    service: Service,
    position: Point,
}

impl PositionedService {
    pub fn new(service: Service, position: Point) -> Self {
        Self { service, position }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn id(&self) -> &str {
        self.service.id()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.service.group_id()
    }

    /// Top-left position; parent-relative when the service is grouped.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns a copy placed at `position`.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Returns a copy detached from its group.
    pub fn without_group(mut self) -> Self {
        self.service = self.service.without_group();
        self
    }

    /// Returns a copy attached to `group_id`.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.service = self.service.with_group(group_id);
        self
    }

    /// Bounds of the service footprint in the coordinate space of its position.
    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(SERVICE_SIZE)
    }
}

/// A group together with its absolute position and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedGroup {
    #[serde(flatten)]
    group: Group,
    position: Point,
    #[serde(flatten)]
    size: Size,
}

impl PositionedGroup {
    pub fn new(group: Group, position: Point, size: Size) -> Self {
        Self {
            group,
            position,
            size,
        }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn id(&self) -> &str {
        self.group.id()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Absolute bounds of the container.
    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.size)
    }
}

/// Rendering style requested for an edge path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Straight,
    #[default]
    Smooth,
    Orthogonal,
}

impl FromStr for PathStyle {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "straight" => Ok(Self::Straight),
            "smooth" => Ok(Self::Smooth),
            "orthogonal" => Ok(Self::Orthogonal),
            _ => Err("Unsupported edge style"),
        }
    }
}

/// An edge of the rendered diagram: a connection plus rendering metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    id: String,
    #[serde(flatten)]
    connection: Connection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path_style: Option<PathStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_path: Option<bool>,
}

impl Edge {
    pub fn new(id: impl Into<String>, connection: Connection) -> Self {
        Self {
            id: id.into(),
            connection,
            path_style: None,
            primary_path: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn path_style(&self) -> Option<PathStyle> {
        self.path_style
    }

    /// `Some(true)` when the edge joins two consecutive members of the primary path.
    pub fn primary_path(&self) -> Option<bool> {
        self.primary_path
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.path_style = Some(style);
        self
    }

    pub fn with_primary_path(mut self, primary: bool) -> Self {
        self.primary_path = Some(primary);
        self
    }
}

/// The node/edge view of a diagram as held by the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    services: Vec<PositionedService>,
    #[serde(default)]
    groups: Vec<PositionedGroup>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl Diagram {
    pub fn new(
        services: Vec<PositionedService>,
        groups: Vec<PositionedGroup>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            services,
            groups,
            edges,
        }
    }

    /// Seeds a diagram from a plain architecture description.
    ///
    /// Every service starts at the origin and every group has an empty size;
    /// a layout preset is expected to run next.
    pub fn from_architecture(
        services: Vec<Service>,
        connections: Vec<Connection>,
        groups: Vec<Group>,
    ) -> Self {
        let edges = connections
            .into_iter()
            .enumerate()
            .map(|(idx, connection)| {
                let id = format!("{}->{}#{idx}", connection.from(), connection.to());
                Edge::new(id, connection)
            })
            .collect();

        Self {
            services: services
                .into_iter()
                .map(|service| PositionedService::new(service, Point::default()))
                .collect(),
            groups: groups
                .into_iter()
                .map(|group| PositionedGroup::new(group, Point::default(), Size::default()))
                .collect(),
            edges,
        }
    }

    pub fn services(&self) -> &[PositionedService] {
        &self.services
    }

    pub fn groups(&self) -> &[PositionedGroup] {
        &self.groups
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn service(&self, id: &str) -> Option<&PositionedService> {
        self.services.iter().find(|service| service.id() == id)
    }

    pub fn group(&self, id: &str) -> Option<&PositionedGroup> {
        self.groups.iter().find(|group| group.id() == id)
    }

    /// Absolute canvas position of a service, re-basing grouped services onto
    /// their parent. Services pointing at a missing group are treated as absolute.
    pub fn absolute_position(&self, service: &PositionedService) -> Point {
        match service.group_id().and_then(|id| self.group(id)) {
            Some(group) => group.position().add_point(service.position()),
            None => service.position(),
        }
    }

    /// Splits the diagram back into the plain architecture description.
    pub fn architecture(&self) -> (Vec<Service>, Vec<Connection>, Vec<Group>) {
        (
            self.services.iter().map(|s| s.service().clone()).collect(),
            self.edges.iter().map(|e| e.connection().clone()).collect(),
            self.groups.iter().map(|g| g.group().clone()).collect(),
        )
    }
}
