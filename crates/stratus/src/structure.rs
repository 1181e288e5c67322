//! Two-level arena built from the architecture before layout.
//!
//! Services are stored in a flat table keyed by id, each with an optional
//! parent-group index. Because nesting is capped at one level the structure
//! never needs a recursive tree. All dangling references are resolved here,
//! once, so the engines only ever see consistent indices.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};

use stratus_core::model::{Connection, Group, Service};

/// Prefix applied to group ids that collide with a service id.
const GROUP_ALIAS_PREFIX: &str = "group::";

/// A vertex of a containment scope: either a leaf service or a group acting as
/// a single opaque vertex of the root scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vertex {
    Service(usize),
    Group(usize),
}

/// Nodes and relations that are laid out together at one nesting level.
#[derive(Debug)]
pub struct ContainmentScope {
    container: Option<usize>,
    vertices: Vec<Vertex>,
    relations: Vec<(Vertex, Vertex)>,
}

impl ContainmentScope {
    fn new(container: Option<usize>) -> Self {
        Self {
            container,
            vertices: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Index of the group owning this scope, or `None` for the root scope.
    pub fn container(&self) -> Option<usize> {
        self.container
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Relations between vertices of this scope, deduplicated, without self-loops.
    pub fn relations(&self) -> &[(Vertex, Vertex)] {
        &self.relations
    }
}

/// Validated view of services, connections, and groups for a single layout call.
#[derive(Debug)]
pub struct ArchitectureGraph<'a> {
    services: Vec<&'a Service>,
    groups: Vec<&'a Group>,
    keys: IndexMap<String, Vertex>,
    group_keys: Vec<String>,
    parents: Vec<Option<usize>>,
    edges: Vec<(usize, usize)>,
    scopes: Vec<ContainmentScope>,
}

impl<'a> ArchitectureGraph<'a> {
    /// Builds the arena, logging and dropping every reference that cannot be resolved.
    pub fn new(services: &'a [Service], connections: &'a [Connection], groups: &'a [Group]) -> Self {
        let mut keys: IndexMap<String, Vertex> = IndexMap::new();

        let mut unique_services = Vec::with_capacity(services.len());
        for service in services {
            if keys.contains_key(service.id()) {
                warn!(service_id = service.id(); "Duplicate service id, keeping the first occurrence");
                continue;
            }
            keys.insert(
                service.id().to_string(),
                Vertex::Service(unique_services.len()),
            );
            unique_services.push(service);
        }

        let mut group_index: HashMap<&str, usize> = HashMap::new();
        let mut unique_groups = Vec::with_capacity(groups.len());
        let mut group_keys = Vec::with_capacity(groups.len());
        for group in groups {
            if group_index.contains_key(group.id()) {
                warn!(group_id = group.id(); "Duplicate group id, keeping the first occurrence");
                continue;
            }

            let mut key = group.id().to_string();
            if keys.contains_key(&key) {
                while keys.contains_key(&key) {
                    key = format!("{GROUP_ALIAS_PREFIX}{key}");
                }
                warn!(
                    group_id = group.id(),
                    alias = key.as_str();
                    "Group id collides with a service id, using an internal alias"
                );
            }

            let idx = unique_groups.len();
            keys.insert(key.clone(), Vertex::Group(idx));
            group_keys.push(key);
            group_index.insert(group.id(), idx);
            unique_groups.push(group);
        }

        let parents: Vec<Option<usize>> = unique_services
            .iter()
            .map(|service| {
                let group_id = service.group_id()?;
                let parent = group_index.get(group_id).copied();
                if parent.is_none() {
                    warn!(
                        service_id = service.id(),
                        group_id;
                        "Service references a missing group, treating it as ungrouped"
                    );
                }
                parent
            })
            .collect();

        let mut edges: IndexSet<(usize, usize)> = IndexSet::new();
        for connection in connections {
            let source = keys.get(connection.from()).copied();
            let target = keys.get(connection.to()).copied();
            match (source, target) {
                (Some(Vertex::Service(source)), Some(Vertex::Service(target))) => {
                    if source == target {
                        debug!(service_id = connection.from(); "Ignoring self-loop");
                        continue;
                    }
                    edges.insert((source, target));
                }
                _ => {
                    warn!(
                        from = connection.from(),
                        to = connection.to();
                        "Connection references a missing service, skipping it"
                    );
                }
            }
        }

        let mut graph = Self {
            services: unique_services,
            groups: unique_groups,
            keys,
            group_keys,
            parents,
            edges: edges.into_iter().collect(),
            scopes: Vec::new(),
        };
        graph.scopes = graph.build_scopes();

        debug!(
            services = graph.services.len(),
            groups = graph.groups.len(),
            edges = graph.edges.len();
            "Architecture graph built"
        );

        graph
    }

    fn build_scopes(&self) -> Vec<ContainmentScope> {
        let mut scopes: Vec<ContainmentScope> = (0..self.groups.len())
            .map(|idx| ContainmentScope::new(Some(idx)))
            .collect();
        let mut root = ContainmentScope::new(None);

        for (idx, parent) in self.parents.iter().enumerate() {
            match parent {
                Some(group) => scopes[*group].vertices.push(Vertex::Service(idx)),
                None => root.vertices.push(Vertex::Service(idx)),
            }
        }
        root.vertices
            .extend((0..self.groups.len()).map(Vertex::Group));

        let mut lifted: IndexSet<(Vertex, Vertex)> = IndexSet::new();
        for &(source, target) in &self.edges {
            match (self.parents[source], self.parents[target]) {
                (Some(a), Some(b)) if a == b => {
                    scopes[a]
                        .relations
                        .push((Vertex::Service(source), Vertex::Service(target)));
                }
                _ => {
                    let source = self.top_level_vertex(source);
                    let target = self.top_level_vertex(target);
                    if source != target {
                        lifted.insert((source, target));
                    }
                }
            }
        }
        root.relations = lifted.into_iter().collect();

        scopes.push(root);
        scopes
    }

    /// The vertex representing a service in the root scope.
    pub fn top_level_vertex(&self, service: usize) -> Vertex {
        match self.parents[service] {
            Some(group) => Vertex::Group(group),
            None => Vertex::Service(service),
        }
    }

    pub fn services(&self) -> &[&'a Service] {
        &self.services
    }

    pub fn groups(&self) -> &[&'a Group] {
        &self.groups
    }

    /// Resolved parent group index of the service at `idx`.
    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents[idx]
    }

    /// Deduplicated service-to-service edges, oriented `from -> to`.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Key of a vertex in the shared service/group namespace.
    ///
    /// Groups whose id collides with a service id are reported under their alias.
    pub fn vertex_key(&self, vertex: Vertex) -> &str {
        match vertex {
            Vertex::Service(idx) => self.services[idx].id(),
            Vertex::Group(idx) => &self.group_keys[idx],
        }
    }

    /// Group scopes in group order, followed by the root scope.
    pub fn containment_scopes(&self) -> &[ContainmentScope] {
        &self.scopes
    }

    /// Output form of the service at `idx`: the group reference is cleared when it
    /// pointed at a group that does not exist.
    pub fn resolved_service(&self, idx: usize) -> Service {
        let service = self.services[idx].clone();
        match self.parents[idx] {
            Some(_) => service,
            None => service.without_group(),
        }
    }
}
