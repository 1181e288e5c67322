//! Direction-normalized adjacency over the services of a diagram.
//!
//! A connection contributes edges according to its direction attribute:
//! `reverse` flips it and `bidirectional` contributes both orientations.
//! Parallel duplicates are merged and self-loops ignored.

use indexmap::IndexSet;

use stratus_core::model::Connection;

/// Longest primary chain that will be followed.
pub const MAX_CHAIN: usize = 64;

#[derive(Debug)]
pub struct DirectedAdjacency<'a> {
    ids: IndexSet<&'a str>,
    out: Vec<IndexSet<usize>>,
    neighbours: Vec<IndexSet<usize>>,
    in_degree: Vec<usize>,
}

impl<'a> DirectedAdjacency<'a> {
    /// Builds the adjacency; connections touching unknown services are ignored.
    pub fn new<S, C>(service_ids: S, connections: C) -> Self
    where
        S: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a Connection>,
    {
        let ids: IndexSet<&'a str> = service_ids.into_iter().collect();
        let mut adjacency = Self {
            out: vec![IndexSet::new(); ids.len()],
            neighbours: vec![IndexSet::new(); ids.len()],
            in_degree: vec![0; ids.len()],
            ids,
        };

        for connection in connections {
            let (Some(from), Some(to)) = (
                adjacency.ids.get_index_of(connection.from()),
                adjacency.ids.get_index_of(connection.to()),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            adjacency.neighbours[from].insert(to);
            adjacency.neighbours[to].insert(from);

            for (source, target) in connection.resolved_pairs() {
                let (Some(source), Some(target)) = (
                    adjacency.ids.get_index_of(source),
                    adjacency.ids.get_index_of(target),
                ) else {
                    continue;
                };
                if adjacency.out[source].insert(target) {
                    adjacency.in_degree[target] += 1;
                }
            }
        }

        adjacency
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, idx: usize) -> &'a str {
        self.ids[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    fn out_degree(&self, idx: usize) -> usize {
        self.out[idx].len()
    }

    /// Services connected to `idx` in either orientation, in connection order.
    pub fn neighbours(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbours[idx].iter().copied()
    }

    /// The service with the highest combined in/out degree; the first one wins ties.
    pub fn most_connected(&self) -> Option<usize> {
        (0..self.len()).reduce(|best, idx| {
            let score = self.in_degree[idx] + self.out_degree(idx);
            if score > self.in_degree[best] + self.out_degree(best) {
                idx
            } else {
                best
            }
        })
    }

    /// Greedy dominant chain through the directed graph.
    ///
    /// Starts at the entry service (in-degree zero, or any service when there is
    /// none) with the highest out-degree and repeatedly follows the unvisited
    /// successor with the highest out-degree, up to [`MAX_CHAIN`] services.
    pub fn primary_chain(&self) -> Vec<usize> {
        let entries: Vec<usize> = (0..self.len())
            .filter(|idx| self.in_degree[*idx] == 0)
            .collect();
        let candidates = if entries.is_empty() {
            (0..self.len()).collect()
        } else {
            entries
        };
        let Some(start) = candidates
            .into_iter()
            .min_by_key(|idx| std::cmp::Reverse(self.out_degree(*idx)))
        else {
            return Vec::new();
        };

        let mut chain = vec![start];
        let mut visited = IndexSet::from([start]);
        while chain.len() < MAX_CHAIN {
            let current = chain[chain.len() - 1];
            let Some(next) = self.out[current]
                .iter()
                .copied()
                .filter(|idx| !visited.contains(idx))
                .min_by_key(|idx| std::cmp::Reverse(self.out_degree(*idx)))
            else {
                break;
            };
            chain.push(next);
            visited.insert(next);
        }
        chain
    }
}
