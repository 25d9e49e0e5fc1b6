//! Deterministic ordering of auto-configuration candidates.
//!
//! Three signals are applied, each only breaking ties left by the previous:
//!
//! 1. alphabetical order of identifiers,
//! 2. declared order value (stable sort, lower first),
//! 3. `before`/`after` constraints, resolved by a depth-first walk that
//!    emits a candidate only after everything it must follow.
//!
//! Candidates named only inside another candidate's constraints take part in
//! the walk (their own constraints are honored) but are dropped from the
//! result unless they were requested.

use std::collections::{BTreeSet, HashMap};

use autoconf_core::{AutoConfigError, DEFAULT_ORDER};
use tracing::{debug, warn};

use crate::metadata::{MetadataIndex, MetadataReader, MetadataStore};
use crate::replacements::ReplacementTable;

pub struct AutoConfigurationSorter<'a> {
    store: MetadataStore<'a>,
}

impl<'a> AutoConfigurationSorter<'a> {
    pub fn new(
        index: &'a MetadataIndex,
        reader: &'a dyn MetadataReader,
        replacements: &'a ReplacementTable,
    ) -> Self {
        Self {
            store: MetadataStore::new(index, reader, replacements),
        }
    }

    /// Total order over `identifiers`.
    ///
    /// Fails with [`AutoConfigError::OrderingCycle`] when the constraints
    /// cannot be satisfied; no partial order is returned.
    pub fn in_priority_order<I, S>(
        &mut self,
        identifiers: I,
    ) -> Result<Vec<String>, AutoConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alphabetical: Vec<String> = identifiers
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let graph = CandidateGraph::build(&mut self.store, &alphabetical)?;

        let mut by_order: Vec<usize> = Vec::with_capacity(alphabetical.len());
        for name in &alphabetical {
            if let Some(index) = graph.index_of_requested(name) {
                if !by_order.contains(&index) {
                    by_order.push(index);
                }
            }
        }
        by_order.sort_by_key(|&index| graph.nodes[index].order);

        let sorted = ConstraintSort::new(&graph, &by_order).run()?;
        let result: Vec<String> = sorted
            .into_iter()
            .filter(|&index| graph.nodes[index].required)
            .map(|index| graph.nodes[index].name.clone())
            .collect();

        debug!(
            requested = alphabetical.len(),
            discovered = graph.nodes.len() - result.len(),
            "sorted auto-configuration candidates"
        );
        Ok(result)
    }
}

#[derive(Debug)]
struct Node {
    /// Name reported in the result (the requested spelling when required).
    name: String,
    order: i32,
    before: Vec<String>,
    after: Vec<String>,
    required: bool,
}

#[derive(Debug, Default)]
struct CandidateGraph {
    nodes: Vec<Node>,
    by_canonical: HashMap<String, usize>,
    requested: HashMap<String, usize>,
    /// Indices of nodes that must precede each node.
    predecessors: Vec<Vec<usize>>,
}

impl CandidateGraph {
    fn build(
        store: &mut MetadataStore<'_>,
        alphabetical: &[String],
    ) -> Result<Self, AutoConfigError> {
        let mut graph = Self::default();
        graph.add_all(store, alphabetical, true)?;
        graph.link(store)?;
        Ok(graph)
    }

    fn index_of_requested(&self, name: &str) -> Option<usize> {
        self.requested.get(name).copied()
    }

    fn add_all(
        &mut self,
        store: &mut MetadataStore<'_>,
        names: &[String],
        required: bool,
    ) -> Result<(), AutoConfigError> {
        for name in names {
            let metadata = store.lookup(name)?.cloned();
            let canonical = metadata
                .as_ref()
                .map(|m| m.identifier.clone())
                .unwrap_or_else(|| name.clone());

            if let Some(&index) = self.by_canonical.get(&canonical) {
                if required {
                    let node = &mut self.nodes[index];
                    if !node.required {
                        node.required = true;
                        node.name = name.clone();
                    }
                    self.requested.insert(name.clone(), index);
                }
                continue;
            }

            match metadata {
                Some(metadata) => {
                    let before: Vec<String> = metadata.before.into_iter().collect();
                    let after: Vec<String> = metadata.after.into_iter().collect();
                    self.insert(canonical, name, required, metadata.order, &before, &after);
                    self.add_all(store, &before, false)?;
                    self.add_all(store, &after, false)?;
                }
                // Unknown names only matter when they were asked for.
                None if required => {
                    self.insert(canonical, name, required, DEFAULT_ORDER, &[], &[]);
                }
                None => {}
            }
        }
        Ok(())
    }

    fn insert(
        &mut self,
        canonical: String,
        name: &str,
        required: bool,
        order: i32,
        before: &[String],
        after: &[String],
    ) {
        let index = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            order,
            before: before.to_vec(),
            after: after.to_vec(),
            required,
        });
        self.by_canonical.insert(canonical, index);
        if required {
            self.requested.insert(name.to_string(), index);
        }
    }

    /// Combine each node's `after` set with every other node's `before` set
    /// pointing at it.
    fn link(&mut self, store: &mut MetadataStore<'_>) -> Result<(), AutoConfigError> {
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for index in 0..self.nodes.len() {
            for after in self.nodes[index].after.clone() {
                if let Some(target) = self.resolve(store, index, &after)? {
                    predecessors[index].push(target);
                }
            }
            for before in self.nodes[index].before.clone() {
                if let Some(target) = self.resolve(store, index, &before)? {
                    predecessors[target].push(index);
                }
            }
        }
        self.predecessors = predecessors;
        Ok(())
    }

    fn resolve(
        &self,
        store: &mut MetadataStore<'_>,
        from: usize,
        reference: &str,
    ) -> Result<Option<usize>, AutoConfigError> {
        let canonical = store.canonical_name(reference)?;
        let target = self.by_canonical.get(&canonical).copied();
        if target == Some(from) {
            warn!(
                candidate = %self.nodes[from].name,
                "ignoring ordering constraint that references the candidate itself"
            );
            return Ok(None);
        }
        Ok(target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first placement honoring predecessor sets.
struct ConstraintSort<'g> {
    graph: &'g CandidateGraph,
    to_visit: Vec<usize>,
    predecessors: Vec<Vec<usize>>,
    state: Vec<VisitState>,
    sorted: Vec<usize>,
}

impl<'g> ConstraintSort<'g> {
    fn new(graph: &'g CandidateGraph, by_order: &[usize]) -> Self {
        let count = graph.nodes.len();

        // Requested candidates in priority order, then everything discovered
        // through constraints in discovery order.
        let mut queued = vec![false; count];
        let mut to_visit = Vec::with_capacity(count);
        for &index in by_order {
            queued[index] = true;
            to_visit.push(index);
        }
        for (index, is_queued) in queued.iter().enumerate() {
            if !is_queued {
                to_visit.push(index);
            }
        }

        let mut position = vec![0usize; count];
        for (pos, &index) in to_visit.iter().enumerate() {
            position[index] = pos;
        }

        let predecessors = graph
            .predecessors
            .iter()
            .map(|preds| {
                let mut preds = preds.clone();
                preds.sort_by_key(|&p| position[p]);
                preds.dedup();
                preds
            })
            .collect();

        Self {
            graph,
            to_visit,
            predecessors,
            state: vec![VisitState::Unvisited; count],
            sorted: Vec::with_capacity(count),
        }
    }

    fn run(mut self) -> Result<Vec<usize>, AutoConfigError> {
        for position in 0..self.to_visit.len() {
            let index = self.to_visit[position];
            if self.state[index] == VisitState::Unvisited {
                self.visit(index)?;
            }
        }
        Ok(self.sorted)
    }

    fn visit(&mut self, index: usize) -> Result<(), AutoConfigError> {
        self.state[index] = VisitState::InProgress;
        for slot in 0..self.predecessors[index].len() {
            let predecessor = self.predecessors[index][slot];
            match self.state[predecessor] {
                VisitState::InProgress => {
                    return Err(AutoConfigError::OrderingCycle {
                        current: self.graph.nodes[index].name.clone(),
                        after: self.graph.nodes[predecessor].name.clone(),
                    });
                }
                VisitState::Unvisited => self.visit(predecessor)?,
                VisitState::Done => {}
            }
        }
        self.state[index] = VisitState::Done;
        self.sorted.push(index);
        Ok(())
    }
}

#[cfg(test)]
#[path = "sorter_tests.rs"]
mod tests;
