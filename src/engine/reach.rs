//! Graph-reachability disclosure.
//!
//! An alternative to the proximity gate: a question opens when its effect
//! touches a descriptor reachable over the active paradigm's relations from
//! what the player has already observed.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::id::DescriptorId;
use crate::paradigm::{Paradigm, ParadigmMap};
use crate::question::Question;
use crate::state::GameState;

/// Directed relation graph of one paradigm. Edges carry the relation weight.
#[derive(Debug, Clone)]
pub struct RelationGraph {
    graph: DiGraph<DescriptorId, f64>,
    node_index: HashMap<DescriptorId, NodeIndex>,
}

impl RelationGraph {
    pub fn from_paradigm(paradigm: &Paradigm) -> Self {
        let mut graph = DiGraph::new();
        let mut node_index: HashMap<DescriptorId, NodeIndex> = HashMap::new();
        for rel in paradigm.relations() {
            let src = *node_index
                .entry(rel.source.clone())
                .or_insert_with(|| graph.add_node(rel.source.clone()));
            let tgt = *node_index
                .entry(rel.target.clone())
                .or_insert_with(|| graph.add_node(rel.target.clone()));
            graph.add_edge(src, tgt, rel.weight);
        }
        Self { graph, node_index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Descriptors reached by at least one hop from `origins`.
    ///
    /// A node enters the result when an edge leads to it before it has been
    /// expanded, so an origin only appears if another node points at it
    /// first. Origins absent from the graph contribute nothing.
    pub fn reachable<'a>(&self, origins: impl IntoIterator<Item = &'a DescriptorId>) -> BTreeSet<DescriptorId> {
        let mut result = BTreeSet::new();
        let mut expanded: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = origins
            .into_iter()
            .filter_map(|d| self.node_index.get(d).copied())
            .collect();

        while let Some(node) = queue.pop_front() {
            if !expanded.insert(node) {
                continue;
            }
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if !expanded.contains(&next) {
                    result.insert(self.graph[next].clone());
                    queue.push_back(next);
                }
            }
        }
        result
    }
}

/// Descriptors reachable from `origins` over `paradigm`'s relations.
pub fn reachable<'a>(origins: impl IntoIterator<Item = &'a DescriptorId>, paradigm: &Paradigm) -> BTreeSet<DescriptorId> {
    RelationGraph::from_paradigm(paradigm).reachable(origins)
}

/// Unanswered questions disclosed by reachability under the active paradigm.
///
/// Observed predicted descriptors split into consistent (observation equals
/// prediction) and anomalous. A question opens when one of its observation
/// pairs `(d, v)` either sits in the consistent reach with `pred(d) = v`, or
/// sits anywhere in the anomaly reach. Returns nothing when the active
/// paradigm is not in `paradigms`.
pub fn open_questions_reachable<'a>(
    state: &GameState,
    questions: &'a [Question],
    paradigms: &ParadigmMap,
) -> Vec<&'a Question> {
    let Some(paradigm) = paradigms.get(&state.current) else {
        tracing::warn!(paradigm = %state.current, "active paradigm missing, nothing reachable");
        return Vec::new();
    };

    let (consistent, anomalous): (Vec<_>, Vec<_>) = state
        .observations
        .iter()
        .filter_map(|(d, &seen)| paradigm.prediction(d.as_str()).map(|pred| (d, pred == seen)))
        .partition(|(_, agrees)| *agrees);

    let graph = RelationGraph::from_paradigm(paradigm);
    let consistent_reach = graph.reachable(consistent.iter().map(|(d, _)| *d));
    let anomaly_reach = graph.reachable(anomalous.iter().map(|(d, _)| *d));

    questions
        .iter()
        .filter(|q| !state.is_answered(q.id().as_str()))
        .filter(|q| q.allows_paradigm(state.current.as_str()))
        .filter(|q| q.prerequisites_met(&state.observations))
        .filter(|q| {
            q.effect().observations().iter().any(|(d, v)| {
                (consistent_reach.contains(d) && paradigm.prediction(d.as_str()) == Some(*v))
                    || anomaly_reach.contains(d)
            })
        })
        .collect()
}
